// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Status uplink to the controller

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use plotwatch_types::PlotRecord;

/// Uplink errors
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Controller returned status {status}: {body}")]
    ErrorResponse { status: u16, body: String },
}

/// Client for the controller's ingestion endpoint
pub struct ControllerClient {
    client: Client,
    base_url: String,
}

impl ControllerClient {
    /// Create a new controller client
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, UplinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Upload a batch of plot records.
    ///
    /// An empty batch is skipped without a request: the ingestion endpoint
    /// replaces a hostname's records wholesale, so an empty upload would
    /// churn the store for nothing.
    pub async fn post_plots(&self, batch: &[PlotRecord]) -> Result<(), UplinkError> {
        if batch.is_empty() {
            tracing::debug!("No new plots to report, skipping upload");
            return Ok(());
        }

        let url = format!("{}/plots", self.base_url);

        let response = self.client.post(&url).json(batch).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UplinkError::ErrorResponse {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(count = batch.len(), "Uploaded plot records");

        Ok(())
    }
}
