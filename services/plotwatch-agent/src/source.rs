// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Plot inventory source
//!
//! The collector does not talk to the harvester RPC directly; it consumes a
//! `PlotSource` so tests can substitute a scripted inventory.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plot source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Harvester RPC unavailable")]
    Unavailable,
}

/// One raw inventory row as reported by the harvester RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlotRow {
    pub plot_id: String,
    pub dir: String,
    pub file: String,
    /// Fixed-precision local wall-clock form `YYYY-MM-DD HH:MM:SS.000`
    pub created_at: String,
    pub size: i64,
}

/// Source of the local plot inventory
#[async_trait]
pub trait PlotSource: Send + Sync {
    /// Load the full current inventory
    async fn load_plots(&self) -> Result<Vec<RawPlotRow>, SourceError>;
}

/// Production source backed by the local harvester RPC
pub struct FarmerRpcSource {
    client: Client,
    base_url: String,
}

impl FarmerRpcSource {
    /// Create a new harvester RPC source
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PlotSource for FarmerRpcSource {
    async fn load_plots(&self) -> Result<Vec<RawPlotRow>, SourceError> {
        let url = format!("{}/get_plots", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "Harvester RPC get_plots returned non-success status"
            );
            return Err(SourceError::Unavailable);
        }

        let rows: Vec<RawPlotRow> = response.json().await?;

        tracing::debug!(count = rows.len(), "Loaded plot inventory");

        Ok(rows)
    }
}
