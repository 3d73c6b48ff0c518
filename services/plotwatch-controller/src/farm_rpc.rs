// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Farmer RPC client for classifying plots
//!
//! The farmer daemon's RPC is the authoritative plot directory listing and
//! carries the classification ("solo" vs "portable") that workers cannot
//! report themselves. Ingestion cross-references each incoming record
//! against this listing.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Farmer RPC client errors
#[derive(Debug, Error)]
pub enum FarmRpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Farmer RPC unavailable")]
    Unavailable,
}

/// One entry of the farmer RPC plot listing.
///
/// The RPC reports the full `0x`-prefixed digest; stored records carry the
/// truncated form.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcPlot {
    pub plot_id: String,
    #[serde(rename = "type", default)]
    pub plot_type: Option<String>,
}

/// Resolve a stored record's classification against the RPC listing.
///
/// A listing entry matches when its identifier starts with `"0x"` followed
/// by the record's truncated id. First match carrying a type wins; no match
/// yields the empty string ("classification unknown").
pub fn resolve_plot_type(plot_id: &str, listing: &[RpcPlot]) -> String {
    let prefixed = format!("0x{}", plot_id);
    for entry in listing {
        if entry.plot_id.starts_with(&prefixed) {
            if let Some(plot_type) = &entry.plot_type {
                return plot_type.clone();
            }
        }
    }
    String::new()
}

/// Farmer RPC client
pub struct FarmRpcClient {
    client: Client,
    base_url: String,
}

impl FarmRpcClient {
    /// Create a new farmer RPC client
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, FarmRpcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Fetch the full plot listing from the farmer RPC
    pub async fn get_all_plots(&self) -> Result<Vec<RpcPlot>, FarmRpcError> {
        let url = format!("{}/get_plots", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "Farmer RPC get_plots returned non-success status"
            );
            return Err(FarmRpcError::Unavailable);
        }

        let plots: Vec<RpcPlot> = response.json().await?;

        tracing::debug!(count = plots.len(), "Fetched farmer RPC plot listing");

        Ok(plots)
    }
}
