// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! HTTP client for the worker agent control surface
//!
//! Workers expose a small control API that the controller consumes but does
//! not implement:
//!
//! - `POST /actions` with `{service, action[, plot_ids]}`, 200 on success
//! - `GET /configs/{service}` returning raw YAML text
//! - `PUT /configs/{service}` accepting raw YAML text, 200 on success
//!
//! Any non-200 response body is treated as a human-readable error payload
//! and surfaced to the operator verbatim.

use std::collections::HashMap;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use plotwatch_types::{ActionPayload, ServiceKind};

/// Worker client errors
#[derive(Debug, Error)]
pub enum WorkerClientError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Worker returned status {status}: {body}")]
    ErrorResponse { status: u16, body: String },
}

/// Maps worker hostnames to the base URL of their control surface.
///
/// By default every worker is addressed as `http://{hostname}:{port}`;
/// explicit per-host overrides take precedence (tests point hostnames at
/// stub servers this way).
#[derive(Debug, Clone)]
pub struct WorkerDirectory {
    agent_port: u16,
    overrides: HashMap<String, String>,
}

impl WorkerDirectory {
    /// Create a directory addressing every worker on `agent_port`
    pub fn new(agent_port: u16) -> Self {
        Self {
            agent_port,
            overrides: HashMap::new(),
        }
    }

    /// Pin one hostname to an explicit base URL
    pub fn insert_override(&mut self, hostname: &str, base_url: &str) {
        self.overrides
            .insert(hostname.to_string(), base_url.to_string());
    }

    /// Base URL of the named worker's control surface
    pub fn base_url(&self, hostname: &str) -> String {
        match self.overrides.get(hostname) {
            Some(base) => base.clone(),
            None => format!("http://{}:{}", hostname, self.agent_port),
        }
    }
}

/// Client for one worker's control surface.
///
/// Borrows the controller's pooled HTTP client (reqwest clients are
/// internally reference-counted), so construction per dispatch is cheap.
pub struct WorkerClient {
    client: Client,
    base_url: String,
}

impl WorkerClient {
    /// Create a client for the worker at `base_url`
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Issue a control action; 200 means applied
    pub async fn post_action(&self, payload: &ActionPayload) -> Result<(), WorkerClientError> {
        let url = format!("{}/actions", self.base_url);

        let response = self.client.post(&url).json(payload).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerClientError::ErrorResponse {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Fetch a service's raw YAML config text
    pub async fn get_config(&self, service: ServiceKind) -> Result<String, WorkerClientError> {
        let url = format!("{}/configs/{}", self.base_url, service);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerClientError::ErrorResponse {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }

    /// Save a service's raw YAML config text
    pub async fn put_config(
        &self,
        service: ServiceKind,
        config: &str,
    ) -> Result<(), WorkerClientError> {
        let url = format!("{}/configs/{}", self.base_url, service);

        let response = self
            .client
            .put(&url)
            .body(config.to_string())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerClientError::ErrorResponse {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
