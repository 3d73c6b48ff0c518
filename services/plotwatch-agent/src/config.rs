// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Agent configuration

use std::fmt;

use anyhow::{Context, Result};

/// Default interval between sync loop invocations (seconds).
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;

/// Default HTTP client timeout in seconds.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default worker mode when WORKER_MODE is unset.
const DEFAULT_MODE: &str = "fullnode";

/// Roles this worker runs, parsed from WORKER_MODE.
///
/// A mode is one or more role names joined with `+` (e.g. `fullnode`,
/// `plotter`, `farmer+harvester`). `fullnode` implies every role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mode {
    roles: Vec<String>,
}

impl Mode {
    /// Parse a mode string
    pub fn parse(s: &str) -> Self {
        let roles = s
            .split(['+', ','])
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .collect();
        Self { roles }
    }

    fn has(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Whether this worker farms (fullnode or farmer role)
    pub fn farming_enabled(&self) -> bool {
        self.has("fullnode") || self.has("farmer")
    }

    /// Whether this worker harvests (fullnode or harvester role)
    pub fn harvesting_enabled(&self) -> bool {
        self.has("fullnode") || self.has("harvester")
    }

    /// Whether this worker plots (fullnode or plotter role)
    pub fn plotting_enabled(&self) -> bool {
        self.has("fullnode") || self.has("plotter")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.roles.join("+"))
    }
}

/// Agent configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Base URL of the controller's ingestion endpoint
    pub controller_url: String,

    /// Base URL of the local harvester RPC serving the plot inventory
    pub farmer_rpc_url: String,

    /// Hostname reported with every plot record
    pub hostname: String,

    /// Roles this worker runs
    pub mode: Mode,

    /// Interval between sync loop invocations (seconds)
    pub sync_interval_secs: u64,

    /// HTTP client timeout in seconds
    pub http_timeout_secs: u64,
}

impl AgentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let controller_url = std::env::var("CONTROLLER_URL")
            .context("CONTROLLER_URL environment variable required")?;

        let farmer_rpc_url = std::env::var("FARMER_RPC_URL")
            .context("FARMER_RPC_URL environment variable required")?;

        let hostname = match std::env::var("HOSTNAME") {
            Ok(name) if !name.is_empty() => name,
            _ => hostname::get()
                .context("Failed to read OS hostname")?
                .to_string_lossy()
                .to_string(),
        };

        let mode = Mode::parse(
            &std::env::var("WORKER_MODE").unwrap_or_else(|_| DEFAULT_MODE.to_string()),
        );

        let sync_interval_secs = std::env::var("SYNC_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SYNC_INTERVAL_SECS.to_string())
            .parse()
            .context("Invalid SYNC_INTERVAL_SECS")?;

        let http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
            .parse()
            .context("Invalid HTTP_TIMEOUT_SECS")?;

        Ok(Self {
            controller_url,
            farmer_rpc_url,
            hostname,
            mode,
            sync_interval_secs,
            http_timeout_secs,
        })
    }
}
