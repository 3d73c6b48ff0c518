// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Shared types for the plotwatch controller and worker agents.
//!
//! This crate contains the common data structures used by the plotwatch
//! controller (which aggregates plot status and fans out control actions)
//! and the per-worker agent daemon (which reports plot status upstream).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

// ============================================================================
// Type Aliases
// ============================================================================

/// Plot identifier (truncated hex digest of the plot contents)
pub type PlotId = String;

/// Worker node identifier (hostname)
pub type Hostname = String;

// ============================================================================
// Plot Status Types
// ============================================================================

/// One physical plot file discovered on a worker.
///
/// Records are produced by the agent's periodic collection pass and stored
/// by the controller, keyed by hostname. The `type` field is resolved by the
/// controller at ingestion time by cross-referencing the farmer RPC; an
/// empty string means "classification unknown" and is deliberately distinct
/// from a failed classification fetch (which rejects the whole batch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlotRecord {
    /// Content-derived plot identifier
    pub plot_id: PlotId,
    /// Hostname of the worker holding the plot file
    pub hostname: Hostname,
    /// Directory containing the plot file
    pub dir: String,
    /// Plot file name
    pub file: String,
    /// Creation timestamp, fixed-precision local wall-clock form
    /// `YYYY-MM-DD HH:MM:SS.000` (lexicographically comparable)
    pub created_at: String,
    /// Plot file size in bytes
    pub size: i64,
    /// Plot classification: "solo", "portable", or "" when unknown
    #[serde(rename = "type", default)]
    pub plot_type: String,
}

// ============================================================================
// Control Action Types
// ============================================================================

/// Worker-side service a control action is addressed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString,
    VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// The plotting manager on a plotter node
    Plotting,
    /// The plot archiver on a plotter node
    Archiving,
    /// The farming daemon on a farmer/harvester node
    Farming,
}

/// Control verb applied to a service or a set of plots.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString,
    VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActionVerb {
    /// Start the service
    Start,
    /// Stop the service
    Stop,
    /// Suspend the named plot jobs
    Suspend,
    /// Resume the named plot jobs
    Resume,
    /// Kill the named plot jobs
    Kill,
}

/// Operator request to act on a set of plots, addressed by id only.
///
/// The controller resolves each id's owning worker from the persisted
/// status snapshot and fans out one request per worker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActionRequest {
    /// Target service on the owning workers
    pub service: ServiceKind,
    /// Verb to apply
    pub action: ActionVerb,
    /// Plot identifiers to act on (owning worker resolved per id)
    pub plot_ids: Vec<PlotId>,
}

/// Wire payload of a control request sent to one worker agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActionPayload {
    /// Target service on this worker
    pub service: ServiceKind,
    /// Verb to apply
    pub action: ActionVerb,
    /// Plot identifiers owned by this worker, absent for service-level verbs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_ids: Option<Vec<PlotId>>,
}

/// Aggregate outcome of a fan-out dispatch.
///
/// `success` is true only if every per-worker request returned HTTP 200.
/// Workers that succeeded have had the action applied even when `success`
/// is false; there is no cross-worker rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DispatchReport {
    /// True when every attempted worker request succeeded
    pub success: bool,
    /// Number of workers a request was sent to
    pub attempted: usize,
    /// Number of plot ids dropped because no worker owns them
    pub dropped: usize,
    /// Aggregated failure bodies, newline-separated; empty on success
    pub error: String,
}

// ============================================================================
// Worker Config Types
// ============================================================================

/// Raw YAML configuration text carried through the controller's proxy
/// endpoints for a worker-side service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorkerConfigPayload {
    /// The configuration file contents, verbatim YAML
    pub config: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_record_type_defaults_to_empty() {
        // Ingestion input omits "type"; it must come back as "", not null.
        let json = r#"{
            "plot_id": "abc123",
            "hostname": "plotter1",
            "dir": "/plots",
            "file": "plot-k32-abc123.plot",
            "created_at": "2024-01-01 00:00:00.000",
            "size": 108644374730
        }"#;

        let record: PlotRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.plot_type, "");

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["type"], "");
    }

    #[test]
    fn action_payload_omits_absent_plot_ids() {
        let payload = ActionPayload {
            service: ServiceKind::Plotting,
            action: ActionVerb::Start,
            plot_ids: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"service":"plotting","action":"start"}"#);
    }

    #[test]
    fn action_payload_carries_plot_ids() {
        let payload = ActionPayload {
            service: ServiceKind::Plotting,
            action: ActionVerb::Kill,
            plot_ids: Some(vec!["abc".to_string(), "def".to_string()]),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["action"], "kill");
        assert_eq!(json["plot_ids"][1], "def");
    }

    #[test]
    fn verb_and_service_display_lowercase() {
        assert_eq!(ActionVerb::Suspend.to_string(), "suspend");
        assert_eq!(ServiceKind::Archiving.to_string(), "archiving");
    }
}
