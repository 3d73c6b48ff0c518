// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! The periodic plot status sync loop
//!
//! The first invocation after process start reports the full inventory;
//! every later invocation reports only plots created inside a sliding
//! window. Overlapping windows are fine: the controller's full-replace
//! ingestion absorbs re-sent records. Failures are logged and swallowed -
//! recovery is simply the next tick.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::collector::collect;
use crate::config::Mode;
use crate::source::{PlotSource, SourceError};
use crate::uplink::{ControllerClient, UplinkError};

/// Sliding watermark window, in minutes.
const INCREMENTAL_WINDOW_MINUTES: i64 = 15;

/// Sync loop state.
///
/// `Initial` is left after the first attempt whether or not it succeeded:
/// a transient failure on the first tick must not cause the full inventory
/// to be re-collected on every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No sync attempted yet this process lifetime: next sync is full
    Initial,
    /// Steady state: each sync covers the sliding window
    Incremental,
}

/// Sync errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Uplink(#[from] UplinkError),
}

/// Format the watermark for a sync starting at `now`.
///
/// Matches the `created_at` form reported by the harvester RPC, so the
/// collector can compare the two as strings.
pub fn incremental_cutoff(now: DateTime<Local>) -> String {
    (now - chrono::Duration::minutes(INCREMENTAL_WINDOW_MINUTES))
        .format("%Y-%m-%d %H:%M:%S.000")
        .to_string()
}

/// The periodic sync loop
pub struct SyncLoop {
    source: Box<dyn PlotSource>,
    uplink: ControllerClient,
    hostname: String,
    mode: Mode,
    state: SyncState,
}

impl SyncLoop {
    /// Create a sync loop in the initial (full sync) state
    pub fn new(
        source: Box<dyn PlotSource>,
        uplink: ControllerClient,
        hostname: String,
        mode: Mode,
    ) -> Self {
        Self {
            source,
            uplink,
            hostname,
            mode,
            state: SyncState::Initial,
        }
    }

    /// Current loop state
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Run one sync invocation to completion.
    ///
    /// Never propagates errors: a failed collection or upload is logged
    /// and abandoned, and the next scheduled invocation retries. Nothing
    /// local is mutated before the upload, so there is nothing to roll
    /// back.
    pub async fn run_once(&mut self) {
        if !self.mode.farming_enabled() && !self.mode.harvesting_enabled() {
            tracing::debug!(
                mode = %self.mode,
                "Neither farming nor harvesting enabled, skipping plot status sync"
            );
            return;
        }

        let cutoff = match self.state {
            SyncState::Initial => None,
            SyncState::Incremental => Some(incremental_cutoff(Local::now())),
        };

        if let Err(e) = self.sync(cutoff.as_deref()).await {
            tracing::warn!(error = %e, "Plot status sync failed");
        }

        self.state = SyncState::Incremental;
    }

    async fn sync(&self, cutoff: Option<&str>) -> Result<(), SyncError> {
        let rows = self.source.load_plots().await?;
        let records = collect(rows, &self.hostname, cutoff);

        tracing::debug!(
            count = records.len(),
            full = cutoff.is_none(),
            "Collected plot records"
        );

        self.uplink.post_plots(&records).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::source::RawPlotRow;

    #[test]
    fn cutoff_is_fifteen_minutes_before_now() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();

        assert_eq!(incremental_cutoff(now), "2024-03-05 12:15:00.000");
    }

    #[test]
    fn cutoff_always_carries_zero_millis() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 0, 10, 59).unwrap();

        // The literal ".000" suffix keeps the form lexicographically
        // comparable with harvester-reported timestamps
        assert_eq!(incremental_cutoff(now), "2024-03-04 23:55:59.000");
    }

    struct FailingSource;

    #[async_trait]
    impl PlotSource for FailingSource {
        async fn load_plots(&self) -> Result<Vec<RawPlotRow>, SourceError> {
            Err(SourceError::Unavailable)
        }
    }

    fn unreachable_uplink() -> ControllerClient {
        ControllerClient::new("http://127.0.0.1:1".to_string(), 1).unwrap()
    }

    #[tokio::test]
    async fn failed_first_sync_still_leaves_initial_state() {
        let mut sync_loop = SyncLoop::new(
            Box::new(FailingSource),
            unreachable_uplink(),
            "harvester1".to_string(),
            Mode::parse("fullnode"),
        );
        assert_eq!(sync_loop.state(), SyncState::Initial);

        sync_loop.run_once().await;

        // The expensive full sync is not retried on the next tick
        assert_eq!(sync_loop.state(), SyncState::Incremental);
    }

    #[tokio::test]
    async fn capability_gate_skips_without_state_transition() {
        let mut sync_loop = SyncLoop::new(
            Box::new(FailingSource),
            unreachable_uplink(),
            "plotter1".to_string(),
            Mode::parse("plotter"),
        );

        sync_loop.run_once().await;

        // A gated invocation is a no-op, not a consumed first run
        assert_eq!(sync_loop.state(), SyncState::Initial);
    }
}
