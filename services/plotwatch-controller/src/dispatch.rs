// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Action dispatch: resolve plot ids to workers and fan out
//!
//! A dispatch request names plots by id only. The owning worker for each id
//! is resolved from the persisted snapshot, ids are grouped per worker, and
//! one control request is issued per group. Requests are independent: a
//! failing worker never prevents the rest from being attempted, and the
//! failures are aggregated into one operator-visible message afterwards.

use std::collections::BTreeMap;

use futures_util::future;

use plotwatch_types::{ActionPayload, ActionVerb, Hostname, PlotId, ServiceKind};

use crate::workers::{WorkerClient, WorkerClientError, WorkerDirectory};

/// Outcome of a fan-out, before the dropped-id count is folded in.
#[derive(Debug)]
pub struct FanoutOutcome {
    /// True when every attempted worker request returned 200
    pub success: bool,
    /// Number of workers a request was sent to
    pub attempted: usize,
    /// Aggregated failure bodies, newline-separated
    pub error: String,
}

/// Group requested plot ids by their owning worker.
///
/// Ids with no owner in the snapshot are dropped from the map; the second
/// return value counts them. Stale ids are expected here (the operator may
/// act on a plot that vanished since the last sync), so a dropped id is
/// not an error.
///
/// The result is a BTreeMap so downstream fan-out and error aggregation
/// run in lexicographic hostname order.
pub fn group_by_worker(
    snapshot: &[(PlotId, Hostname)],
    plot_ids: &[PlotId],
) -> (BTreeMap<Hostname, Vec<PlotId>>, usize) {
    let mut groups: BTreeMap<Hostname, Vec<PlotId>> = BTreeMap::new();
    let mut dropped = 0;

    for plot_id in plot_ids {
        match snapshot.iter().find(|(id, _)| id == plot_id) {
            Some((_, hostname)) => {
                groups.entry(hostname.clone()).or_default().push(plot_id.clone());
            }
            None => {
                tracing::debug!(plot_id = %plot_id, "No worker owns plot id, dropping");
                dropped += 1;
            }
        }
    }

    (groups, dropped)
}

/// Fan one control request out to each worker group.
///
/// The per-worker futures run independently and are joined in input order,
/// so the aggregated error text is deterministic for a given group map.
pub async fn fan_out(
    http_client: &reqwest::Client,
    directory: &WorkerDirectory,
    service: ServiceKind,
    action: ActionVerb,
    groups: &BTreeMap<Hostname, Vec<PlotId>>,
) -> FanoutOutcome {
    let requests = groups.iter().map(|(hostname, plot_ids)| {
        let worker = WorkerClient::new(http_client.clone(), directory.base_url(hostname));
        let payload = ActionPayload {
            service,
            action,
            plot_ids: Some(plot_ids.clone()),
        };
        async move {
            let result = worker.post_action(&payload).await;
            (hostname.clone(), plot_ids.len(), result)
        }
    });

    let results = future::join_all(requests).await;

    let mut success = true;
    let mut error = String::new();
    for (hostname, count, result) in &results {
        match result {
            Ok(()) => {
                tracing::info!(
                    worker = %hostname,
                    plots = *count,
                    action = %action,
                    "Worker applied action"
                );
            }
            Err(WorkerClientError::ErrorResponse { status, body }) => {
                tracing::warn!(
                    worker = %hostname,
                    status = *status,
                    "Worker rejected action"
                );
                success = false;
                error.push_str(body);
                error.push('\n');
            }
            Err(e) => {
                tracing::warn!(worker = %hostname, error = %e, "Worker unreachable");
                success = false;
                error.push_str(&format!("{}: {}\n", hostname, e));
            }
        }
    }

    FanoutOutcome {
        success,
        attempted: results.len(),
        error,
    }
}
