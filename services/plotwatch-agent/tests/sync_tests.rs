// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! End-to-end tests for the agent sync loop against a stub controller.

// Allow unwrap/expect in tests - panicking on setup failures is acceptable
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use async_trait::async_trait;
use chrono::Local;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plotwatch_agent::config::Mode;
use plotwatch_agent::source::{PlotSource, RawPlotRow, SourceError};
use plotwatch_agent::sync::{SyncLoop, SyncState};
use plotwatch_agent::uplink::ControllerClient;

/// Scripted in-memory inventory
struct FakeSource {
    rows: Vec<RawPlotRow>,
}

#[async_trait]
impl PlotSource for FakeSource {
    async fn load_plots(&self) -> Result<Vec<RawPlotRow>, SourceError> {
        Ok(self.rows.clone())
    }
}

fn row(plot_id: &str, created_at: &str) -> RawPlotRow {
    RawPlotRow {
        plot_id: plot_id.to_string(),
        dir: "/plots".to_string(),
        file: format!("plot-k32-{}.plot", plot_id),
        created_at: created_at.to_string(),
        size: 108_644_374_730,
    }
}

/// A created_at stamp for "just now", in the reported wire form
fn recent_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S.000").to_string()
}

async fn stub_controller(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/plots"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn sync_loop(rows: Vec<RawPlotRow>, controller_url: String, mode: &str) -> SyncLoop {
    let uplink = ControllerClient::new(controller_url, 5).expect("build uplink");
    SyncLoop::new(
        Box::new(FakeSource { rows }),
        uplink,
        "harvester1".to_string(),
        Mode::parse(mode),
    )
}

#[tokio::test]
async fn first_sync_reports_full_inventory() {
    let controller = stub_controller(201).await;

    let rows = vec![
        row("aaa", "2020-01-01 00:00:00.000"),
        row("bbb", "2021-06-15 08:30:00.000"),
    ];
    let mut sync = sync_loop(rows, controller.uri(), "fullnode");

    sync.run_once().await;

    assert_eq!(sync.state(), SyncState::Incremental);

    let requests = controller.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let batch: serde_json::Value = requests[0].body_json().unwrap();
    let batch = batch.as_array().unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["plot_id"], "aaa");
    assert_eq!(batch[0]["hostname"], "harvester1");
    // Classification is the controller's job; the agent reports it unknown
    assert_eq!(batch[0]["type"], "");
}

#[tokio::test]
async fn incremental_sync_reports_only_recent_plots() {
    let controller = stub_controller(201).await;

    let rows = vec![
        row("ancient", "2020-01-01 00:00:00.000"),
        row("fresh", &recent_stamp()),
    ];
    let mut sync = sync_loop(rows, controller.uri(), "fullnode");

    // First tick: full sync carries both
    sync.run_once().await;
    // Second tick: only the plot inside the 15-minute window
    sync.run_once().await;

    let requests = controller.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let full: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(full.as_array().unwrap().len(), 2);

    let incremental: serde_json::Value = requests[1].body_json().unwrap();
    let incremental = incremental.as_array().unwrap();
    assert_eq!(incremental.len(), 1);
    assert_eq!(incremental[0]["plot_id"], "fresh");
}

#[tokio::test]
async fn empty_incremental_batch_skips_the_upload() {
    let controller = stub_controller(201).await;

    let rows = vec![row("aaa", "2020-01-01 00:00:00.000")];
    let mut sync = sync_loop(rows, controller.uri(), "fullnode");

    sync.run_once().await;
    // Nothing new inside the window: no request at all
    sync.run_once().await;

    let requests = controller.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn gated_worker_never_reports() {
    let controller = stub_controller(201).await;

    let rows = vec![row("aaa", "2020-01-01 00:00:00.000")];
    let mut sync = sync_loop(rows, controller.uri(), "plotter");

    sync.run_once().await;
    sync.run_once().await;

    assert_eq!(sync.state(), SyncState::Initial);

    let requests = controller.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn controller_failure_is_swallowed_and_retried_next_tick() {
    let controller = stub_controller(500).await;

    let rows = vec![row("aaa", &recent_stamp())];
    let mut sync = sync_loop(rows, controller.uri(), "fullnode");

    // Must not panic or propagate; the loop soldiers on
    sync.run_once().await;
    assert_eq!(sync.state(), SyncState::Incremental);

    sync.run_once().await;

    let requests = controller.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}
