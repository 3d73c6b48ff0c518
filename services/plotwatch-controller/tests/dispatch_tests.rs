// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Fan-out tests for the action dispatcher, against stub worker agents.

// Allow unwrap/expect in tests - panicking on setup failures is acceptable
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::time::Duration;

use plotwatch_controller::dispatch::{fan_out, group_by_worker};
use plotwatch_controller::workers::WorkerDirectory;
use plotwatch_types::{ActionVerb, ServiceKind};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("build client")
}

/// Stub worker that accepts actions with 200
async fn ok_worker() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/actions"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

fn groups(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(host, ids)| {
            (
                host.to_string(),
                ids.iter().map(|id| id.to_string()).collect(),
            )
        })
        .collect()
}

#[tokio::test]
async fn fan_out_sends_one_request_per_worker() {
    let worker1 = ok_worker().await;
    let worker2 = ok_worker().await;

    let mut directory = WorkerDirectory::new(8927);
    directory.insert_override("h1", &worker1.uri());
    directory.insert_override("h2", &worker2.uri());

    let groups = groups(&[("h1", &["a", "c"]), ("h2", &["b"])]);

    let outcome = fan_out(
        &http_client(),
        &directory,
        ServiceKind::Plotting,
        ActionVerb::Kill,
        &groups,
    )
    .await;

    assert!(outcome.success);
    assert_eq!(outcome.attempted, 2);
    assert_eq!(outcome.error, "");

    // Each worker got exactly one request carrying only its own plot ids
    let requests1 = worker1.received_requests().await.unwrap();
    assert_eq!(requests1.len(), 1);
    let body1: serde_json::Value = requests1[0].body_json().unwrap();
    assert_eq!(body1["service"], "plotting");
    assert_eq!(body1["action"], "kill");
    assert_eq!(body1["plot_ids"], serde_json::json!(["a", "c"]));

    let requests2 = worker2.received_requests().await.unwrap();
    assert_eq!(requests2.len(), 1);
    let body2: serde_json::Value = requests2[0].body_json().unwrap();
    assert_eq!(body2["plot_ids"], serde_json::json!(["b"]));
}

#[tokio::test]
async fn partial_failure_aggregates_only_failing_bodies() {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/actions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("plotman: no such job on h1"))
        .mount(&failing)
        .await;
    let healthy = ok_worker().await;

    let mut directory = WorkerDirectory::new(8927);
    directory.insert_override("h1", &failing.uri());
    directory.insert_override("h2", &healthy.uri());

    let groups = groups(&[("h1", &["a"]), ("h2", &["b"])]);

    let outcome = fan_out(
        &http_client(),
        &directory,
        ServiceKind::Plotting,
        ActionVerb::Suspend,
        &groups,
    )
    .await;

    // Overall failure, but h2 was still attempted and its action applied
    assert!(!outcome.success);
    assert_eq!(outcome.attempted, 2);
    assert!(outcome.error.contains("plotman: no such job on h1"));
    assert!(!outcome.error.contains("h2"));

    let healthy_requests = healthy.received_requests().await.unwrap();
    assert_eq!(healthy_requests.len(), 1);
}

#[tokio::test]
async fn unreachable_worker_does_not_short_circuit() {
    let healthy = ok_worker().await;

    let mut directory = WorkerDirectory::new(8927);
    // Nothing listens here; the request fails at the transport level
    directory.insert_override("h1", "http://127.0.0.1:1");
    directory.insert_override("h2", &healthy.uri());

    let groups = groups(&[("h1", &["a"]), ("h2", &["b"])]);

    let outcome = fan_out(
        &http_client(),
        &directory,
        ServiceKind::Plotting,
        ActionVerb::Resume,
        &groups,
    )
    .await;

    assert!(!outcome.success);
    assert_eq!(outcome.attempted, 2);
    assert!(outcome.error.contains("h1"));

    let healthy_requests = healthy.received_requests().await.unwrap();
    assert_eq!(healthy_requests.len(), 1);
}

#[tokio::test]
async fn end_to_end_group_then_fan_out() {
    let worker = ok_worker().await;

    let mut directory = WorkerDirectory::new(8927);
    directory.insert_override("h1", &worker.uri());

    let snapshot = vec![
        ("a".to_string(), "h1".to_string()),
        ("b".to_string(), "h1".to_string()),
    ];
    let requested = vec!["a".to_string(), "b".to_string(), "stale".to_string()];

    let (groups, dropped) = group_by_worker(&snapshot, &requested);
    assert_eq!(dropped, 1);

    let outcome = fan_out(
        &http_client(),
        &directory,
        ServiceKind::Plotting,
        ActionVerb::Kill,
        &groups,
    )
    .await;

    assert!(outcome.success);
    assert_eq!(outcome.attempted, 1);

    let requests = worker.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["plot_ids"], serde_json::json!(["a", "b"]));
}
