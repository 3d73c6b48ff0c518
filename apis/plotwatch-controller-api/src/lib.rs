// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Dropshot API trait for the plotwatch controller service.
//!
//! The controller is the central aggregation point for a fleet of farming
//! workers. It:
//!
//! - Ingests plot-status batches reported by worker agents
//! - Cross-references each record against the farmer RPC to classify plots
//! - Resolves plot ids to their owning workers and fans out control actions
//! - Proxies worker service configuration, validating YAML before saving
//!
//! ## Endpoints
//!
//! - `GET /plots` - List plots, filterable and paged
//! - `POST /plots` - Ingest a batch of plot records (replace by hostname)
//! - `GET /plots/{hostname}` - List plots for one worker
//! - `PUT /plots/{hostname}` - Replace plots for one worker
//! - `DELETE /plots/{hostname}` - Delete plots for one worker
//! - `POST /actions` - Dispatch a control action to the owning workers
//! - `GET /workers/{hostname}/configs/{service}` - Fetch a worker config
//! - `PUT /workers/{hostname}/configs/{service}` - Save a worker config

use dropshot::{
    HttpError, HttpResponseCreated, HttpResponseDeleted, HttpResponseOk,
    HttpResponseUpdatedNoContent, Path, Query, RequestContext, TypedBody,
};
use plotwatch_types::{ActionRequest, DispatchReport, PlotRecord, ServiceKind, WorkerConfigPayload};
use schemars::JsonSchema;
use serde::Deserialize;

/// Path parameters for per-hostname plot endpoints.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HostnamePath {
    /// The worker hostname
    pub hostname: String,
}

/// Path parameters for worker config endpoints.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkerConfigPath {
    /// The worker hostname
    pub hostname: String,
    /// The worker-side service the config belongs to
    pub service: ServiceKind,
}

/// Query parameters for the plot listing endpoint.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct PlotListQuery {
    /// Restrict to plots on this worker
    pub hostname: Option<String>,
    /// Restrict to plots of this classification ("solo", "portable", "")
    #[serde(rename = "type")]
    pub plot_type: Option<String>,
    /// Maximum number of records to return
    pub limit: Option<u32>,
    /// Number of records to skip
    pub offset: Option<u32>,
}

/// Plotwatch Controller API
///
/// This API is used by worker agents to report plot status and by operators
/// to inspect the aggregated state and act on plots across the fleet.
#[dropshot::api_description]
pub trait ControllerApi {
    /// Context type for request handlers
    type Context: Send + Sync + 'static;

    /// List plots
    ///
    /// Returns plot records across all workers, optionally filtered by
    /// hostname and classification, with limit/offset paging.
    #[endpoint {
        method = GET,
        path = "/plots",
        tags = ["plots"],
    }]
    async fn list_plots(
        rqctx: RequestContext<Self::Context>,
        query: Query<PlotListQuery>,
    ) -> Result<HttpResponseOk<Vec<PlotRecord>>, HttpError>;

    /// Ingest a plot batch
    ///
    /// Accepts a batch of plot records reported by one worker agent. The
    /// target hostname is derived from the first record; every record
    /// previously stored for that hostname is replaced by this batch
    /// (delete-then-insert, all-or-nothing). Each record's classification
    /// is resolved against the farmer RPC before storing.
    ///
    /// Returns 201 with the stored records, classifications resolved.
    /// Returns 400 if the batch is empty.
    /// Returns 500 if the classification fetch or the store fails; nothing
    /// is persisted in that case.
    #[endpoint {
        method = POST,
        path = "/plots",
        tags = ["plots"],
    }]
    async fn ingest_plots(
        rqctx: RequestContext<Self::Context>,
        body: TypedBody<Vec<PlotRecord>>,
    ) -> Result<HttpResponseCreated<Vec<PlotRecord>>, HttpError>;

    /// List plots for one worker
    #[endpoint {
        method = GET,
        path = "/plots/{hostname}",
        tags = ["plots"],
    }]
    async fn get_host_plots(
        rqctx: RequestContext<Self::Context>,
        path: Path<HostnamePath>,
    ) -> Result<HttpResponseOk<Vec<PlotRecord>>, HttpError>;

    /// Replace plots for one worker
    ///
    /// Idempotent full replacement of the stored records for the hostname
    /// in the path. Same delete-then-insert contract as ingestion but with
    /// no RPC cross-referencing: classifications are stored as supplied.
    #[endpoint {
        method = PUT,
        path = "/plots/{hostname}",
        tags = ["plots"],
    }]
    async fn replace_host_plots(
        rqctx: RequestContext<Self::Context>,
        path: Path<HostnamePath>,
        body: TypedBody<Vec<PlotRecord>>,
    ) -> Result<HttpResponseOk<Vec<PlotRecord>>, HttpError>;

    /// Delete plots for one worker
    #[endpoint {
        method = DELETE,
        path = "/plots/{hostname}",
        tags = ["plots"],
    }]
    async fn delete_host_plots(
        rqctx: RequestContext<Self::Context>,
        path: Path<HostnamePath>,
    ) -> Result<HttpResponseDeleted, HttpError>;

    /// Dispatch a control action
    ///
    /// Resolves each plot id's owning worker from the persisted snapshot,
    /// groups ids by worker, and issues one control request per worker.
    /// Ids owned by no known worker are dropped and counted in the report.
    /// Worker requests are independent; one failure does not prevent the
    /// rest from being attempted.
    ///
    /// Always returns 200 with a report; `success` is false if any worker
    /// request failed, with the failure bodies aggregated in `error`.
    #[endpoint {
        method = POST,
        path = "/actions",
        tags = ["actions"],
    }]
    async fn dispatch_action(
        rqctx: RequestContext<Self::Context>,
        body: TypedBody<ActionRequest>,
    ) -> Result<HttpResponseOk<DispatchReport>, HttpError>;

    /// Fetch a worker service config
    ///
    /// Proxies `GET /configs/{service}` on the named worker and returns the
    /// raw YAML text.
    ///
    /// Returns 500 if the worker is unreachable or returns an error.
    #[endpoint {
        method = GET,
        path = "/workers/{hostname}/configs/{service}",
        tags = ["configs"],
    }]
    async fn get_worker_config(
        rqctx: RequestContext<Self::Context>,
        path: Path<WorkerConfigPath>,
    ) -> Result<HttpResponseOk<WorkerConfigPayload>, HttpError>;

    /// Save a worker service config
    ///
    /// Validates the payload as YAML locally, then proxies
    /// `PUT /configs/{service}` on the named worker. Invalid YAML is
    /// rejected with 400 before any remote call, leaving the worker's
    /// config untouched.
    ///
    /// Returns 500 if the worker is unreachable or returns an error.
    #[endpoint {
        method = PUT,
        path = "/workers/{hostname}/configs/{service}",
        tags = ["configs"],
    }]
    async fn put_worker_config(
        rqctx: RequestContext<Self::Context>,
        path: Path<WorkerConfigPath>,
        body: TypedBody<WorkerConfigPayload>,
    ) -> Result<HttpResponseUpdatedNoContent, HttpError>;
}
