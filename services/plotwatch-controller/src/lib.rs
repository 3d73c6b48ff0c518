// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Plotwatch Controller Library
//!
//! This library provides the core functionality for the plotwatch
//! controller service: plot-status ingestion and reconciliation, action
//! fan-out to workers, and the worker config proxy.
//!
//! # Modules
//!
//! - [`config`] - Controller configuration (database, RPC, worker port)
//! - [`context`] - API context for request handlers
//! - [`db`] - PostgreSQL plot store (replace-by-hostname semantics)
//! - [`dispatch`] - Plot-id resolution, grouping and per-worker fan-out
//! - [`farm_rpc`] - Farmer RPC client used for plot classification
//! - [`workers`] - HTTP client for the worker agent control surface

pub mod config;
pub mod context;
pub mod db;
pub mod dispatch;
pub mod farm_rpc;
pub mod workers;

use dropshot::{
    HttpError, HttpResponseCreated, HttpResponseDeleted, HttpResponseOk,
    HttpResponseUpdatedNoContent, Path, Query, RequestContext, TypedBody,
};
use plotwatch_controller_api::{ControllerApi, HostnamePath, PlotListQuery, WorkerConfigPath};
use plotwatch_types::{ActionRequest, DispatchReport, PlotRecord, WorkerConfigPayload};

use crate::context::{ApiContext, ConfigError, IngestError};

/// Plotwatch Controller API implementation
///
/// This enum serves as the implementation type for the `ControllerApi`
/// trait. It contains no data - all state is stored in the `ApiContext`.
pub enum ControllerImpl {}

impl ControllerApi for ControllerImpl {
    type Context = ApiContext;

    async fn list_plots(
        rqctx: RequestContext<Self::Context>,
        query: Query<PlotListQuery>,
    ) -> Result<HttpResponseOk<Vec<PlotRecord>>, HttpError> {
        let ctx = rqctx.context();
        let query = query.into_inner();

        let plots = ctx
            .list_plots(&query)
            .await
            .map_err(|e| HttpError::for_internal_error(format!("Failed to list plots: {}", e)))?;

        Ok(HttpResponseOk(plots))
    }

    async fn ingest_plots(
        rqctx: RequestContext<Self::Context>,
        body: TypedBody<Vec<PlotRecord>>,
    ) -> Result<HttpResponseCreated<Vec<PlotRecord>>, HttpError> {
        let ctx = rqctx.context();
        let batch = body.into_inner();

        tracing::info!(count = batch.len(), "Received plot batch");

        let stored = ctx.ingest_plots(batch).await.map_err(|e| match e {
            IngestError::EmptyBatch => {
                HttpError::for_bad_request(None, "Plot batch must not be empty".to_string())
            }
            IngestError::Classification(e) => {
                HttpError::for_internal_error(format!("Classification fetch failed: {}", e))
            }
            IngestError::Db(e) => {
                HttpError::for_internal_error(format!("Failed to store plot batch: {}", e))
            }
        })?;

        Ok(HttpResponseCreated(stored))
    }

    async fn get_host_plots(
        rqctx: RequestContext<Self::Context>,
        path: Path<HostnamePath>,
    ) -> Result<HttpResponseOk<Vec<PlotRecord>>, HttpError> {
        let ctx = rqctx.context();
        let hostname = path.into_inner().hostname;

        let plots = ctx
            .host_plots(&hostname)
            .await
            .map_err(|e| HttpError::for_internal_error(format!("Failed to list plots: {}", e)))?;

        Ok(HttpResponseOk(plots))
    }

    async fn replace_host_plots(
        rqctx: RequestContext<Self::Context>,
        path: Path<HostnamePath>,
        body: TypedBody<Vec<PlotRecord>>,
    ) -> Result<HttpResponseOk<Vec<PlotRecord>>, HttpError> {
        let ctx = rqctx.context();
        let hostname = path.into_inner().hostname;
        let batch = body.into_inner();

        let stored = ctx.replace_host_plots(&hostname, batch).await.map_err(|e| {
            HttpError::for_internal_error(format!("Failed to replace plots: {}", e))
        })?;

        Ok(HttpResponseOk(stored))
    }

    async fn delete_host_plots(
        rqctx: RequestContext<Self::Context>,
        path: Path<HostnamePath>,
    ) -> Result<HttpResponseDeleted, HttpError> {
        let ctx = rqctx.context();
        let hostname = path.into_inner().hostname;

        ctx.delete_host_plots(&hostname)
            .await
            .map_err(|e| HttpError::for_internal_error(format!("Failed to delete plots: {}", e)))?;

        Ok(HttpResponseDeleted())
    }

    async fn dispatch_action(
        rqctx: RequestContext<Self::Context>,
        body: TypedBody<ActionRequest>,
    ) -> Result<HttpResponseOk<DispatchReport>, HttpError> {
        let ctx = rqctx.context();
        let request = body.into_inner();

        let report = ctx.dispatch_action(request).await.map_err(|e| {
            HttpError::for_internal_error(format!("Failed to resolve plot owners: {}", e))
        })?;

        Ok(HttpResponseOk(report))
    }

    async fn get_worker_config(
        rqctx: RequestContext<Self::Context>,
        path: Path<WorkerConfigPath>,
    ) -> Result<HttpResponseOk<WorkerConfigPayload>, HttpError> {
        let ctx = rqctx.context();
        let path = path.into_inner();

        let config = ctx
            .worker_config(&path.hostname, path.service)
            .await
            .map_err(|e| {
                HttpError::for_internal_error(format!(
                    "Failed to fetch {} config from {}: {}",
                    path.service, path.hostname, e
                ))
            })?;

        Ok(HttpResponseOk(WorkerConfigPayload { config }))
    }

    async fn put_worker_config(
        rqctx: RequestContext<Self::Context>,
        path: Path<WorkerConfigPath>,
        body: TypedBody<WorkerConfigPayload>,
    ) -> Result<HttpResponseUpdatedNoContent, HttpError> {
        let ctx = rqctx.context();
        let path = path.into_inner();
        let payload = body.into_inner();

        ctx.save_worker_config(&path.hostname, path.service, &payload.config)
            .await
            .map_err(|e| match e {
                ConfigError::InvalidYaml(msg) => HttpError::for_bad_request(
                    None,
                    format!("Config failed YAML validation: {}", msg),
                ),
                ConfigError::Worker(e) => HttpError::for_internal_error(format!(
                    "Failed to save {} config to {}: {}",
                    path.service, path.hostname, e
                )),
            })?;

        Ok(HttpResponseUpdatedNoContent())
    }
}
