// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! API context for the plotwatch controller

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;

use plotwatch_controller_api::PlotListQuery;
use plotwatch_types::{ActionRequest, DispatchReport, PlotRecord, ServiceKind};

use crate::config::ControllerConfig;
use crate::db::{Database, DbError};
use crate::dispatch;
use crate::farm_rpc::{FarmRpcClient, FarmRpcError, resolve_plot_type};
use crate::workers::{WorkerClient, WorkerClientError, WorkerDirectory};

/// Default page size for the plot listing endpoint.
const DEFAULT_LIST_LIMIT: u32 = 1000;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Plot batch is empty")]
    EmptyBatch,

    #[error("Classification fetch failed: {0}")]
    Classification(#[from] FarmRpcError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Worker config proxy errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config failed YAML validation: {0}")]
    InvalidYaml(String),

    #[error(transparent)]
    Worker(#[from] WorkerClientError),
}

/// API context shared across all request handlers
pub struct ApiContext {
    db: Arc<Database>,
    farm_rpc: Arc<FarmRpcClient>,
    http_client: reqwest::Client,
    workers: WorkerDirectory,
}

impl ApiContext {
    /// Create a new API context
    pub async fn new(config: ControllerConfig) -> Result<Self> {
        let db = Arc::new(Database::new(&config.database_url).await?);

        let farm_rpc = Arc::new(FarmRpcClient::new(
            config.farm_rpc_url.clone(),
            config.http_timeout_secs,
        )?);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let workers = WorkerDirectory::new(config.worker_agent_port);

        Ok(Self {
            db,
            farm_rpc,
            http_client,
            workers,
        })
    }

    /// List plots with optional filters and paging
    pub async fn list_plots(&self, query: &PlotListQuery) -> Result<Vec<PlotRecord>, DbError> {
        let limit = i64::from(query.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        let offset = i64::from(query.offset.unwrap_or(0));

        self.db
            .list_plots(
                query.hostname.as_deref(),
                query.plot_type.as_deref(),
                limit,
                offset,
            )
            .await
    }

    /// Ingest a plot batch reported by one worker agent.
    ///
    /// The classification listing is fetched before any mutation, so a
    /// fetch failure rejects the batch with the store untouched. The target
    /// hostname comes from the first record; the whole batch then replaces
    /// that hostname's stored records atomically.
    pub async fn ingest_plots(
        &self,
        mut batch: Vec<PlotRecord>,
    ) -> Result<Vec<PlotRecord>, IngestError> {
        let hostname = match batch.first() {
            Some(first) => first.hostname.clone(),
            None => return Err(IngestError::EmptyBatch),
        };

        let listing = self.farm_rpc.get_all_plots().await?;

        for record in &mut batch {
            record.plot_type = resolve_plot_type(&record.plot_id, &listing);
        }

        self.db.replace_host_plots(&hostname, &batch).await?;

        tracing::info!(
            hostname = %hostname,
            count = batch.len(),
            "Stored plot batch"
        );

        Ok(batch)
    }

    /// List plots stored for one worker
    pub async fn host_plots(&self, hostname: &str) -> Result<Vec<PlotRecord>, DbError> {
        self.db.plots_for_host(hostname).await
    }

    /// Replace one worker's plots as supplied, without classification
    pub async fn replace_host_plots(
        &self,
        hostname: &str,
        batch: Vec<PlotRecord>,
    ) -> Result<Vec<PlotRecord>, DbError> {
        self.db.replace_host_plots(hostname, &batch).await?;

        tracing::info!(
            hostname = %hostname,
            count = batch.len(),
            "Replaced plot records"
        );

        Ok(batch)
    }

    /// Delete one worker's plots
    pub async fn delete_host_plots(&self, hostname: &str) -> Result<(), DbError> {
        let deleted = self.db.delete_host_plots(hostname).await?;

        tracing::info!(hostname = %hostname, deleted, "Deleted plot records");

        Ok(())
    }

    /// Resolve, group and fan out a control action
    pub async fn dispatch_action(&self, request: ActionRequest) -> Result<DispatchReport, DbError> {
        let snapshot = self.db.plot_locations().await?;
        let (groups, dropped) = dispatch::group_by_worker(&snapshot, &request.plot_ids);

        tracing::info!(
            action = %request.action,
            workers = groups.len(),
            dropped,
            "Dispatching plot action"
        );

        let outcome = dispatch::fan_out(
            &self.http_client,
            &self.workers,
            request.service,
            request.action,
            &groups,
        )
        .await;

        Ok(DispatchReport {
            success: outcome.success,
            attempted: outcome.attempted,
            dropped,
            error: outcome.error,
        })
    }

    /// Fetch a worker service's raw YAML config
    pub async fn worker_config(
        &self,
        hostname: &str,
        service: ServiceKind,
    ) -> Result<String, WorkerClientError> {
        let worker = WorkerClient::new(self.http_client.clone(), self.workers.base_url(hostname));
        worker.get_config(service).await
    }

    /// Validate and save a worker service's YAML config.
    ///
    /// Validation happens before the remote call: invalid YAML never
    /// reaches the worker, whose config stays untouched.
    pub async fn save_worker_config(
        &self,
        hostname: &str,
        service: ServiceKind,
        config: &str,
    ) -> Result<(), ConfigError> {
        serde_yaml::from_str::<serde_yaml::Value>(config)
            .map_err(|e| ConfigError::InvalidYaml(e.to_string()))?;

        let worker = WorkerClient::new(self.http_client.clone(), self.workers.base_url(hostname));
        worker.put_config(service, config).await?;

        tracing::info!(
            hostname = %hostname,
            service = %service,
            "Saved worker config"
        );

        Ok(())
    }
}
