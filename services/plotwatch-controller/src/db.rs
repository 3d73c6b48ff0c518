// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! PostgreSQL database layer using tokio-postgres
//!
//! Stores the per-worker plot inventory. All writes for a hostname are
//! full replacements: delete-then-insert-then-commit in one transaction,
//! so a batch either lands whole or not at all, and two ingestions for the
//! same hostname cannot interleave.

use deadpool_postgres::{Config, Pool, Runtime};
use thiserror::Error;
use tokio_postgres::NoTls;

use plotwatch_types::{Hostname, PlotId, PlotRecord};

/// Database errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl From<tokio_postgres::Error> for DbError {
    fn from(e: tokio_postgres::Error) -> Self {
        DbError::Query(e.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        DbError::Connection(e.to_string())
    }
}

/// Schema bootstrap, applied at startup.
///
/// (hostname, plot_id) is the key: the same physical plot may be reported
/// by two hosts during a migration, and replacement is scoped to one host.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS plots (
    plot_id    TEXT NOT NULL,
    hostname   TEXT NOT NULL,
    dir        TEXT NOT NULL,
    file       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    size       BIGINT NOT NULL,
    plot_type  TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (hostname, plot_id)
)";

/// Column list shared by the SELECT statements below.
const PLOT_COLUMNS: &str = "plot_id, hostname, dir, file, created_at, size, plot_type";

fn row_to_plot(row: &tokio_postgres::Row) -> PlotRecord {
    PlotRecord {
        plot_id: row.get(0),
        hostname: row.get(1),
        dir: row.get(2),
        file: row.get(3),
        created_at: row.get(4),
        size: row.get(5),
        plot_type: row.get(6),
    }
}

/// Database operations
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Create a new database connection pool from a connection URL
    pub async fn new(database_url: &str) -> Result<Self, DbError> {
        // Parse the database URL using tokio-postgres
        let pg_config: tokio_postgres::Config = database_url
            .parse()
            .map_err(|e| DbError::Connection(format!("Invalid database URL: {}", e)))?;

        // Build deadpool config from tokio-postgres config
        let mut cfg = Config::new();
        if let Some(host) = pg_config.get_hosts().first() {
            match host {
                tokio_postgres::config::Host::Tcp(host) => {
                    cfg.host = Some(host.clone());
                }
                tokio_postgres::config::Host::Unix(path) => {
                    cfg.host = Some(path.to_string_lossy().to_string());
                }
            }
        }
        if let Some(port) = pg_config.get_ports().first() {
            cfg.port = Some(*port);
        }
        if let Some(user) = pg_config.get_user() {
            cfg.user = Some(user.to_string());
        }
        if let Some(password) = pg_config.get_password() {
            cfg.password = Some(String::from_utf8_lossy(password).to_string());
        }
        if let Some(dbname) = pg_config.get_dbname() {
            cfg.dbname = Some(dbname.to_string());
        }

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DbError::Connection(format!("Failed to create pool: {}", e)))?;

        // Verify connectivity and bootstrap the schema
        let client = pool.get().await?;
        client
            .batch_execute(SCHEMA)
            .await
            .map_err(|e| DbError::Connection(format!("Failed to initialize schema: {}", e)))?;

        Ok(Self { pool })
    }

    /// Replace every stored record for `hostname` with `records`.
    ///
    /// Records keep the hostname they carry; only the deletion is scoped to
    /// the target hostname. All-or-nothing: an insert failure rolls the
    /// deletion back with it.
    pub async fn replace_host_plots(
        &self,
        hostname: &str,
        records: &[PlotRecord],
    ) -> Result<(), DbError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        tx.execute("DELETE FROM plots WHERE hostname = $1", &[&hostname])
            .await?;

        for r in records {
            tx.execute(
                "INSERT INTO plots (plot_id, hostname, dir, file, created_at, size, plot_type)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &r.plot_id,
                    &r.hostname,
                    &r.dir,
                    &r.file,
                    &r.created_at,
                    &r.size,
                    &r.plot_type,
                ],
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// List plots, optionally filtered, with limit/offset paging
    pub async fn list_plots(
        &self,
        hostname: Option<&str>,
        plot_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PlotRecord>, DbError> {
        let client = self.pool.get().await?;

        let sql = format!(
            "SELECT {PLOT_COLUMNS} FROM plots
             WHERE ($1::TEXT IS NULL OR hostname = $1)
               AND ($2::TEXT IS NULL OR plot_type = $2)
             ORDER BY hostname, created_at, plot_id
             LIMIT $3 OFFSET $4"
        );
        let rows = client
            .query(sql.as_str(), &[&hostname, &plot_type, &limit, &offset])
            .await?;

        Ok(rows.iter().map(row_to_plot).collect())
    }

    /// List every plot stored for one worker
    pub async fn plots_for_host(&self, hostname: &str) -> Result<Vec<PlotRecord>, DbError> {
        let client = self.pool.get().await?;

        let sql = format!(
            "SELECT {PLOT_COLUMNS} FROM plots
             WHERE hostname = $1
             ORDER BY created_at, plot_id"
        );
        let rows = client.query(sql.as_str(), &[&hostname]).await?;

        Ok(rows.iter().map(row_to_plot).collect())
    }

    /// Delete every plot stored for one worker, returning the row count
    pub async fn delete_host_plots(&self, hostname: &str) -> Result<u64, DbError> {
        let client = self.pool.get().await?;

        let deleted = client
            .execute("DELETE FROM plots WHERE hostname = $1", &[&hostname])
            .await?;

        Ok(deleted)
    }

    /// Snapshot of plot ownership across the whole fleet, for resolving
    /// action targets to their workers.
    pub async fn plot_locations(&self) -> Result<Vec<(PlotId, Hostname)>, DbError> {
        let client = self.pool.get().await?;

        let rows = client
            .query("SELECT plot_id, hostname FROM plots ORDER BY hostname", &[])
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get(0), row.get(1)))
            .collect())
    }
}

// ============================================================================
// Mock Database for Testing
// ============================================================================


// ============================================================================
// Tests
// ============================================================================
