// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Plotwatch Agent Service
//!
//! The agent runs on every farming/harvesting worker and keeps the central
//! controller's view of this worker's plots current. It:
//!
//! - Pulls the plot inventory from the local harvester RPC
//! - Deduplicates plots by content-derived id (first occurrence wins)
//! - Reports the full inventory once per process lifetime, then only
//!   plots created inside a sliding 15-minute window
//! - Skips entirely on workers that neither farm nor harvest

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use plotwatch_agent::config::AgentConfig;
use plotwatch_agent::source::FarmerRpcSource;
use plotwatch_agent::sync::SyncLoop;
use plotwatch_agent::uplink::ControllerClient;

fn print_version() {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let buildstamp = option_env!("STAMP").unwrap_or("no-STAMP");
    println!("{} {} ({})", name, version, buildstamp);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --version and --help
    let args: Vec<String> = std::env::args().collect();
    #[allow(clippy::never_loop)] // Intentional: early return on first recognized arg
    for arg in &args[1..] {
        match arg.as_str() {
            "-V" | "--version" => {
                print_version();
                return Ok(());
            }
            "-h" | "--help" => {
                print_version();
                println!("Usage: {} [OPTIONS]", args[0]);
                println!();
                println!("Options:");
                println!("  -h, --help       Display this information");
                println!("  -V, --version    Display the program's version number");
                println!();
                println!("Environment variables:");
                println!("  CONTROLLER_URL      Controller base URL (required)");
                println!("  FARMER_RPC_URL      Local harvester RPC base URL (required)");
                println!("  WORKER_MODE         Roles this worker runs (default: fullnode)");
                println!("  HOSTNAME            Reported hostname (default: OS hostname)");
                println!("  SYNC_INTERVAL_SECS  Seconds between syncs (default: 60)");
                println!("  HTTP_TIMEOUT_SECS   HTTP client timeout (default: 30)");
                println!(
                    "  RUST_LOG            Log filter (default: plotwatch_agent=info)"
                );
                return Ok(());
            }
            _ => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
        }
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "plotwatch_agent=info".to_string()),
        ))
        .init();

    print_version();

    // Load configuration
    let config = AgentConfig::from_env().context("Failed to load configuration")?;
    info!("Controller URL: {}", config.controller_url);
    info!(
        hostname = %config.hostname,
        mode = %config.mode,
        "Reporting as"
    );

    let source = FarmerRpcSource::new(config.farmer_rpc_url.clone(), config.http_timeout_secs)
        .context("Failed to create harvester RPC source")?;

    let uplink = ControllerClient::new(config.controller_url.clone(), config.http_timeout_secs)
        .context("Failed to create controller client")?;

    let mut sync_loop = SyncLoop::new(
        Box::new(source),
        uplink,
        config.hostname.clone(),
        config.mode.clone(),
    );

    info!(
        interval_secs = config.sync_interval_secs,
        "Plot status sync loop running"
    );

    // Each tick runs to completion before the next is awaited, so two
    // invocations never overlap.
    let mut interval = tokio::time::interval(Duration::from_secs(config.sync_interval_secs));
    loop {
        interval.tick().await;
        sync_loop.run_once().await;
    }
}
