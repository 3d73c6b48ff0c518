// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Plotwatch Controller Service
//!
//! The controller aggregates plot status across a fleet of farming
//! workers. It:
//!
//! - Ingests plot batches reported by worker agents
//! - Classifies each plot via the farmer RPC at ingestion time
//! - Persists the per-worker inventory in PostgreSQL (full replace)
//! - Fans out control actions (suspend/resume/kill plots) to workers
//! - Proxies worker service configs, validating YAML before saving

use anyhow::{Context, Result};
use dropshot::{ConfigDropshot, ConfigLogging, ConfigLoggingLevel, HttpServerStarter};
use tracing::info;

use plotwatch_controller::ControllerImpl;
use plotwatch_controller::config::ControllerConfig;
use plotwatch_controller::context::ApiContext;

/// Default bind address for the HTTP server.
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8926";

/// Default maximum request body size (bytes).
const DEFAULT_BODY_MAX_BYTES: usize = 10 * 1024 * 1024; // 10MB

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
                println!(
                    "  BIND_ADDRESS       Server bind address (default: {})",
                    DEFAULT_BIND_ADDRESS
                );
                println!("  DATABASE_URL       PostgreSQL connection URL (required)");
                println!("  FARM_RPC_URL       Farmer RPC URL for plot classification (required)");
                println!("  WORKER_AGENT_PORT  Port worker control surfaces listen on (default: 8927)");
                println!("  HTTP_TIMEOUT_SECS  HTTP client timeout (default: 30)");
                println!(
                    "  RUST_LOG           Log filter (default: plotwatch_controller=info,dropshot=info)"
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
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "plotwatch_controller=info,dropshot=info".to_string()),
        ))
        .init();

    print_version();

    // Load configuration
    let config = ControllerConfig::from_env().context("Failed to load configuration")?;
    info!("Database URL: {}", config.database_url_display());
    info!("Farmer RPC URL: {}", config.farm_rpc_url);

    // Create API context
    let api_context = ApiContext::new(config)
        .await
        .context("Failed to create API context")?;

    // Get API description from the trait implementation
    let api = plotwatch_controller_api::controller_api_mod::api_description::<ControllerImpl>()
        .map_err(|e| anyhow::anyhow!("Failed to create API description: {}", e))?;

    // Configure the server
    let bind_address = std::env::var("BIND_ADDRESS")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string())
        .parse()
        .context("Invalid BIND_ADDRESS")?;

    let config_dropshot = ConfigDropshot {
        bind_address,
        default_request_body_max_bytes: DEFAULT_BODY_MAX_BYTES,
        default_handler_task_mode: dropshot::HandlerTaskMode::Detached,
        ..Default::default()
    };

    let config_logging = ConfigLogging::StderrTerminal {
        level: ConfigLoggingLevel::Info,
    };

    let log = config_logging
        .to_logger("plotwatch-controller")
        .map_err(|error| anyhow::anyhow!("failed to create logger: {}", error))?;

    // Start the server
    let server = HttpServerStarter::new(&config_dropshot, api, api_context, &log)
        .map_err(|error| anyhow::anyhow!("failed to create server: {}", error))?
        .start();

    info!("Plotwatch controller running on http://{}", bind_address);

    server
        .await
        .map_err(|error| anyhow::anyhow!("server failed: {}", error))
}
