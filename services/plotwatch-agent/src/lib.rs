// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Plotwatch Agent Library
//!
//! This library provides the core functionality for the plotwatch worker
//! agent. The agent runs on every farming/harvesting node and periodically
//! reports the local plot inventory to the central controller.
//!
//! # Modules
//!
//! - [`config`] - Agent configuration (controller address, worker mode)
//! - [`collector`] - Deduplication and watermark filtering of raw plot rows
//! - [`source`] - Plot inventory source (local harvester RPC)
//! - [`sync`] - The periodic sync loop and its full/incremental state
//! - [`uplink`] - HTTP client for the controller's ingestion endpoint

pub mod collector;
pub mod config;
pub mod source;
pub mod sync;
pub mod uplink;
