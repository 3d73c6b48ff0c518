// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Deduplicating collector
//!
//! Normalizes the raw inventory into the records reported upstream: one
//! record per distinct plot id (first occurrence wins), optionally limited
//! to plots newer than a watermark, with this worker's hostname injected.
//!
//! A duplicate plot id means the same plot exists at two paths (usually a
//! copy the operator forgot to delete); it is logged for visibility and
//! dropped, never treated as a failure.

use std::collections::HashMap;

use plotwatch_types::PlotRecord;

use crate::source::RawPlotRow;

/// Normalize raw inventory rows into plot records.
///
/// `since` is the watermark: rows whose `created_at` is not strictly
/// greater (string comparison, both sides use the fixed
/// `YYYY-MM-DD HH:MM:SS.000` form) are omitted. `None` keeps every row.
///
/// Deduplication happens before the watermark filter, so a duplicate's
/// timestamp never resurrects a plot id that was already seen.
pub fn collect(rows: Vec<RawPlotRow>, hostname: &str, since: Option<&str>) -> Vec<PlotRecord> {
    let mut seen: HashMap<String, (String, String)> = HashMap::new();
    let mut records = Vec::new();

    for row in rows {
        if let Some((first_dir, first_file)) = seen.get(&row.plot_id) {
            tracing::info!(
                plot_id = %row.plot_id,
                "Skipping plot at {}/{} because the same plot id was found at {}/{}",
                row.dir,
                row.file,
                first_dir,
                first_file
            );
            continue;
        }
        seen.insert(row.plot_id.clone(), (row.dir.clone(), row.file.clone()));

        if let Some(cutoff) = since {
            if row.created_at.as_str() <= cutoff {
                continue;
            }
        }

        records.push(PlotRecord {
            plot_id: row.plot_id,
            hostname: hostname.to_string(),
            dir: row.dir,
            file: row.file,
            created_at: row.created_at,
            size: row.size,
            plot_type: String::new(),
        });
    }

    records
}
