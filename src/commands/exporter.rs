// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::models::Record;
use crate::report::{export_rows, ExportRow, EXPORT_HEADERS};

pub fn export_records(records: &[Record], sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();
    let out = sub
        .get_one::<String>("out")
        .map(|s| s.trim().to_string())
        .context("--out is required")?;
    write_records(records, &fmt, Path::new(&out))?;
    println!("Exported {} records to {}", records.len(), out);
    Ok(())
}

pub fn write_records(records: &[Record], fmt: &str, out: &Path) -> Result<()> {
    let rows: Vec<ExportRow> = records.iter().flat_map(export_rows).collect();
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record(EXPORT_HEADERS)?;
            for row in &rows {
                wtr.write_record(row.cells())?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(records = records.len(), rows = rows.len(), path = %out.display(), "export written");
    Ok(())
}
