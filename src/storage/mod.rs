//! Run outputs: the raw CSV snapshot and the JSON report for the
//! visualization layer.

use crate::models::{RawSlot, Report, ScoredSlot};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CSV_NAME: &str = "data_surf.csv";

/// Snapshot columns, in order. Changing these breaks old snapshots.
pub const SNAPSHOT_HEADER: [&str; 5] = ["Day", "Hour", "Waves_size", "Wind_speed", "Wind_direction"];

/// None → `./data_surf.csv`; an existing directory → `<dir>/data_surf.csv`;
/// anything else is used as given.
pub fn resolve_output_path(path: Option<&Path>) -> Result<PathBuf> {
    let resolved = match path {
        None => std::env::current_dir()
            .context("Cannot read current directory")?
            .join(DEFAULT_CSV_NAME),
        Some(p) if p.is_dir() => p.join(DEFAULT_CSV_NAME),
        Some(p) => p.to_path_buf(),
    };
    Ok(resolved)
}

fn create_with_parents(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Cannot create {:?}", parent))?;
    }
    File::create(path).with_context(|| format!("Cannot create {:?}", path))
}

/// Header is always written, even for an empty forecast.
pub fn write_snapshot_to<W: Write>(writer: W, slots: &[RawSlot]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(SNAPSHOT_HEADER)?;
    for slot in slots {
        wtr.serialize(slot)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_snapshot(path: &Path, slots: &[RawSlot]) -> Result<()> {
    let file = create_with_parents(path)?;
    write_snapshot_to(file, slots).with_context(|| format!("Failed writing snapshot {:?}", path))?;
    info!("CSV saved: {:?} ({} rows)", path, slots.len());
    Ok(())
}

/// What the visualization layer consumes.
#[derive(Debug, Serialize)]
pub struct ReportExport<'a> {
    pub slots: &'a [ScoredSlot],
    pub report: Option<&'a Report>,
    pub north_report: Option<&'a Report>,
    pub skipped_rows: usize,
}

pub fn write_report_json(path: &Path, export: &ReportExport<'_>) -> Result<()> {
    let file = create_with_parents(path)?;
    serde_json::to_writer_pretty(file, export)
        .with_context(|| format!("Failed writing report {:?}", path))?;
    info!("Report saved: {:?}", path);
    Ok(())
}
