//! CSV snapshot reader, for re-scoring a past scrape offline.

use crate::models::RawSlot;
use crate::storage::SNAPSHOT_HEADER;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub fn read_snapshot<R: Read>(reader: R) -> Result<Vec<RawSlot>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let found: Vec<&str> = headers.iter().map(str::trim).collect();
    if found != SNAPSHOT_HEADER {
        bail!("Unexpected snapshot header {:?}, expected {:?}", found, SNAPSHOT_HEADER);
    }

    let mut slots = Vec::new();
    for (i, result) in rdr.deserialize::<RawSlot>().enumerate() {
        match result {
            Ok(slot) => slots.push(slot),
            Err(e) => warn!("Row {}: {}", i + 1, e),
        }
    }
    Ok(slots)
}

pub fn load_snapshot(path: &Path) -> Result<Vec<RawSlot>> {
    let file = std::fs::File::open(path).with_context(|| format!("Cannot open snapshot {:?}", path))?;
    let slots = read_snapshot(file).with_context(|| format!("Cannot read snapshot {:?}", path))?;
    info!("{:?}: {} rows loaded", path, slots.len());
    Ok(slots)
}

/// Local date the snapshot was last written: the scrape's "today".
pub fn snapshot_date(path: &Path) -> Option<NaiveDate> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified).date_naive())
}
