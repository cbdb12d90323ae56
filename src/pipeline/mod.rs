//! Pipeline orchestrator: fetch → extract → normalize → score → report.
//!
//! `run()` — one scrape:
//!   1. Fetch the forecast page (single attempt unless retries are configured)
//!   2. Extract raw rows; write the CSV snapshot if a path is given
//!   3. Normalize, score, select KPIs
//! Fetch and extraction failures abort the run. A forecast with nothing
//! scorable still produces the snapshot and the scored rows; only the
//! report fields carry the error.
//!
//! `analyse()` — step 3 only, for rows that came from a snapshot.

use crate::config::AppConfig;
use crate::error::{ConfigError, NoScorableSlotsError};
use crate::models::{DocumentInfo, RawSlot, Report, ScoredSlot, SlotFilter};
use crate::report::build_report;
use crate::scoring::QualityScorer;
use crate::scraper::ForecastSource;
use crate::scraper::calendar::DayLabelTable;
use crate::scraper::cleaner::{NormalizeContext, normalize_slots};
use crate::scraper::parsers::TableExtractor;
use crate::storage::write_snapshot;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

pub struct Pipeline {
    config: AppConfig,
    scorer: QualityScorer,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        config.locale.validate()?;
        let scorer = QualityScorer::new(&config.scoring)?;
        Ok(Self { config, scorer })
    }

    /// `reference` defaults to the fetch date.
    pub async fn run<S>(
        &self,
        source: &S,
        url: &str,
        reference: Option<NaiveDate>,
        snapshot: Option<&Path>,
    ) -> Result<PipelineOutput>
    where
        S: ForecastSource + ?Sized,
    {
        // ── 1. Fetch ──────────────────────────────────────────────────────────
        let page = source
            .fetch_page(url)
            .await
            .with_context(|| format!("Forecast fetch failed for {}", url))?;

        // ── 2. Extract ────────────────────────────────────────────────────────
        let extractor = TableExtractor::new(&self.config.extract, &self.config.locale);
        let extraction = extractor
            .extract(&page.html, &page.info)
            .context("Forecast extraction failed")?;

        if let Some(path) = snapshot {
            write_snapshot(path, &extraction.slots)?;
        }

        // ── 3. Normalize / score / report ─────────────────────────────────────
        let reference = reference.unwrap_or_else(|| page.info.fetched_at.date());
        let mut output = self.analyse(extraction.slots, reference);
        output.skipped = extraction.skipped;
        output.document = Some(page.info);
        Ok(output)
    }

    pub fn analyse(&self, raw: Vec<RawSlot>, reference: NaiveDate) -> PipelineOutput {
        info!("Analysing {} rows (reference date {})", raw.len(), reference);

        let ctx = NormalizeContext::new(reference, DayLabelTable::from_config(&self.config.locale));
        let normalized = normalize_slots(&raw, &ctx);

        let scored = self.scorer.score_all(normalized);

        let report = build_report(&scored, SlotFilter::Any);
        let north_report = build_report(&scored, SlotFilter::NorthOnly);

        match &report {
            Ok(r) => info!(
                "Best slot: {} {} (quality {:?}, gauge {:.1}%)",
                r.best_slot.slot.day_label, r.best_slot.slot.hour_label, r.best_slot.quality, r.quality_gauge
            ),
            Err(e) => warn!("{}", e),
        }

        PipelineOutput {
            document: None,
            raw,
            skipped: 0,
            scored,
            report,
            north_report,
        }
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    /// Absent when the rows came from a snapshot.
    pub document: Option<DocumentInfo>,
    pub raw: Vec<RawSlot>,
    pub skipped: usize,
    pub scored: Vec<ScoredSlot>,
    pub report: Result<Report, NoScorableSlotsError>,
    pub north_report: Result<Report, NoScorableSlotsError>,
}

impl PipelineOutput {
    pub fn report_for(&self, filter: SlotFilter) -> &Result<Report, NoScorableSlotsError> {
        match filter {
            SlotFilter::Any => &self.report,
            SlotFilter::NorthOnly => &self.north_report,
        }
    }
}
