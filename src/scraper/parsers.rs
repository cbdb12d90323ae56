//! Table extractor: forecast HTML → [`RawSlot`]s in document order.
//!
//! The forecast page is read in two ways, in order:
//!   1. the visible forecast table (five cells per row: day, hour, waves,
//!      wind speed, wind direction);
//!   2. the hidden hourly dump the site embeds in the page
//!      (`["2024-06-10 09:00:00"] => object(stdClass)#12 (20) { ... }`).
//!
//! Only "neither is present" is an error. A table with zero usable rows is a
//! valid, empty forecast.

use crate::config::{ExtractConfig, LocaleConfig};
use crate::error::ExtractionError;
use crate::models::{DocumentInfo, Extraction, RawSlot};
use crate::scraper::calendar::fold;
use crate::scraper::cleaner::parse_number;
use chrono::{Datelike, NaiveDateTime};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Day, hour, waves, wind speed, wind direction.
pub const CELLS_PER_ROW: usize = 5;

/// Tables tried in order. Only the bare `table` fallback needs a
/// recognisable header.
const TABLE_CANDIDATES: [&str; 4] = ["table.forecast", "table#forecast", "table[data-forecast]", "table"];

const HEADER_HOUR: [&str; 2] = ["heure", "hour"];
const HEADER_WIND: [&str; 2] = ["vent", "wind"];

const FR_COMPASS_16: [&str; 16] = [
    "Nord", "Nord Nord Est", "Nord Est", "Est Nord Est",
    "Est", "Est Sud Est", "Sud Est", "Sud Sud Est",
    "Sud", "Sud Sud Ouest", "Sud Ouest", "Ouest Sud Ouest",
    "Ouest", "Ouest Nord Ouest", "Nord Ouest", "Nord Nord Ouest",
];

static RE_DUMP_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\["(?P<dt>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})"\]\s*=>\s*object\(stdClass\)#\d+\s*\(\d+\)\s*\{\s*(?P<body>.*?)\n\s*\}"#,
    )
    .expect("invalid regex: dump entry")
});

static RE_DUMP_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\["(?P<key>\w+)"\]\s*=>\s*string\(\d+\)\s*"(?P<val>[^"]*)""#)
        .expect("invalid regex: dump field")
});

// ── Extractor ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    config: ExtractConfig,
    locale: LocaleConfig,
}

impl TableExtractor {
    pub fn new(config: &ExtractConfig, locale: &LocaleConfig) -> Self {
        Self {
            config: config.clone(),
            locale: locale.clone(),
        }
    }

    pub fn extract(&self, html: &str, doc: &DocumentInfo) -> Result<Extraction, ExtractionError> {
        let found = parse_forecast_table(html).or_else(|| self.parse_forecast_dump(html));

        let Some(mut extraction) = found else {
            warn!("No forecast table in {} ({} bytes)", doc.url, html.len());
            return Err(ExtractionError {
                url: doc.url.clone(),
                fetched_at: doc.fetched_at,
            });
        };

        let before = extraction.slots.len();
        extraction.slots = limit_days(extraction.slots, self.config.max_days);
        if extraction.slots.len() < before {
            debug!(
                "Dropped {} rows past the {}-day window",
                before - extraction.slots.len(),
                self.config.max_days
            );
        }

        info!("Extracted {} rows ({} skipped)", extraction.slots.len(), extraction.skipped);
        Ok(extraction)
    }

    /// Read the embedded hourly dump. `None` if the page has none.
    fn parse_forecast_dump(&self, html: &str) -> Option<Extraction> {
        let mut entries: Vec<(NaiveDateTime, RawSlot)> = Vec::new();
        let mut skipped = 0usize;
        let mut seen_any = false;

        for caps in RE_DUMP_ENTRY.captures_iter(html) {
            seen_any = true;
            let Ok(dt) = NaiveDateTime::parse_from_str(&caps["dt"], "%Y-%m-%d %H:%M:%S") else {
                skipped += 1;
                continue;
            };
            let hour = dt.format("%H:%M").to_string();
            if !self.config.target_hours.iter().any(|h| *h == hour) {
                continue;
            }

            let fields: HashMap<&str, &str> = RE_DUMP_FIELD
                .captures_iter(caps.name("body").map_or("", |m| m.as_str()))
                .filter_map(|c| Some((c.name("key")?.as_str(), c.name("val")?.as_str())))
                .collect();

            let number = |key: &str| fields.get(key).and_then(|v| parse_number(v));
            let (Some(low), Some(high), Some(wind), Some(dir)) = (
                number("houle"),
                number("houleMax"),
                number("ventMoyen"),
                number("directionVent"),
            ) else {
                debug!("Dump entry {} is missing fields, skipping", dt);
                skipped += 1;
                continue;
            };

            let slot = RawSlot::new(
                self.format_day(&dt),
                hour,
                format!("{:.1}m - {:.1}m", low, high),
                format!("{}km/h", wind.trunc() as i64),
                deg_to_compass(dir.trunc() as i64),
            );
            entries.push((dt, slot));
        }

        if !seen_any {
            return None;
        }

        debug!("Read {} entries from embedded forecast dump", entries.len());
        entries.sort_by_key(|(dt, _)| *dt);
        Some(Extraction {
            slots: entries.into_iter().map(|(_, slot)| slot).collect(),
            skipped,
        })
    }

    /// "Samedi 22 Octobre"
    fn format_day(&self, dt: &NaiveDateTime) -> String {
        let weekday = self
            .locale
            .weekdays
            .get(dt.weekday().num_days_from_monday() as usize)
            .map_or("", String::as_str);
        let month = self.locale.months.get(dt.month0() as usize).map_or("", String::as_str);
        format!("{} {} {}", weekday, dt.day(), month)
    }
}

// ── Visible table ─────────────────────────────────────────────────────────────

/// Locate the forecast table and read its rows. `None` if no table qualifies.
pub fn parse_forecast_table(html: &str) -> Option<Extraction> {
    let doc = Html::parse_document(html);

    let Ok(th_sel) = Selector::parse("thead th, thead td") else { return None };
    let Ok(tr_sel) = Selector::parse("tbody tr") else { return None };
    let Ok(td_sel) = Selector::parse("td") else { return None };

    for selector_str in &TABLE_CANDIDATES {
        let Ok(sel) = Selector::parse(selector_str) else { continue };

        for table in doc.select(&sel) {
            if *selector_str == "table" && !has_forecast_header(table, &th_sel) {
                continue;
            }

            let mut extraction = Extraction::default();
            for tr in table.select(&tr_sel) {
                let cells: Vec<String> = tr.select(&td_sel).map(cell_text).collect();

                if cells.is_empty() {
                    continue;
                }
                if cells.len() != CELLS_PER_ROW {
                    debug!("Skipping row with {} cells: {:?}", cells.len(), cells);
                    extraction.skipped += 1;
                    continue;
                }

                let mut it = cells.into_iter();
                extraction.slots.push(RawSlot {
                    day_label: it.next().unwrap_or_default(),
                    hour_label: it.next().unwrap_or_default(),
                    wave_range_raw: it.next().unwrap_or_default(),
                    wind_speed_raw: it.next().unwrap_or_default(),
                    wind_direction_raw: it.next().unwrap_or_default(),
                });
            }

            debug!("Forecast table matched by {:?}", selector_str);
            return Some(extraction);
        }
    }

    None
}

fn has_forecast_header(table: ElementRef, th_sel: &Selector) -> bool {
    let headers: Vec<String> = table.select(th_sel).map(|th| fold(&cell_text(th))).collect();
    let mentions = |words: &[&str]| headers.iter().any(|h| words.iter().any(|w| h.contains(w)));
    headers.len() >= CELLS_PER_ROW && mentions(&HEADER_HOUR) && mentions(&HEADER_WIND)
}

fn cell_text(el: ElementRef) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Keep rows until the `max_days + 1`-th distinct day label shows up.
pub fn limit_days(slots: Vec<RawSlot>, max_days: usize) -> Vec<RawSlot> {
    let mut seen: Vec<String> = Vec::new();
    let mut kept = Vec::with_capacity(slots.len());

    for slot in slots {
        if !seen.contains(&slot.day_label) {
            if seen.len() >= max_days {
                break;
            }
            seen.push(slot.day_label.clone());
        }
        kept.push(slot);
    }
    kept
}

/// Degrees → one of 16 French compass points.
pub fn deg_to_compass(deg: i64) -> String {
    let deg = deg.rem_euclid(360) as f64;
    let idx = ((deg + 11.25) / 22.5).floor() as usize % 16;
    FR_COMPASS_16[idx].to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
