use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Raw forecast rows ─────────────────────────────────────────────────────────

/// One forecast row exactly as scraped. The serde names are the CSV snapshot
/// header and must stay stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawSlot {
    #[serde(rename = "Day")]
    pub day_label: String,      // "Lundi 10 Juin", "Aujourd'hui"
    #[serde(rename = "Hour")]
    pub hour_label: String,     // "09:00"
    #[serde(rename = "Waves_size")]
    pub wave_range_raw: String, // "0.8m - 0.7m"
    #[serde(rename = "Wind_speed")]
    pub wind_speed_raw: String, // "24 km/h"
    #[serde(rename = "Wind_direction")]
    pub wind_direction_raw: String,
}

impl RawSlot {
    pub fn new(
        day: impl Into<String>,
        hour: impl Into<String>,
        waves: impl Into<String>,
        wind_speed: impl Into<String>,
        wind_direction: impl Into<String>,
    ) -> Self {
        Self {
            day_label: day.into(),
            hour_label: hour.into(),
            wave_range_raw: waves.into(),
            wind_speed_raw: wind_speed.into(),
            wind_direction_raw: wind_direction.into(),
        }
    }
}

/// Extractor output: conforming rows in document order, plus how many rows
/// were dropped for not matching the expected layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub slots: Vec<RawSlot>,
    pub skipped: usize,
}

/// Identifying info for a fetched document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub url: String,
    pub fetched_at: NaiveDateTime,
}

// ── Normalized / scored slots ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedSlot {
    pub day_label: String,
    pub hour_label: String,
    pub wave_size_mean: Option<f64>,
    pub wind_speed_value: Option<f64>,
    pub wind_direction_raw: String,
    pub timestamp: Option<NaiveDateTime>,
}

/// Per-dimension points. `None` means the input for that dimension was missing.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub direction: u8,
    pub wave: Option<u8>,
    pub wind: Option<u8>,
}

impl ScoreBreakdown {
    /// Sum of the parts; `None` if wave or wind is unknown.
    pub fn total(&self) -> Option<u8> {
        self.direction.checked_add(self.wave?)?.checked_add(self.wind?)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredSlot {
    #[serde(flatten)]
    pub slot: NormalizedSlot,
    pub breakdown: ScoreBreakdown,
    pub quality: Option<u8>,
}

impl ScoredSlot {
    pub fn is_scorable(&self) -> bool {
        self.quality.is_some()
    }

    pub fn faces_north(&self) -> bool {
        self.breakdown.direction > 0
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Which slots a best-slot query may pick from.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotFilter {
    #[default]
    Any,
    NorthOnly,
}

impl fmt::Display for SlotFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotFilter::Any => f.write_str("any direction"),
            SlotFilter::NorthOnly => f.write_str("north-only"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    pub filter: SlotFilter,
    /// Position of `best_slot` in the scored sequence.
    pub best_index: usize,
    pub best_slot: ScoredSlot,
    pub quality_gauge: f64, // 0–100
    pub max_wave: Option<f64>,
}

/// A fetched forecast page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub info: DocumentInfo,
    pub html: String,
}
