//! Quality scorer: a 0–9 heuristic per slot.
//!
//! direction (north wind) + wave band + wind band. Wave and wind must both
//! be known to score a slot; direction never blocks scoring.

use crate::config::{Band, ScoringRules};
use crate::error::ConfigError;
use crate::models::{NormalizedSlot, ScoreBreakdown, ScoredSlot};
use crate::scraper::calendar::fold;
use tracing::debug;

/// Points of the first band whose `max` is >= `value`, or 0.
pub fn band_points(bands: &[Band], value: f64) -> u8 {
    bands
        .iter()
        .find(|b| value <= b.max)
        .map_or(0, |b| b.points)
}

#[derive(Debug, Clone)]
pub struct QualityScorer {
    rules: ScoringRules,
    keyword: String,
}

impl QualityScorer {
    /// Rejects rules that could score outside 0–9.
    pub fn new(rules: &ScoringRules) -> Result<Self, ConfigError> {
        rules.validate()?;
        Ok(Self {
            keyword: fold(&rules.north_keyword),
            rules: rules.clone(),
        })
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn direction_points(&self, direction: &str) -> u8 {
        if fold(direction).contains(&self.keyword) {
            self.rules.direction_points
        } else {
            0
        }
    }

    pub fn breakdown(&self, slot: &NormalizedSlot) -> ScoreBreakdown {
        ScoreBreakdown {
            direction: self.direction_points(&slot.wind_direction_raw),
            wave: slot.wave_size_mean.map(|w| band_points(&self.rules.wave_bands, w)),
            wind: slot.wind_speed_value.map(|v| band_points(&self.rules.wind_bands, v)),
        }
    }

    /// `None` unless both wave and wind are known.
    pub fn quality(&self, slot: &NormalizedSlot) -> Option<u8> {
        self.breakdown(slot).total()
    }

    pub fn score(&self, slot: NormalizedSlot) -> ScoredSlot {
        let breakdown = self.breakdown(&slot);
        ScoredSlot {
            quality: breakdown.total(),
            slot,
            breakdown,
        }
    }

    pub fn score_all(&self, slots: Vec<NormalizedSlot>) -> Vec<ScoredSlot> {
        let scored: Vec<ScoredSlot> = slots.into_iter().map(|s| self.score(s)).collect();
        let unscorable = scored.iter().filter(|s| !s.is_scorable()).count();
        debug!("Scored {} slots ({} unscorable)", scored.len(), unscorable);
        scored
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        let rules = ScoringRules::default();
        Self {
            keyword: fold(&rules.north_keyword),
            rules,
        }
    }
}
