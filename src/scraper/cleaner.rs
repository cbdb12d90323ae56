//! Field normalizer: raw forecast strings → numeric/time fields.
//!
//! Every parser returns `None` instead of failing; a bad cell only blanks
//! that field, never the row.

use crate::models::{NormalizedSlot, RawSlot};
use crate::scraper::calendar::{DayLabelTable, DayRef};
use chrono::{Days, NaiveDate, NaiveTime};
use tracing::{debug, warn};

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse a bare number, accepting a decimal comma.
/// "0.8" → 0.8 | "1,5" → 1.5 | "N/A" → None
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "-" || s == "—" {
        return None;
    }
    let value: f64 = s.replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Strip a case-insensitive unit suffix and surrounding whitespace.
fn strip_unit<'a>(s: &'a str, unit: &str) -> &'a str {
    let s = s.trim();
    match s.len().checked_sub(unit.len()) {
        Some(cut) if s.is_char_boundary(cut) && s[cut..].eq_ignore_ascii_case(unit) => s[..cut].trim(),
        _ => s,
    }
}

/// Mean of a wave range. "0.8m - 0.7m" → 0.75
/// Bounds may come in either order; anything other than exactly two
/// numeric tokens yields `None`.
pub fn parse_wave_range(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(['-', '–']).collect();
    if parts.len() != 2 {
        return None;
    }
    let a = parse_number(strip_unit(parts[0], "m"))?;
    let b = parse_number(strip_unit(parts[1], "m"))?;
    Some((a + b) / 2.0)
}

/// "24 km/h" → 24.0 | "3km/h" → 3.0
pub fn parse_wind_speed(s: &str) -> Option<f64> {
    parse_number(strip_unit(s, "km/h"))
}

/// "06:00", "6h", "06h30" → time of day.
pub fn parse_hour(s: &str) -> Option<NaiveTime> {
    let s = s.trim().to_lowercase();
    let (h, m) = match s.split_once([':', 'h']) {
        Some((h, m)) => (h, m.split(':').next().unwrap_or("")),
        None => return None,
    };
    let hour: u32 = h.trim().parse().ok()?;
    let minute: u32 = if m.trim().is_empty() { 0 } else { m.trim().parse().ok()? };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

// ── RawSlot → NormalizedSlot ──────────────────────────────────────────────────

/// Everything the normalizer needs besides the row itself.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    /// The scrape's "today".
    pub reference: NaiveDate,
    pub days: DayLabelTable,
}

impl NormalizeContext {
    pub fn new(reference: NaiveDate, days: DayLabelTable) -> Self {
        Self { reference, days }
    }
}

pub fn normalize_slot(raw: &RawSlot, ctx: &NormalizeContext) -> NormalizedSlot {
    let date = ctx.days.resolve(&raw.day_label, ctx.reference);
    let time = parse_hour(&raw.hour_label);

    NormalizedSlot {
        day_label: raw.day_label.clone(),
        hour_label: raw.hour_label.clone(),
        wave_size_mean: parse_wave_range(&raw.wave_range_raw),
        wind_speed_value: parse_wind_speed(&raw.wind_speed_raw),
        wind_direction_raw: raw.wind_direction_raw.clone(),
        timestamp: date.zip(time).map(|(d, t)| d.and_time(t)),
    }
}

/// Order-preserving normalization of a whole scrape.
///
/// Rows arrive in chronological order, so each new day label must land on a
/// later date than the previous one. Weekday-only labels are ambiguous past
/// seven days; they are pushed forward by whole weeks when needed. Any other
/// label that would not move forward (usually a snapshot re-read against the
/// wrong reference date) gets no timestamp.
pub fn normalize_slots(raws: &[RawSlot], ctx: &NormalizeContext) -> Vec<NormalizedSlot> {
    let mut out = Vec::with_capacity(raws.len());
    let mut previous: Option<(&str, NaiveDate)> = None;
    let mut carry_weeks = 0u64;

    for raw in raws {
        let mut slot = normalize_slot(raw, ctx);

        if let Some(ts) = slot.timestamp {
            let mut date = ts.date();
            let prev_date = previous
                .filter(|(label, _)| *label != raw.day_label)
                .map(|(_, prev)| prev);

            if matches!(ctx.days.classify(&raw.day_label), Some(DayRef::Weekday(_))) {
                date = date + Days::new(7 * carry_weeks);
                if let Some(prev) = prev_date {
                    while date <= prev {
                        carry_weeks += 1;
                        date = date + Days::new(7);
                    }
                }
            }

            match prev_date {
                Some(prev) if date <= prev => {
                    warn!(
                        "Day {:?} resolves to {}, not after {} (reference date {}); leaving it undated",
                        raw.day_label, date, prev, ctx.reference
                    );
                    slot.timestamp = None;
                }
                _ => {
                    slot.timestamp = Some(date.and_time(ts.time()));
                    previous = Some((raw.day_label.as_str(), date));
                }
            }
        }

        log_missing_fields(raw, &slot);
        out.push(slot);
    }

    out
}

fn log_missing_fields(raw: &RawSlot, slot: &NormalizedSlot) {
    if slot.wave_size_mean.is_none() {
        warn!("Unparseable wave range {:?} ({} {})", raw.wave_range_raw, raw.day_label, raw.hour_label);
    }
    if slot.wind_speed_value.is_none() {
        warn!("Unparseable wind speed {:?} ({} {})", raw.wind_speed_raw, raw.day_label, raw.hour_label);
    }
    if slot.timestamp.is_none() {
        debug!("No timestamp for day {:?} hour {:?}", raw.day_label, raw.hour_label);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ctx(y: i32, m: u32, d: u32) -> NormalizeContext {
        NormalizeContext::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), DayLabelTable::french())
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_wave_range_either_order() {
        assert_eq!(parse_wave_range("0.8m - 0.7m"), Some(0.75));
        assert_eq!(parse_wave_range("0.7m - 0.8m"), Some(0.75));
        assert_eq!(parse_wave_range("2.5m - 3.0m"), Some(2.75));
        assert_eq!(parse_wave_range("1,25 m – 1,75 m"), Some(1.5));
    }

    #[test]
    fn test_parse_wave_range_rejects_malformed() {
        assert_eq!(parse_wave_range("1.2m"), None);
        assert_eq!(parse_wave_range("1m - 2m - 3m"), None);
        assert_eq!(parse_wave_range("m - 2m"), None);
        assert_eq!(parse_wave_range(""), None);
    }

    #[test]
    fn test_parse_wind_speed() {
        assert_eq!(parse_wind_speed("24 km/h"), Some(24.0));
        assert_eq!(parse_wind_speed("3km/h"), Some(3.0));
        assert_eq!(parse_wind_speed("12.5 KM/H"), Some(12.5));
        assert_eq!(parse_wind_speed("N/A"), None);
        assert_eq!(parse_wind_speed("calme"), None);
    }

    #[test]
    fn test_parse_hour() {
        assert_eq!(parse_hour("06:00"), NaiveTime::from_hms_opt(6, 0, 0));
        assert_eq!(parse_hour("21h"), NaiveTime::from_hms_opt(21, 0, 0));
        assert_eq!(parse_hour("06h30"), NaiveTime::from_hms_opt(6, 30, 0));
        assert_eq!(parse_hour("25:00"), None);
        assert_eq!(parse_hour("midi"), None);
    }

    #[test]
    fn test_normalize_slot_example_row() {
        let raw = RawSlot::new("Lundi 10 Juin", "09:00", "0.8m - 0.7m", "24 km/h", "Nord Ouest");
        let slot = normalize_slot(&raw, &ctx(2024, 6, 10));
        assert_eq!(slot.wave_size_mean, Some(0.75));
        assert_eq!(slot.wind_speed_value, Some(24.0));
        assert_eq!(slot.wind_direction_raw, "Nord Ouest");
        assert_eq!(slot.timestamp, Some(at(2024, 6, 10, 9)));
    }

    #[test]
    fn test_missing_wind_is_none_not_zero() {
        let raw = RawSlot::new("Demain", "12:00", "1m - 1.5m", "N/A", "Sud");
        let slot = normalize_slot(&raw, &ctx(2024, 6, 10));
        assert_eq!(slot.wind_speed_value, None);
        assert_eq!(slot.wave_size_mean, Some(1.25));
        assert_eq!(slot.timestamp, Some(at(2024, 6, 11, 12)));
    }

    #[test]
    fn test_unknown_day_label_leaves_timestamp_undefined() {
        let raw = RawSlot::new("???", "12:00", "1m - 1m", "5 km/h", "Nord");
        assert_eq!(normalize_slot(&raw, &ctx(2024, 6, 10)).timestamp, None);
    }

    #[test]
    fn test_normalize_slots_keeps_every_row_in_order() {
        let raws = vec![
            RawSlot::new("Aujourd'hui", "06:00", "bad", "10 km/h", "Nord"),
            RawSlot::new("Aujourd'hui", "09:00", "1m - 1m", "bad", "Nord"),
            RawSlot::new("Demain", "06:00", "1m - 2m", "5 km/h", "Sud"),
        ];
        let slots = normalize_slots(&raws, &ctx(2024, 6, 10));
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].hour_label, "06:00");
        assert_eq!(slots[1].wind_speed_value, None);
        assert_eq!(slots[2].timestamp, Some(at(2024, 6, 11, 6)));
    }

    #[test]
    fn test_weekday_labels_strictly_increase_past_a_week() {
        // Reference is a Wednesday; the page runs Wednesday → next Wednesday.
        let labels = ["Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche", "Lundi", "Mardi", "Mercredi"];
        let raws: Vec<RawSlot> = labels
            .iter()
            .map(|d| RawSlot::new(*d, "09:00", "1m - 1m", "5 km/h", "Nord"))
            .collect();
        let slots = normalize_slots(&raws, &ctx(2024, 6, 12));
        let dates: Vec<_> = slots.iter().map(|s| s.timestamp.unwrap().date()).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(dates[7], NaiveDate::from_ymd_opt(2024, 6, 19).unwrap());
    }

    #[test]
    fn test_label_that_does_not_move_forward_is_undated() {
        // Snapshot scraped on the 10th, re-read with the 11th as "today":
        // "Demain" and "Mercredi 12 Juin" would collide.
        let raws: Vec<RawSlot> = ["Aujourd'hui", "Demain", "Mercredi 12 Juin", "Mercredi 12 Juin", "Jeudi 13 Juin"]
            .iter()
            .map(|d| RawSlot::new(*d, "09:00", "1m - 1m", "5 km/h", "Nord"))
            .collect();
        let slots = normalize_slots(&raws, &ctx(2024, 6, 11));
        let stamps: Vec<_> = slots.iter().map(|s| s.timestamp).collect();
        assert_eq!(
            stamps,
            vec![Some(at(2024, 6, 11, 9)), Some(at(2024, 6, 12, 9)), None, None, Some(at(2024, 6, 13, 9))]
        );
        let dated: Vec<_> = stamps.iter().flatten().collect();
        assert!(dated.windows(2).all(|w| w[0] < w[1]));
        // The row itself is kept.
        assert_eq!(slots[2].wave_size_mean, Some(1.0));
    }

    #[test]
    fn test_repeated_label_keeps_its_date() {
        let raws = vec![
            RawSlot::new("Demain", "06:00", "1m - 1m", "5 km/h", "Nord"),
            RawSlot::new("Demain", "18:00", "1m - 1m", "5 km/h", "Nord"),
        ];
        let slots = normalize_slots(&raws, &ctx(2024, 6, 10));
        assert_eq!(slots[0].timestamp, Some(at(2024, 6, 11, 6)));
        assert_eq!(slots[1].timestamp, Some(at(2024, 6, 11, 18)));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raws = vec![
            RawSlot::new("Samedi 15 Juin", "06:00", "0.5m - 0.9m", "12 km/h", "Ouest"),
            RawSlot::new("Dimanche 16 Juin", "06:00", "1.5m - 1.9m", "30 km/h", "Nord"),
        ];
        let c = ctx(2024, 6, 14);
        assert_eq!(normalize_slots(&raws, &c), normalize_slots(&raws, &c));
    }
}
