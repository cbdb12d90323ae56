//! Report selector: headline KPIs over one scrape.

use crate::config::MAX_QUALITY;
use crate::error::NoScorableSlotsError;
use crate::models::{Report, ScoredSlot, SlotFilter};
use chrono::NaiveDateTime;

pub fn quality_gauge(quality: u8) -> f64 {
    100.0 * quality as f64 / MAX_QUALITY as f64
}

/// Highest wave mean over every slot that has one, scorable or not.
pub fn max_wave(slots: &[ScoredSlot]) -> Option<f64> {
    slots
        .iter()
        .filter_map(|s| s.slot.wave_size_mean)
        .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |m| m.max(w))))
}

/// Best slot among scorable ones admitted by `filter`.
///
/// Ties go to the earliest timestamp; slots without a timestamp lose ties to
/// slots with one, and otherwise the first in sequence order wins.
pub fn best_slot(slots: &[ScoredSlot], filter: SlotFilter) -> Option<(usize, &ScoredSlot)> {
    let mut best: Option<(usize, &ScoredSlot, u8)> = None;

    for (i, slot) in slots.iter().enumerate() {
        let Some(q) = slot.quality else { continue };
        if filter == SlotFilter::NorthOnly && !slot.faces_north() {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, current, best_q)) => {
                q > best_q || (q == best_q && earlier(slot.slot.timestamp, current.slot.timestamp))
            }
        };
        if better {
            best = Some((i, slot, q));
        }
    }

    best.map(|(i, slot, _)| (i, slot))
}

fn earlier(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        _ => false,
    }
}

pub fn build_report(slots: &[ScoredSlot], filter: SlotFilter) -> Result<Report, NoScorableSlotsError> {
    let (best_index, best) = best_slot(slots, filter).ok_or(NoScorableSlotsError { filter })?;
    let quality = best.quality.ok_or(NoScorableSlotsError { filter })?;

    Ok(Report {
        filter,
        best_index,
        best_slot: best.clone(),
        quality_gauge: quality_gauge(quality),
        max_wave: max_wave(slots),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NormalizedSlot, ScoreBreakdown};
    use chrono::NaiveDate;

    fn ts(h: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(h, 0, 0)
    }

    fn scored(hour: u32, wave: Option<f64>, direction: u8, quality: Option<u8>) -> ScoredSlot {
        ScoredSlot {
            slot: NormalizedSlot {
                day_label: "Lundi 10 Juin".into(),
                hour_label: format!("{:02}:00", hour),
                wave_size_mean: wave,
                wind_speed_value: quality.map(|_| 5.0),
                wind_direction_raw: if direction > 0 { "Nord".into() } else { "Sud".into() },
                timestamp: ts(hour),
            },
            breakdown: ScoreBreakdown { direction, wave: None, wind: None },
            quality,
        }
    }

    #[test]
    fn test_tie_goes_to_earliest_timestamp() {
        // Later slot listed first; the timestamp decides, not position.
        let slots = vec![scored(15, Some(0.5), 3, Some(9)), scored(9, Some(0.5), 3, Some(9))];
        let report = build_report(&slots, SlotFilter::Any).unwrap();
        assert_eq!(report.best_index, 1);
        assert_eq!(report.best_slot.slot.timestamp, ts(9));
    }

    #[test]
    fn test_tie_without_timestamps_keeps_first() {
        let mut a = scored(6, Some(1.0), 0, Some(5));
        let mut b = scored(9, Some(1.0), 0, Some(5));
        a.slot.timestamp = None;
        b.slot.timestamp = None;
        assert_eq!(best_slot(&[a, b], SlotFilter::Any).unwrap().0, 0);
    }

    #[test]
    fn test_gauge_is_scaled_quality() {
        let slots = vec![scored(6, Some(1.0), 0, Some(4)), scored(9, Some(1.0), 3, Some(6))];
        let report = build_report(&slots, SlotFilter::Any).unwrap();
        assert_eq!(report.best_slot.quality, Some(6));
        assert_eq!(report.quality_gauge, 100.0 * 6.0 / 9.0);
        assert_eq!(quality_gauge(9), 100.0);
        assert_eq!(quality_gauge(0), 0.0);
    }

    #[test]
    fn test_max_wave_counts_unscorable_slots() {
        let slots = vec![scored(6, Some(1.0), 0, Some(4)), scored(9, Some(3.5), 0, None), scored(12, None, 0, Some(2))];
        let report = build_report(&slots, SlotFilter::Any).unwrap();
        assert_eq!(report.max_wave, Some(3.5));
        assert_eq!(report.best_index, 0);
    }

    #[test]
    fn test_max_wave_undefined_without_waves() {
        assert_eq!(max_wave(&[scored(6, None, 0, None)]), None);
        assert_eq!(max_wave(&[]), None);
    }

    #[test]
    fn test_no_scorable_slots() {
        let slots = vec![scored(6, Some(1.0), 3, None)];
        let err = build_report(&slots, SlotFilter::Any).unwrap_err();
        assert_eq!(err.filter, SlotFilter::Any);
        assert!(build_report(&[], SlotFilter::Any).is_err());
    }

    #[test]
    fn test_north_only_is_independent() {
        let slots = vec![scored(6, Some(0.5), 0, Some(6)), scored(9, Some(1.8), 3, Some(5))];
        let any = build_report(&slots, SlotFilter::Any).unwrap();
        let north = build_report(&slots, SlotFilter::NorthOnly).unwrap();
        assert_eq!(any.best_index, 0);
        assert_eq!(north.best_index, 1);

        let southerly = vec![scored(6, Some(0.5), 0, Some(6))];
        assert!(build_report(&southerly, SlotFilter::Any).is_ok());
        assert_eq!(
            build_report(&southerly, SlotFilter::NorthOnly).unwrap_err(),
            NoScorableSlotsError { filter: SlotFilter::NorthOnly }
        );
    }
}
