//! Day-label resolution.
//!
//! The source prints day headers in French: either relative words
//! ("Aujourd'hui", "Demain") or weekday labels with an optional date
//! ("Samedi", "Samedi 22 Octobre"). [`DayLabelTable`] maps such a label to a
//! calendar date relative to a reference "today". The vocabulary comes from
//! [`LocaleConfig`], so another locale only needs another table.

use crate::config::LocaleConfig;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::debug;

/// Explicit dates further than this before the reference belong to next year.
const YEAR_ROLLOVER_DAYS: i64 = 183;

/// What a day label says, before it is anchored to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayRef {
    /// Days after the reference date ("Demain" → 1).
    Relative(u64),
    Weekday(Weekday),
    Date {
        weekday: Option<Weekday>,
        day: u32,
        month: u32,
    },
}

#[derive(Debug, Clone)]
pub struct DayLabelTable {
    /// Phrase words (hyphens split), longest phrase first.
    relative: Vec<(Vec<String>, u64)>,
    weekdays: Vec<String>,
    months: Vec<String>,
}

impl DayLabelTable {
    pub fn from_config(cfg: &LocaleConfig) -> Self {
        let mut relative = Vec::new();
        for (words, offset) in [(&cfg.today, 0), (&cfg.tomorrow, 1), (&cfg.day_after_tomorrow, 2)] {
            relative.extend(words.iter().map(|w| (phrase_words(w), offset)));
        }
        relative.retain(|(words, _)| !words.is_empty());
        relative.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self {
            relative,
            weekdays: cfg.weekdays.iter().map(|w| fold(w)).collect(),
            months: cfg.months.iter().map(|m| fold(m)).collect(),
        }
    }

    pub fn french() -> Self {
        Self::from_config(&LocaleConfig::default())
    }

    /// Classify a label without anchoring it. `None` if nothing in it is known.
    pub fn classify(&self, label: &str) -> Option<DayRef> {
        let folded = fold(label);
        let tokens: Vec<&str> = folded.split_whitespace().collect();
        let first = *tokens.first()?;

        let label_words = phrase_words(label);
        let relative = self.relative.iter().find(|(words, _)| label_words.starts_with(words));
        if let Some((_, offset)) = relative {
            return Some(DayRef::Relative(*offset));
        }

        let weekday = self.weekday_index(first).and_then(weekday_from_monday);
        let rest = if weekday.is_some() { &tokens[1..] } else { &tokens[..] };

        let day = rest
            .iter()
            .find_map(|t| t.trim_end_matches(['.', ',']).parse::<u32>().ok())
            .filter(|d| (1..=31).contains(d));
        let month = rest.iter().find_map(|t| self.month_index(t)).map(|i| i as u32 + 1);

        match (weekday, day, month) {
            (weekday, Some(day), Some(month)) => Some(DayRef::Date { weekday, day, month }),
            (Some(w), _, _) => Some(DayRef::Weekday(w)),
            _ => None,
        }
    }

    /// Anchor a label to `reference`. Weekday-only labels resolve to the next
    /// occurrence on or after the reference date.
    pub fn resolve(&self, label: &str, reference: NaiveDate) -> Option<NaiveDate> {
        match self.classify(label)? {
            DayRef::Relative(offset) => reference.checked_add_days(Days::new(offset)),
            DayRef::Weekday(w) => {
                let ahead = (7 + w.num_days_from_monday() as i64
                    - reference.weekday().num_days_from_monday() as i64)
                    % 7;
                reference.checked_add_days(Days::new(ahead as u64))
            }
            DayRef::Date { weekday, day, month } => {
                let date = explicit_date(reference, month, day)?;
                if let Some(w) = weekday {
                    if date.weekday() != w {
                        debug!("Day label {:?} names {:?} but {} is a {:?}", label, w, date, date.weekday());
                    }
                }
                Some(date)
            }
        }
    }

    fn weekday_index(&self, token: &str) -> Option<usize> {
        let token = token.trim_end_matches(['.', ',']);
        self.weekdays.iter().position(|w| w == token)
    }

    fn month_index(&self, token: &str) -> Option<usize> {
        let token = token.trim_end_matches(['.', ',']);
        self.months.iter().position(|m| m == token)
    }
}

impl Default for DayLabelTable {
    fn default() -> Self {
        Self::french()
    }
}

fn weekday_from_monday(idx: usize) -> Option<Weekday> {
    use Weekday::*;
    [Mon, Tue, Wed, Thu, Fri, Sat, Sun].get(idx).copied()
}

/// Day/month in the reference year, or the following year when that date
/// would lie well in the past (forecast pages only look ahead).
fn explicit_date(reference: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(reference.year(), month, day);
    match this_year {
        Some(d) if (reference - d).num_days() <= YEAR_ROLLOVER_DAYS => Some(d),
        _ => NaiveDate::from_ymd_opt(reference.year() + 1, month, day),
    }
}

/// "Après-demain" and "apres demain" both → ["apres", "demain"].
fn phrase_words(s: &str) -> Vec<String> {
    fold(s)
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Lowercase and strip French diacritics so "Août", "AOUT" and "aout" match.
pub fn fold(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            '’' | '`' => '\'',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_relative_words() {
        let table = DayLabelTable::french();
        let today = d(2024, 6, 10);
        assert_eq!(table.resolve("Aujourd'hui", today), Some(today));
        assert_eq!(table.resolve("aujourd’hui", today), Some(today));
        assert_eq!(table.resolve("Demain", today), Some(d(2024, 6, 11)));
        assert_eq!(table.resolve("Après-demain", today), Some(d(2024, 6, 12)));
    }

    #[test]
    fn test_multi_word_relative_phrases() {
        let table = DayLabelTable::french();
        let today = d(2024, 6, 10);
        assert_eq!(table.resolve("Après demain", today), Some(d(2024, 6, 12)));
        assert_eq!(table.resolve("APRES - DEMAIN", today), Some(d(2024, 6, 12)));
        assert_eq!(table.resolve("Demain 11 Juin", today), Some(d(2024, 6, 11)));
        assert_eq!(table.classify("après demain"), Some(DayRef::Relative(2)));
    }

    #[test]
    fn test_weekday_only_label_looks_ahead() {
        let table = DayLabelTable::french();
        // 2024-06-10 is a Monday
        let monday = d(2024, 6, 10);
        assert_eq!(table.resolve("Lundi", monday), Some(monday));
        assert_eq!(table.resolve("Mercredi", monday), Some(d(2024, 6, 12)));
        assert_eq!(table.resolve("Dimanche", monday), Some(d(2024, 6, 16)));
    }

    #[test]
    fn test_explicit_date_label() {
        let table = DayLabelTable::french();
        assert_eq!(table.resolve("Lundi 10 Juin", d(2024, 6, 8)), Some(d(2024, 6, 10)));
        assert_eq!(table.resolve("samedi 17 août", d(2024, 8, 15)), Some(d(2024, 8, 17)));
        assert_eq!(table.resolve("Samedi 17 Aout", d(2024, 8, 15)), Some(d(2024, 8, 17)));
    }

    #[test]
    fn test_explicit_date_rolls_into_next_year() {
        let table = DayLabelTable::french();
        assert_eq!(table.resolve("Jeudi 2 Janvier", d(2024, 12, 30)), Some(d(2025, 1, 2)));
    }

    #[test]
    fn test_unknown_labels() {
        let table = DayLabelTable::french();
        let today = d(2024, 6, 10);
        assert_eq!(table.resolve("", today), None);
        assert_eq!(table.resolve("Monday", today), None);
        assert_eq!(table.resolve("10 Foo", today), None);
    }

    #[test]
    fn test_classify() {
        let table = DayLabelTable::french();
        assert_eq!(table.classify("Demain"), Some(DayRef::Relative(1)));
        assert_eq!(table.classify("Mardi"), Some(DayRef::Weekday(Weekday::Tue)));
        assert_eq!(
            table.classify("Mardi 11 Juin"),
            Some(DayRef::Date { weekday: Some(Weekday::Tue), day: 11, month: 6 })
        );
        assert_eq!(
            table.classify("11 juin"),
            Some(DayRef::Date { weekday: None, day: 11, month: 6 })
        );
    }

    #[test]
    fn test_custom_locale_table() {
        let cfg = LocaleConfig {
            today: vec!["Today".into()],
            tomorrow: vec!["Tomorrow".into()],
            day_after_tomorrow: vec![],
            weekdays: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            months: LocaleConfig::default().months,
        };
        let table = DayLabelTable::from_config(&cfg);
        let today = d(2024, 6, 10);
        assert_eq!(table.resolve("Tomorrow", today), Some(d(2024, 6, 11)));
        assert_eq!(table.resolve("Friday", today), Some(d(2024, 6, 14)));
    }
}
