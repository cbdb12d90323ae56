use crate::models::{Report, ScoredSlot};
use std::time::Instant;
use tracing::info;

/// Logs how long a command took when dropped.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("⏱  Finished: {} (took {:.2?})", self.label, self.start.elapsed());
    }
}

/// "0.75 m" or "—".
pub fn fmt_metres(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2} m", v)).unwrap_or_else(|| "—".into())
}

pub fn fmt_speed(v: Option<f64>) -> String {
    v.map(|v| format!("{} km/h", v)).unwrap_or_else(|| "—".into())
}

/// Text gauge: `[██████░░░░]  66.7%`
pub fn gauge_bar(pct: f64, width: usize) -> String {
    let pct = pct.clamp(0.0, 100.0);
    let filled = ((pct / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:5.1}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        pct
    )
}

pub fn fmt_slot(slot: &ScoredSlot) -> String {
    let when = slot
        .slot
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| format!("{} {}", slot.slot.day_label, slot.slot.hour_label));
    format!(
        "{}  waves {}  wind {} {}",
        when,
        fmt_metres(slot.slot.wave_size_mean),
        fmt_speed(slot.slot.wind_speed_value),
        slot.slot.wind_direction_raw
    )
}

pub fn print_report(title: &str, report: &Report) {
    println!("─────────────────────────────────");
    println!("  {}", title);
    println!("─────────────────────────────────");
    println!("  Best slot : {}", fmt_slot(&report.best_slot));
    println!(
        "  Quality   : {}/9",
        report.best_slot.quality.map(|q| q.to_string()).unwrap_or_else(|| "—".into())
    );
    println!("  Gauge     : {}", gauge_bar(report.quality_gauge, 20));
    println!("  Max wave  : {}", fmt_metres(report.max_wave));
    println!("─────────────────────────────────");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_bar() {
        assert_eq!(gauge_bar(0.0, 4), "[░░░░]   0.0%");
        assert_eq!(gauge_bar(100.0, 4), "[████] 100.0%");
        assert_eq!(gauge_bar(50.0, 4), "[██░░]  50.0%");
        assert_eq!(gauge_bar(140.0, 2), "[██] 100.0%");
    }

    #[test]
    fn test_missing_values_render_as_dash() {
        assert_eq!(fmt_metres(None), "—");
        assert_eq!(fmt_metres(Some(0.75)), "0.75 m");
        assert_eq!(fmt_speed(Some(24.0)), "24 km/h");
        assert_eq!(fmt_speed(None), "—");
    }
}
