use crate::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub scoring: ScoringRules,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause before the request; 0 disables it.
    #[serde(default)]
    pub request_delay_ms: u64,

    #[serde(default)]
    pub jitter_ms: u64,

    /// Extra attempts after the first one. 0 = single attempt.
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Honour HTTP(S)_PROXY from the environment.
    #[serde(default = "default_true")]
    pub use_system_proxy: bool,
}

/// Table extractor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractConfig {
    /// Keep only the first N distinct day labels.
    #[serde(default = "default_max_days")]
    pub max_days: usize,

    /// Hours kept when reading the embedded forecast dump.
    #[serde(default = "default_target_hours")]
    pub target_hours: Vec<String>,
}

/// One scoring band: values `<= max` earn `points`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct Band {
    pub max: f64,
    pub points: u8,
}

/// Quality scoring heuristic. Bands are checked in order, first match wins.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoringRules {
    #[serde(default = "default_north_keyword")]
    pub north_keyword: String,

    #[serde(default = "default_direction_points")]
    pub direction_points: u8,

    #[serde(default = "default_wave_bands")]
    pub wave_bands: Vec<Band>,

    #[serde(default = "default_wind_bands")]
    pub wind_bands: Vec<Band>,
}

/// Day-label vocabulary of the source site.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LocaleConfig {
    #[serde(default = "default_today")]
    pub today: Vec<String>,

    #[serde(default = "default_tomorrow")]
    pub tomorrow: Vec<String>,

    #[serde(default = "default_day_after_tomorrow")]
    pub day_after_tomorrow: Vec<String>,

    /// Monday first.
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<String>,

    /// January first.
    #[serde(default = "default_months")]
    pub months: Vec<String>,
}

/// Output locations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub csv_path: Option<PathBuf>,

    #[serde(default)]
    pub json_path: Option<PathBuf>,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_url() -> String {
    "https://www.surf-report.com/meteo-surf/lacanau-s1043.html".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; surf-report/0.1; +https://www.surf-report.com/)".to_string()
}
fn default_accept_language() -> String {
    "fr-FR,fr;q=0.9,en;q=0.7".to_string()
}
fn default_true() -> bool {
    true
}
fn default_max_days() -> usize {
    7
}
fn default_target_hours() -> Vec<String> {
    ["06:00", "09:00", "12:00", "15:00", "18:00", "21:00"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_north_keyword() -> String {
    "Nord".to_string()
}
fn default_direction_points() -> u8 {
    3
}
fn default_wave_bands() -> Vec<Band> {
    vec![
        Band { max: 1.0, points: 3 },
        Band { max: 1.5, points: 2 },
        Band { max: 2.0, points: 1 },
    ]
}
fn default_wind_bands() -> Vec<Band> {
    vec![
        Band { max: 10.0, points: 3 },
        Band { max: 25.0, points: 2 },
        Band { max: 50.0, points: 1 },
    ]
}
fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
fn default_today() -> Vec<String> {
    strings(&["Aujourd'hui", "Aujourd’hui"])
}
fn default_tomorrow() -> Vec<String> {
    strings(&["Demain"])
}
fn default_day_after_tomorrow() -> Vec<String> {
    strings(&["Après-demain", "Apres-demain"])
}
fn default_weekdays() -> Vec<String> {
    strings(&["Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche"])
}
fn default_months() -> Vec<String> {
    strings(&[
        "Janvier", "Février", "Mars", "Avril", "Mai", "Juin",
        "Juillet", "Août", "Septembre", "Octobre", "Novembre", "Décembre",
    ])
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: 0,
            jitter_ms: 0,
            max_retries: 0,
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            use_system_proxy: true,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_days: default_max_days(),
            target_hours: default_target_hours(),
        }
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            north_keyword: default_north_keyword(),
            direction_points: default_direction_points(),
            wave_bands: default_wave_bands(),
            wind_bands: default_wind_bands(),
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            today: default_today(),
            tomorrow: default_tomorrow(),
            day_after_tomorrow: default_day_after_tomorrow(),
            weekdays: default_weekdays(),
            months: default_months(),
        }
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

/// Scores are reported on a 0–9 scale.
pub const MAX_QUALITY: u8 = 9;

impl ScoringRules {
    /// Best achievable total under these rules.
    pub fn max_total(&self) -> u32 {
        let best = |bands: &[Band]| bands.iter().map(|b| b.points as u32).max().unwrap_or(0);
        self.direction_points as u32 + best(&self.wave_bands) + best(&self.wind_bands)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.north_keyword.trim().is_empty() {
            return Err(ConfigError::InvalidRules("north_keyword is empty".into()));
        }
        for (name, bands) in [("wave_bands", &self.wave_bands), ("wind_bands", &self.wind_bands)] {
            for pair in bands.windows(2) {
                if pair[1].max <= pair[0].max {
                    return Err(ConfigError::InvalidRules(format!(
                        "{}: thresholds must be strictly ascending ({} then {})",
                        name, pair[0].max, pair[1].max
                    )));
                }
                if pair[1].points > pair[0].points {
                    return Err(ConfigError::InvalidRules(format!(
                        "{}: points must not increase with the threshold ({} then {})",
                        name, pair[0].points, pair[1].points
                    )));
                }
            }
        }
        if self.max_total() > MAX_QUALITY as u32 {
            return Err(ConfigError::InvalidRules(format!(
                "best total {} exceeds {}",
                self.max_total(),
                MAX_QUALITY
            )));
        }
        Ok(())
    }
}

impl LocaleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weekdays.len() != 7 {
            return Err(ConfigError::InvalidLocale(format!(
                "expected 7 weekday names, got {}",
                self.weekdays.len()
            )));
        }
        if self.months.len() != 12 {
            return Err(ConfigError::InvalidLocale(format!(
                "expected 12 month names, got {}",
                self.months.len()
            )));
        }
        Ok(())
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("SURF").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Ignoring unreadable configuration ({}), using defaults", e);
            AppConfig::default()
        });
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.locale.validate()
    }
}
