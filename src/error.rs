//! Error taxonomy for the forecast pipeline.
//!
//! Fetch and extraction failures make the whole run meaningless and halt it.
//! Row- and field-level problems are not errors: rows are skipped and fields
//! become `None`.

use chrono::NaiveDateTime;

use crate::models::SlotFilter;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid forecast URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Transport failures and 429/5xx answers are worth another attempt when
    /// the caller asked for retries; everything else fails immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => {
                status.as_u16() == 429 || status.is_server_error()
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("no forecast table found in document from {url} (fetched {fetched_at})")]
pub struct ExtractionError {
    pub url: String,
    pub fetched_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no scorable slots ({filter})")]
pub struct NoScorableSlotsError {
    pub filter: SlotFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid scoring rules: {0}")]
    InvalidRules(String),

    #[error("invalid locale table: {0}")]
    InvalidLocale(String),
}
