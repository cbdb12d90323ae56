//! Surf forecast scraper and quality report.
//!
//! Fetches a surf-report.com forecast page, extracts the forecast rows,
//! normalizes them, scores each slot 0–9 and picks the headline KPIs.

pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod scraper;
pub mod storage;
pub mod utils;
