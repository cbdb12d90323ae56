pub mod calendar;
pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::models::{DocumentInfo, FetchedPage};
use async_trait::async_trait;
use chrono::Local;
use tracing::info;

use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable forecast source.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

// ── surf-report.com ───────────────────────────────────────────────────────────

pub struct SurfReportScraper {
    client: HttpClient,
}

impl SurfReportScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl ForecastSource for SurfReportScraper {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        info!("Fetching forecast page {}", url);
        let html = self.client.get_text(url).await?;
        let fetched_at = Local::now().naive_local();

        info!("Fetched {} bytes", html.len());
        Ok(FetchedPage {
            info: DocumentInfo {
                url: url.to_string(),
                fetched_at,
            },
            html,
        })
    }
}
