use crate::config::ScraperConfig;
use crate::error::FetchError;
use rand::Rng;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;
use tokio::time::sleep;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};
use url::Url;

/// Fetcher: one forecast page, as text.
///
/// Single attempt unless `max_retries` asks for more; only transient
/// failures (timeouts, transport errors, 429/5xx) are retried.
pub struct HttpClient {
    inner: reqwest::Client,
    config: ScraperConfig,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(&config.accept_language) {
            Ok(lang) => {
                headers.insert(ACCEPT_LANGUAGE, lang);
            }
            Err(e) => warn!(
                "Ignoring accept_language {:?}, not a valid header value: {}",
                config.accept_language, e
            ),
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let inner = builder.build().map_err(FetchError::Client)?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let url = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        self.polite_delay().await;

        if self.config.max_retries == 0 {
            return self.attempt(&url).await;
        }

        let base_ms = self.config.request_delay_ms.max(250);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(base_ms / 2)
            .map(jitter)
            .take(self.config.max_retries as usize);

        let url = &url;
        Retry::spawn(strategy, || async move {
            match self.attempt(url).await {
                Err(e) if e.is_transient() => {
                    warn!("{}, retrying", e);
                    Err(e)
                }
                other => Ok(other),
            }
        })
        .await
        .and_then(|result| result)
    }

    async fn attempt(&self, url: &Url) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let resp = self.inner.get(url.clone()).send().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Transport { url: url.to_string(), source }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status });
        }

        resp.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }

    /// Sleep for the configured delay + random jitter.
    async fn polite_delay(&self) {
        if self.config.request_delay_ms == 0 && self.config.jitter_ms == 0 {
            return;
        }
        let jitter = rand::thread_rng().gen_range(0..=self.config.jitter_ms);
        sleep(Duration::from_millis(self.config.request_delay_ms + jitter)).await;
    }
}
