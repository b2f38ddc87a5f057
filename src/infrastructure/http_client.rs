//! HTTP fetcher backed by reqwest
//!
//! This is the production [`DocumentFetcher`]. Transient failures (network
//! errors, 5xx, 429) are retried with exponential backoff here, in the fetch
//! layer; the extraction core above it never retries.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::config::HttpConfig;
use super::fetcher::{DocumentFetcher, Page};
use super::parsing_error::{ScrapeError, ScrapeResult};

/// HTTP client with timeout, cookie store and retry policy
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    config: HttpConfig,
}

enum Attempt {
    Done(ScrapeResult<Page>),
    Retry(ScrapeError),
}

impl HttpFetcher {
    /// Create a new fetcher with custom configuration
    pub fn with_config(config: HttpConfig) -> ScrapeResult<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ScrapeError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    pub fn new() -> ScrapeResult<Self> {
        Self::with_config(HttpConfig::default())
    }

    fn is_retryable(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::REQUEST_TIMEOUT
                | StatusCode::TOO_MANY_REQUESTS
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
                | StatusCode::INTERNAL_SERVER_ERROR
        )
    }

    async fn read(url: &str, response: reqwest::Response) -> Attempt {
        let status = response.status();
        if status.is_success() {
            return match response.text().await {
                Ok(body) => Attempt::Done(Ok(Page::new(url, body))),
                Err(e) => Attempt::Retry(ScrapeError::Network {
                    message: format!("Failed to read response body: {e}"),
                }),
            };
        }

        if matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE) {
            return Attempt::Done(Err(ScrapeError::page_not_found(url)));
        }

        error!("❌ HTTP error {}: {}", status, url);
        let err = ScrapeError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        };
        if Self::is_retryable(status) {
            Attempt::Retry(err)
        } else {
            Attempt::Done(Err(err))
        }
    }

    async fn with_retries<F, Fut>(&self, url: &str, send: F) -> ScrapeResult<Page>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: std::future::Future<Output = reqwest::Result<reqwest::Response>> + Send,
    {
        let attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            info!("🌐 HTTP (attempt {}/{}) : {}", attempt, attempts, url);
            let outcome = match send().await {
                Ok(response) => Self::read(url, response).await,
                Err(e) => Attempt::Retry(ScrapeError::Network {
                    message: format!("HTTP request failed: {e}"),
                }),
            };

            match outcome {
                Attempt::Done(result) => return result,
                Attempt::Retry(err) => {
                    warn!("⚠️ Attempt {} failed for {}: {}", attempt, url, err);
                    last_error = Some(err);
                    if attempt < attempts {
                        let delay_seconds = 2_u64.pow(attempt - 1);
                        debug!("Backing off {}s before retrying {}", delay_seconds, url);
                        sleep(Duration::from_secs(delay_seconds)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ScrapeError::Network {
            message: format!("Unknown error while fetching {url}"),
        }))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ScrapeResult<Page> {
        self.with_retries(url, || self.client.get(url).send()).await
    }

    async fn post(&self, url: &str, form: &[(String, String)]) -> ScrapeResult<Page> {
        self.with_retries(url, || self.client.post(url).form(form).send())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = HttpConfig {
            timeout_seconds: 10,
            max_retries: 2,
            user_agent: "Test Agent".to_string(),
        };
        assert!(HttpFetcher::with_config(config).is_ok());
    }

    #[test]
    fn retry_policy_covers_transient_statuses_only() {
        assert!(HttpFetcher::is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(HttpFetcher::is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!HttpFetcher::is_retryable(StatusCode::NOT_FOUND));
        assert!(!HttpFetcher::is_retryable(StatusCode::FORBIDDEN));
    }
}
