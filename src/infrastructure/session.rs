//! Shared handle every entity resolves through
//!
//! A session bundles the document fetcher, the URL templates and the worker
//! limits. Cloning is cheap; entities keep a clone so that lazily resolved
//! fields can fetch their pages later.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::config::ratebeer::SiteUrls;
use super::config::ScraperConfig;
use super::fetcher::{DocumentFetcher, Page};
use super::parsing::Parsers;
use super::parsing_error::ScrapeResult;

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    fetcher: Arc<dyn DocumentFetcher>,
    urls: SiteUrls,
    parsers: Parsers,
    row_fetch_concurrency: usize,
}

impl Session {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, config: &ScraperConfig) -> ScrapeResult<Self> {
        Ok(Self {
            inner: Arc::new(SessionInner {
                fetcher,
                urls: SiteUrls::new(&config.base_url)?,
                parsers: Parsers::new()?,
                row_fetch_concurrency: config.workers.row_fetch_concurrency.max(1),
            }),
        })
    }

    pub fn urls(&self) -> &SiteUrls {
        &self.inner.urls
    }

    pub fn parsers(&self) -> &Parsers {
        &self.inner.parsers
    }

    pub fn row_fetch_concurrency(&self) -> usize {
        self.inner.row_fetch_concurrency
    }

    pub async fn fetch(&self, url: &str) -> ScrapeResult<Page> {
        debug!("Fetching {}", url);
        self.inner.fetcher.fetch(url).await
    }

    pub async fn post(&self, url: &str, form: &[(String, String)]) -> ScrapeResult<Page> {
        debug!("Posting {} field(s) to {}", form.len(), url);
        self.inner.fetcher.post(url, form).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("urls", &self.inner.urls)
            .field("row_fetch_concurrency", &self.inner.row_fetch_concurrency)
            .finish_non_exhaustive()
    }
}
