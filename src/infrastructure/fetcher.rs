//! Document fetching seam
//!
//! The extraction core never talks HTTP directly. It asks a [`DocumentFetcher`]
//! for a page body and parses it synchronously, so parsed documents (which are
//! not `Send`) never live across an await point.

use async_trait::async_trait;
use scraper::Html;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::parsing_error::{ScrapeError, ScrapeResult};

/// A fetched page: where it came from and its raw HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Parse the body into a DOM. Keep the result out of any `.await`.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Resolves URLs to pages.
///
/// Implementations return [`ScrapeError::PageNotFound`] for absent pages.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ScrapeResult<Page>;

    /// Submit a form and return the resulting page
    async fn post(&self, url: &str, form: &[(String, String)]) -> ScrapeResult<Page>;
}

/// Serves pages from memory.
///
/// Useful for replaying saved pages and for offline tests. Every requested
/// URL is recorded so callers can assert on fetch order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    pages: Arc<Mutex<HashMap<String, String>>>,
    posts: Arc<Mutex<HashMap<(String, String), String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body returned for `url`
    pub fn insert(&self, url: impl Into<String>, body: impl Into<String>) {
        lock(&self.pages).insert(url.into(), body.into());
    }

    #[must_use]
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }

    /// Register the body returned when posting a form whose values join to `form_key`.
    ///
    /// The key is the form values joined with `&` in submission order.
    pub fn insert_post(
        &self,
        url: impl Into<String>,
        form_key: impl Into<String>,
        body: impl Into<String>,
    ) {
        lock(&self.posts).insert((url.into(), form_key.into()), body.into());
    }

    /// URLs requested so far, in order (posts are recorded as `url?values`)
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    fn form_key(form: &[(String, String)]) -> String {
        form.iter()
            .map(|(_, value)| value.as_str())
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl DocumentFetcher for InMemoryFetcher {
    async fn fetch(&self, url: &str) -> ScrapeResult<Page> {
        lock(&self.requests).push(url.to_string());
        let body = lock(&self.pages).get(url).cloned();
        match body {
            Some(body) => {
                debug!("Serving {} bytes from memory for {}", body.len(), url);
                Ok(Page::new(url, body))
            }
            None => Err(ScrapeError::page_not_found(url)),
        }
    }

    async fn post(&self, url: &str, form: &[(String, String)]) -> ScrapeResult<Page> {
        let key = Self::form_key(form);
        lock(&self.requests).push(format!("{url}?{key}"));
        let body = lock(&self.posts).get(&(url.to_string(), key)).cloned();
        body.map_or_else(
            || Err(ScrapeError::page_not_found(url)),
            |body| Ok(Page::new(url, body)),
        )
    }
}
