//! Application layer module
//!
//! [`RateBeer`] is the entry point: it owns the session and hands out lazily
//! resolved entities, search and the styles catalogue.

pub mod query;
pub mod search;

use std::sync::Arc;
use tracing::info;

use crate::domain::beer::Beer;
use crate::domain::brewery::Brewery;
use crate::domain::location::{Location, LocationKind};
use crate::domain::review::{Review, ReviewOrder};
use crate::domain::search::SearchResult;
use crate::domain::style::{self, Style};
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::fetcher::DocumentFetcher;
use crate::infrastructure::http_client::HttpFetcher;
use crate::infrastructure::parsing_error::ScrapeResult;
use crate::infrastructure::session::Session;

pub use query::QueryNormalizer;
pub use search::{SearchService, prefetch};

/// Entry point for everything scraped from RateBeer
#[derive(Debug)]
pub struct RateBeer {
    session: Session,
    search: SearchService,
}

impl RateBeer {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, config: &ScraperConfig) -> ScrapeResult<Self> {
        let session = Session::new(fetcher, config)?;
        Ok(Self {
            search: SearchService::new(session.clone())?,
            session,
        })
    }

    /// Talk to the live site over HTTP
    pub fn from_config(config: &ScraperConfig) -> ScrapeResult<Self> {
        let fetcher = HttpFetcher::with_config(config.http.clone())?;
        info!("🍺 RateBeer client ready for {}", config.base_url);
        Self::new(Arc::new(fetcher), config)
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub fn beer(&self, id: u32) -> Beer {
        Beer::new(self.session.clone(), id)
    }

    /// A beer whose name is already known; the name survives alias redirection
    pub fn beer_named(&self, id: u32, name: impl Into<String>) -> Beer {
        Beer::with_name(self.session.clone(), id, name)
    }

    pub fn brewery(&self, id: u32) -> Brewery {
        Brewery::new(self.session.clone(), id)
    }

    pub fn style(&self, id: u32) -> Style {
        Style::new(self.session.clone(), id)
    }

    pub fn country(&self, id: u32) -> Location {
        Location::new(self.session.clone(), LocationKind::Country, id)
    }

    pub fn region(&self, id: u32) -> Location {
        Location::new(self.session.clone(), LocationKind::Region, id)
    }

    /// A location from a type name ("country" or "region")
    pub fn location(&self, kind: &str, id: u32) -> ScrapeResult<Location> {
        Ok(Location::new(self.session.clone(), kind.parse()?, id))
    }

    pub async fn search(&self, query: &str) -> ScrapeResult<SearchResult> {
        self.search.search(query).await
    }

    /// Search and resolve every beer found before returning
    pub async fn search_prefetched(&self, query: &str) -> ScrapeResult<SearchResult> {
        self.search.search_prefetched(query).await
    }

    pub async fn all_styles(&self, include_hidden: bool) -> ScrapeResult<Vec<Style>> {
        style::all_styles(&self.session, include_hidden).await
    }

    pub async fn reviews(&self, beer_id: u32, order: ReviewOrder, limit: usize) -> ScrapeResult<Vec<Review>> {
        Review::retrieve(&self.beer(beer_id), order, limit).await
    }
}
