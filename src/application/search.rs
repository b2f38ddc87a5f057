//! Free-text search over beers and breweries

use tracing::{debug, info};

use super::query::{QueryNormalizer, secondary_query};
use crate::domain::entity::Resolvable;
use crate::domain::search::SearchResult;
use crate::infrastructure::config::ratebeer::SEARCH_FIELD;
use crate::infrastructure::parsing::{PageParser, ParseContext};
use crate::infrastructure::parsing_error::ScrapeResult;
use crate::infrastructure::session::Session;
use crate::infrastructure::worker_pool::map_ordered;

/// Submits normalized queries to the site's search form
#[derive(Debug)]
pub struct SearchService {
    session: Session,
    normalizer: QueryNormalizer,
}

impl SearchService {
    pub fn new(session: Session) -> ScrapeResult<Self> {
        Ok(Self {
            session,
            normalizer: QueryNormalizer::new()?,
        })
    }

    pub const fn normalizer(&self) -> &QueryNormalizer {
        &self.normalizer
    }

    /// Search for `query`.
    ///
    /// A query naming an IPA is also searched with "india pale ale" spelled
    /// out, and the extra beers are merged in. Beers are unique by id,
    /// breweries sorted by id.
    pub async fn search(&self, query: &str) -> ScrapeResult<SearchResult> {
        let normalized = self.normalizer.normalize(query);
        let mut result = self.submit(&normalized).await?;

        if let Some(secondary) = secondary_query(&normalized) {
            debug!("Also searching {:?}", secondary);
            let extra = self.submit(&self.normalizer.normalize(&secondary)).await?;
            result.merge_beers(extra.beers);
        }

        let result = result.normalized();
        info!(
            "🔍 Search {:?}: {} beer(s), {} brewery(ies)",
            normalized,
            result.beers.as_ref().map_or(0, Vec::len),
            result.breweries.as_ref().map_or(0, Vec::len)
        );
        Ok(result)
    }

    /// Search, then resolve every beer found with bounded concurrency
    pub async fn search_prefetched(&self, query: &str) -> ScrapeResult<SearchResult> {
        let mut result = self.search(query).await?;
        if let Some(beers) = result.beers.take() {
            result.beers = Some(prefetch(beers, self.session.row_fetch_concurrency()).await?);
        }
        Ok(result)
    }

    async fn submit(&self, query: &str) -> ScrapeResult<SearchResult> {
        let form = vec![(SEARCH_FIELD.to_string(), query.to_string())];
        let page = self.session.post(&self.session.urls().search(), &form).await?;
        self.session
            .parsers()
            .search
            .parse_page(&page, &ParseContext::new(&self.session, 0))
    }
}

/// Resolve every entity, at most `limit` at a time, keeping their order
pub async fn prefetch<E>(entities: Vec<E>, limit: usize) -> ScrapeResult<Vec<E>>
where
    E: Resolvable + Clone + Send + 'static,
{
    map_ordered(entities, limit, |entity: E| async move {
        entity.resolve().await?;
        Ok(entity)
    })
    .await
}
