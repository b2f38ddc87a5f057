//! Beer entity
//!
//! A beer's page supplies every field in one fetch. Beer pages may be
//! aliases of another beer; resolution follows the alias to the canonical
//! page but keeps the name shown on the first page it read.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info};

use super::brewery::Brewery;
use super::entity::{Entity, EntityKind, EntityRef, Lazy, Resolvable, impl_stub_serialize, to_json};
use super::review::{Review, ReviewOrder};
use super::style::Style;
use crate::infrastructure::parsing::{AliasChain, BeerPage, PageParser, ParseContext};
use crate::infrastructure::parsing_error::ScrapeResult;
use crate::infrastructure::session::Session;

/// A glass the site recommends for a beer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Glassware {
    pub id: u32,
    pub name: String,
}

/// Aggregate rating figures from a beer page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BeerRating {
    /// Overall percentile
    pub overall: Option<f64>,
    /// Percentile within the beer's style
    pub style: Option<f64>,
    pub ratings: Option<u32>,
    pub weighted_avg: Option<f64>,
    pub mean: Option<f64>,
}

/// Everything scraped from a beer's page
#[derive(Debug, Clone, Serialize)]
pub struct BeerDetails {
    /// Id of the page the details came from (differs from the beer id for aliases)
    pub canonical_id: u32,
    pub name: String,
    pub brewery: Brewery,
    pub style: Style,
    pub glassware: Vec<Glassware>,
    /// Distribution channel -> availability text
    pub availability: IndexMap<String, String>,
    pub abv: Option<f64>,
    pub calories: Option<f64>,
    pub description: String,
    pub retired: bool,
    pub rating: BeerRating,
}

/// Row data shown for a beer in a brewery's beer list
#[derive(Debug, Clone, Default, Serialize)]
pub struct BeerListing {
    pub style: Option<Style>,
    pub abv: Option<f64>,
    pub date_added: Option<NaiveDate>,
    pub retired: bool,
    pub avg_rating: Option<f64>,
    pub style_rating: Option<u32>,
    pub num_ratings: Option<u32>,
    /// Brewery whose premises produced the beer, when not the listing brewery
    pub brewed_at: Option<Brewery>,
    /// Client the beer was brewed by or for
    pub brewed_by_for: Option<Brewery>,
}

#[derive(Clone)]
pub struct Beer {
    id: u32,
    name: Option<String>,
    listing: Option<Arc<BeerListing>>,
    details: Lazy<BeerDetails>,
    session: Session,
}

impl Beer {
    pub fn new(session: Session, id: u32) -> Self {
        Self {
            id,
            name: None,
            listing: None,
            details: Lazy::new(),
            session,
        }
    }

    pub fn with_name(session: Session, id: u32, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(session, id)
        }
    }

    pub(crate) fn listed(session: Session, id: u32, name: String, listing: BeerListing) -> Self {
        Self {
            listing: Some(Arc::new(listing)),
            ..Self::with_name(session, id, name)
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Name known without fetching (from the caller or a listing)
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Listing row data, for beers built from a brewery's beer list
    pub fn listing(&self) -> Option<&BeerListing> {
        self.listing.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.details.is_resolved()
    }

    pub async fn details(&self) -> ScrapeResult<&BeerDetails> {
        self.resolve().await
    }

    pub async fn resolved_name(&self) -> ScrapeResult<&str> {
        Ok(&self.resolve().await?.name)
    }

    pub async fn canonical_id(&self) -> ScrapeResult<u32> {
        Ok(self.resolve().await?.canonical_id)
    }

    pub async fn brewery(&self) -> ScrapeResult<&Brewery> {
        Ok(&self.resolve().await?.brewery)
    }

    pub async fn style(&self) -> ScrapeResult<&Style> {
        Ok(&self.resolve().await?.style)
    }

    pub async fn glassware(&self) -> ScrapeResult<&[Glassware]> {
        Ok(&self.resolve().await?.glassware)
    }

    pub async fn availability(&self) -> ScrapeResult<&IndexMap<String, String>> {
        Ok(&self.resolve().await?.availability)
    }

    pub async fn abv(&self) -> ScrapeResult<Option<f64>> {
        Ok(self.resolve().await?.abv)
    }

    pub async fn calories(&self) -> ScrapeResult<Option<f64>> {
        Ok(self.resolve().await?.calories)
    }

    pub async fn description(&self) -> ScrapeResult<&str> {
        Ok(&self.resolve().await?.description)
    }

    pub async fn is_retired(&self) -> ScrapeResult<bool> {
        Ok(self.resolve().await?.retired)
    }

    pub async fn rating(&self) -> ScrapeResult<&BeerRating> {
        Ok(&self.resolve().await?.rating)
    }

    /// Reviews of this beer in the given order, at most `limit` of them
    pub async fn reviews(&self, order: ReviewOrder, limit: usize) -> ScrapeResult<Vec<Review>> {
        Review::retrieve(self, order, limit).await
    }

    pub(crate) const fn session(&self) -> &Session {
        &self.session
    }
}

/// Fetch and extract a beer, following alias pages.
///
/// The name shown on the first page read (or supplied by the caller) is kept.
async fn resolve_beer(session: &Session, id: u32, known_name: Option<&str>) -> ScrapeResult<BeerDetails> {
    let parser = &session.parsers().beer;
    let mut chain = AliasChain::new(id);
    let mut retained_name = known_name.map(str::to_string);

    loop {
        let current = chain.current();
        let page = session
            .fetch(&session.urls().beer(current))
            .await
            .map_err(|e| e.for_entity(EntityKind::Beer, id))?;

        match parser.parse_page(&page, &ParseContext::new(session, current))? {
            BeerPage::Aliased { name, target } => {
                info!("🔀 Beer {} is an alias of {}", current, target);
                retained_name.get_or_insert(name);
                chain.follow(target)?;
            }
            BeerPage::Direct(details) => {
                let mut details = *details;
                if let Some(name) = retained_name {
                    details.name = name;
                }
                debug!("Resolved beer {} after {} alias hop(s)", id, chain.hops());
                return Ok(details);
            }
        }
    }
}

impl Entity for Beer {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::Beer, self.id)
    }

    fn known_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Resolvable for Beer {
    type Details = BeerDetails;

    const FIELDS: &'static [&'static str] = &[
        "name",
        "brewery",
        "style",
        "glassware",
        "availability",
        "abv",
        "calories",
        "description",
        "retired",
        "rating",
    ];

    fn url(&self) -> String {
        self.session.urls().beer(self.id)
    }

    fn resolve(&self) -> impl Future<Output = ScrapeResult<&BeerDetails>> + Send {
        self.details
            .get_or_resolve(|| resolve_beer(&self.session, self.id, self.name.as_deref()))
    }

    fn project(&self, details: &BeerDetails, field: &str) -> Option<Value> {
        match field {
            "name" => to_json(&details.name),
            "brewery" => to_json(&details.brewery),
            "style" => to_json(&details.style),
            "glassware" => to_json(&details.glassware),
            "availability" => to_json(&details.availability),
            "abv" => to_json(&details.abv),
            "calories" => to_json(&details.calories),
            "description" => to_json(&details.description),
            "retired" => to_json(&details.retired),
            "rating" => to_json(&details.rating),
            _ => None,
        }
    }
}

impl_stub_serialize!(Beer);

impl PartialEq for Beer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Beer {}

impl Hash for Beer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity_ref().hash(state);
    }
}

impl fmt::Debug for Beer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Beer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("resolved", &self.details.is_resolved())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Beer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "#<Beer #{} - {}>", self.id, name),
            None => write!(f, "#<Beer #{}>", self.id),
        }
    }
}
