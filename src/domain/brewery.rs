//! Brewery entity
//!
//! One resolution reads the brewery's info page and every page of its beer
//! list, so `beers` is available alongside the other fields.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

use super::beer::Beer;
use super::entity::{Entity, EntityKind, EntityRef, Lazy, Resolvable, impl_stub_serialize, to_json};
use crate::infrastructure::parsing::pagination::aggregate;
use crate::infrastructure::parsing::{ListingPage, PageCount, PageParser, ParseContext};
use crate::infrastructure::parsing_error::ScrapeResult;
use crate::infrastructure::session::Session;

/// Address components, keyed from the page's schema.org `itemprop` tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    Street,
    City,
    State,
    Country,
    Postcode,
}

impl AddressField {
    pub fn from_itemprop(tag: &str) -> Option<Self> {
        match tag {
            "streetAddress" => Some(Self::Street),
            "addressLocality" => Some(Self::City),
            "addressRegion" => Some(Self::State),
            "addressCountry" => Some(Self::Country),
            "postalCode" => Some(Self::Postcode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreweryStatus {
    Active,
    OutOfBusiness,
}

/// Row data shown for a brewery in a country or region listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreweryListing {
    pub status: BreweryStatus,
    /// Only listed for active breweries
    pub established: Option<u32>,
    pub location: String,
    #[serde(rename = "type")]
    pub brewery_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreweryDetails {
    pub name: String,
    #[serde(rename = "type")]
    pub brewery_type: String,
    /// Only the components present on the page
    pub address: IndexMap<AddressField, String>,
    pub telephone: Option<String>,
    pub beers: Vec<Beer>,
}

#[derive(Clone)]
pub struct Brewery {
    id: u32,
    name: Option<String>,
    listing: Option<Arc<BreweryListing>>,
    details: Lazy<BreweryDetails>,
    session: Session,
}

impl Brewery {
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

    pub(crate) fn listed(session: Session, id: u32, name: String, listing: BreweryListing) -> Self {
        Self {
            listing: Some(Arc::new(listing)),
            ..Self::with_name(session, id, name)
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Listing row data, for breweries built from a location's brewery list
    pub fn listing(&self) -> Option<&BreweryListing> {
        self.listing.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.details.is_resolved()
    }

    pub async fn details(&self) -> ScrapeResult<&BreweryDetails> {
        self.resolve().await
    }

    pub async fn resolved_name(&self) -> ScrapeResult<&str> {
        Ok(&self.resolve().await?.name)
    }

    pub async fn brewery_type(&self) -> ScrapeResult<&str> {
        Ok(&self.resolve().await?.brewery_type)
    }

    pub async fn address(&self) -> ScrapeResult<&IndexMap<AddressField, String>> {
        Ok(&self.resolve().await?.address)
    }

    pub async fn telephone(&self) -> ScrapeResult<Option<&str>> {
        Ok(self.resolve().await?.telephone.as_deref())
    }

    pub async fn beers(&self) -> ScrapeResult<&[Beer]> {
        Ok(&self.resolve().await?.beers)
    }
}

async fn resolve_brewery(session: &Session, id: u32) -> ScrapeResult<BreweryDetails> {
    let parser = &session.parsers().brewery;
    let context = ParseContext::new(session, id);

    let page = session
        .fetch(&session.urls().brewery(id))
        .await
        .map_err(|e| e.for_entity(EntityKind::Brewery, id))?;
    let mut details = parser.parse_page(&page, &context)?;

    let listing = aggregate(
        session,
        PageCount::Discover,
        |number| session.urls().brewery_beers(id, number),
        |html| parser.beer_rows(html, &context).map(ListingPage::rows),
    )
    .await
    .map_err(|e| e.for_entity(EntityKind::Brewery, id))?;

    debug!("Brewery {} lists {} beer(s)", id, listing.rows.len());
    details.beers = listing.rows;
    Ok(details)
}

impl Entity for Brewery {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::Brewery, self.id)
    }

    fn known_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Resolvable for Brewery {
    type Details = BreweryDetails;

    const FIELDS: &'static [&'static str] = &["name", "type", "address", "telephone", "beers"];

    fn url(&self) -> String {
        self.session.urls().brewery(self.id)
    }

    fn resolve(&self) -> impl Future<Output = ScrapeResult<&BreweryDetails>> + Send {
        self.details
            .get_or_resolve(|| resolve_brewery(&self.session, self.id))
    }

    fn project(&self, details: &BreweryDetails, field: &str) -> Option<Value> {
        match field {
            "name" => to_json(&details.name),
            "type" => to_json(&details.brewery_type),
            "address" => to_json(&details.address),
            "telephone" => to_json(&details.telephone),
            "beers" => to_json(&details.beers),
            _ => None,
        }
    }
}

impl_stub_serialize!(Brewery);

impl PartialEq for Brewery {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Brewery {}

impl Hash for Brewery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity_ref().hash(state);
    }
}

impl fmt::Debug for Brewery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Brewery")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("listing", &self.listing)
            .field("resolved", &self.details.is_resolved())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Brewery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "#<Brewery #{} - {}>", self.id, name),
            None => write!(f, "#<Brewery #{}>", self.id),
        }
    }
}
