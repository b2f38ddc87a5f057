//! Countries and regions
//!
//! Both are one type, [`Location`], tagged with a [`LocationKind`]. A country
//! and a region with the same numeric id are different entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use tracing::debug;

use super::brewery::Brewery;
use super::entity::{Entity, EntityKind, EntityRef, Lazy, Resolvable, impl_stub_serialize, to_json};
use super::style::Style;
use crate::infrastructure::parsing::pagination::aggregate;
use crate::infrastructure::parsing::{PageCount, ParseContext};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};
use crate::infrastructure::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Country,
    Region,
}

impl LocationKind {
    pub const fn entity_kind(self) -> EntityKind {
        match self {
            Self::Country => EntityKind::Country,
            Self::Region => EntityKind::Region,
        }
    }

    fn page_url(self, session: &Session, id: u32, page: u32) -> String {
        match self {
            Self::Country => session.urls().country(id, page),
            Self::Region => session.urls().region(id, page),
        }
    }
}

impl FromStr for LocationKind {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "country" => Ok(Self::Country),
            "region" => Ok(Self::Region),
            other => Err(ScrapeError::invalid_argument(format!(
                "invalid location type: {other}"
            ))),
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Country => "country",
            Self::Region => "region",
        })
    }
}

/// A style popular in a location, with its number of listed beers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopStyle {
    pub style: Style,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationDetails {
    pub name: String,
    /// Active brewery count from the page heading
    pub num_breweries: u32,
    /// Side panel styles, most common first
    pub top_styles: Vec<TopStyle>,
    /// Active breweries first, then those out of business
    pub breweries: Vec<Brewery>,
}

#[derive(Clone)]
pub struct Location {
    kind: LocationKind,
    id: u32,
    name: Option<String>,
    details: Lazy<LocationDetails>,
    session: Session,
}

impl Location {
    pub fn new(session: Session, kind: LocationKind, id: u32) -> Self {
        Self {
            kind,
            id,
            name: None,
            details: Lazy::new(),
            session,
        }
    }

    pub fn with_name(session: Session, kind: LocationKind, id: u32, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(session, kind, id)
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn location_kind(&self) -> LocationKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.details.is_resolved()
    }

    pub async fn details(&self) -> ScrapeResult<&LocationDetails> {
        self.resolve().await
    }

    pub async fn resolved_name(&self) -> ScrapeResult<&str> {
        Ok(&self.resolve().await?.name)
    }

    pub async fn num_breweries(&self) -> ScrapeResult<u32> {
        Ok(self.resolve().await?.num_breweries)
    }

    pub async fn top_styles(&self) -> ScrapeResult<&[TopStyle]> {
        Ok(&self.resolve().await?.top_styles)
    }

    pub async fn breweries(&self) -> ScrapeResult<&[Brewery]> {
        Ok(&self.resolve().await?.breweries)
    }
}

async fn resolve_location(session: &Session, kind: LocationKind, id: u32) -> ScrapeResult<LocationDetails> {
    let parser = &session.parsers().location;
    let context = ParseContext::new(session, id);
    let entity = kind.entity_kind();

    let listing = aggregate(
        session,
        PageCount::Discover,
        |number| kind.page_url(session, id, number),
        |html| parser.parse_listing(html, &context, entity),
    )
    .await
    .map_err(|e| e.for_entity(entity, id))?;

    debug!("{} {} lists {} brewery(ies)", entity, id, listing.rows.len());
    Ok(LocationDetails {
        name: listing.header.name,
        num_breweries: listing.header.num_breweries,
        top_styles: listing.header.top_styles,
        breweries: listing.rows,
    })
}

impl Entity for Location {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind.entity_kind(), self.id)
    }

    fn known_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Resolvable for Location {
    type Details = LocationDetails;

    const FIELDS: &'static [&'static str] =
        &["name", "top_styles", "num_breweries", "breweries"];

    fn url(&self) -> String {
        self.kind.page_url(&self.session, self.id, 1)
    }

    fn resolve(&self) -> impl Future<Output = ScrapeResult<&LocationDetails>> + Send {
        self.details
            .get_or_resolve(|| resolve_location(&self.session, self.kind, self.id))
    }

    fn project(&self, details: &LocationDetails, field: &str) -> Option<Value> {
        match field {
            "name" => to_json(&details.name),
            "top_styles" => to_json(&details.top_styles),
            "num_breweries" => to_json(&details.num_breweries),
            "breweries" => to_json(&details.breweries),
            _ => None,
        }
    }
}

impl_stub_serialize!(Location);

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.entity_ref() == other.entity_ref()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity_ref().hash(state);
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("resolved", &self.details.is_resolved())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Location #{} ({})", self.id, self.kind)?;
        if let Some(name) = &self.name {
            write!(f, " - {name}")?;
        }
        f.write_str(">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!("Country".parse::<LocationKind>().unwrap(), LocationKind::Country);
        assert_eq!(" region ".parse::<LocationKind>().unwrap(), LocationKind::Region);
        assert!(matches!(
            "city".parse::<LocationKind>(),
            Err(ScrapeError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn kinds_map_to_distinct_entity_kinds() {
        assert_ne!(
            LocationKind::Country.entity_kind(),
            LocationKind::Region.entity_kind()
        );
    }
}
