//! Style entity and the style catalogue

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use tracing::{debug, info};

use super::beer::Beer;
use super::entity::{Entity, EntityKind, EntityRef, Lazy, Resolvable, impl_stub_serialize, to_json};
use crate::infrastructure::parsing::{PageParser, ParseContext};
use crate::infrastructure::parsing_error::ScrapeResult;
use crate::infrastructure::session::Session;

/// Styles that exist on the site but are not linked from the styles page
pub const HIDDEN_STYLE_IDS: [u32; 17] = [
    40, 41, 57, 59, 66, 67, 68, 69, 70, 75, 83, 99, 104, 106, 116, 119, 120,
];

#[derive(Debug, Clone, Serialize)]
pub struct StyleDetails {
    pub name: String,
    pub description: String,
    pub glassware: Vec<String>,
    /// Top beers keyed by the number the site lists them under
    pub beers: IndexMap<u32, Beer>,
}

#[derive(Clone)]
pub struct Style {
    id: u32,
    name: Option<String>,
    category: Option<String>,
    details: Lazy<StyleDetails>,
    session: Session,
}

impl Style {
    pub fn new(session: Session, id: u32) -> Self {
        Self {
            id,
            name: None,
            category: None,
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

    pub(crate) fn categorized(session: Session, id: u32, name: String, category: Option<String>) -> Self {
        Self {
            category,
            ..Self::with_name(session, id, name)
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Category heading from the styles page; only set on styles from [`all_styles`]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.details.is_resolved()
    }

    pub async fn details(&self) -> ScrapeResult<&StyleDetails> {
        self.resolve().await
    }

    pub async fn resolved_name(&self) -> ScrapeResult<&str> {
        Ok(&self.resolve().await?.name)
    }

    pub async fn description(&self) -> ScrapeResult<&str> {
        Ok(&self.resolve().await?.description)
    }

    pub async fn glassware(&self) -> ScrapeResult<&[String]> {
        Ok(&self.resolve().await?.glassware)
    }

    pub async fn beers(&self) -> ScrapeResult<&IndexMap<u32, Beer>> {
        Ok(&self.resolve().await?.beers)
    }
}

async fn resolve_style(session: &Session, id: u32) -> ScrapeResult<StyleDetails> {
    let parser = &session.parsers().style;
    let context = ParseContext::new(session, id);

    let page = session
        .fetch(&session.urls().style(id))
        .await
        .map_err(|e| e.for_entity(EntityKind::Style, id))?;
    let info = parser.parse_page(&page, &context)?;

    let list = session
        .fetch(&session.urls().style_beers(id))
        .await
        .map_err(|e| e.for_entity(EntityKind::Style, id))?;
    let beers = parser.beer_list(&list, &context)?;
    debug!("Style {} lists {} beer(s)", id, beers.len());

    Ok(StyleDetails {
        name: info.name,
        description: info.description,
        glassware: info.glassware,
        beers,
    })
}

/// Every style on the styles page, each tagged with its category heading.
///
/// With `include_hidden`, id-only stubs for [`HIDDEN_STYLE_IDS`] follow.
pub async fn all_styles(session: &Session, include_hidden: bool) -> ScrapeResult<Vec<Style>> {
    let page = session.fetch(&session.urls().styles()).await?;
    let mut styles = session
        .parsers()
        .style
        .style_list(&page, &ParseContext::new(session, 0))?;
    info!("📚 Styles page lists {} style(s)", styles.len());

    if include_hidden {
        styles.extend(HIDDEN_STYLE_IDS.iter().map(|id| Style::new(session.clone(), *id)));
    }
    Ok(styles)
}

impl Entity for Style {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::Style, self.id)
    }

    fn known_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Resolvable for Style {
    type Details = StyleDetails;

    const FIELDS: &'static [&'static str] = &["name", "category", "description", "glassware", "beers"];

    fn url(&self) -> String {
        self.session.urls().style(self.id)
    }

    fn resolve(&self) -> impl Future<Output = ScrapeResult<&StyleDetails>> + Send {
        self.details
            .get_or_resolve(|| resolve_style(&self.session, self.id))
    }

    fn project(&self, details: &StyleDetails, field: &str) -> Option<Value> {
        match field {
            "name" => to_json(&details.name),
            "category" => to_json(&self.category),
            "description" => to_json(&details.description),
            "glassware" => to_json(&details.glassware),
            "beers" => to_json(&details.beers),
            _ => None,
        }
    }
}

impl_stub_serialize!(Style);

impl PartialEq for Style {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Style {}

impl Hash for Style {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity_ref().hash(state);
    }
}

impl fmt::Debug for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Style")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("resolved", &self.details.is_resolved())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "#<Style #{} - {}>", self.id, name),
            None => write!(f, "#<Style #{}>", self.id),
        }
    }
}
