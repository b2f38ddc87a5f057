//! Error types for fetching and extracting RateBeer entities
//!
//! Every failure surfaced by a field access, listing or search maps onto one
//! of these variants. Nothing in the extraction core retries: errors are
//! returned to the immediate caller of the triggering operation.

use thiserror::Error;

use crate::domain::entity::EntityKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrapeError {
    /// The fetch layer could not retrieve the page (HTTP 404/410 or absent fixture)
    #[error("Page not found - {url}")]
    PageNotFound { url: String },

    /// The page for an entity does not exist, or carries the site's
    /// "no such entity" placeholder
    #[error("{kind} not found - {id}")]
    EntityNotFound { kind: EntityKind, id: u32 },

    /// A structural anchor was missing or an unknown markup variant was found
    #[error("Extraction failed ({context}): {reason}")]
    Extraction { context: String, reason: String },

    /// A fixed pattern failed to match the scraped text
    #[error("Failed to parse {what}: {input:?}")]
    Parse { what: String, input: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Alias pages kept pointing at other alias pages
    #[error("Beer {id} is aliased through more than {hops} pages")]
    AliasChainTooLong { id: u32, hops: usize },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("HTTP request failed: {status} - {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Worker task failed: {message}")]
    Worker { message: String },
}

impl ScrapeError {
    pub fn page_not_found(url: &str) -> Self {
        Self::PageNotFound {
            url: url.to_string(),
        }
    }

    pub const fn entity_not_found(kind: EntityKind, id: u32) -> Self {
        Self::EntityNotFound { kind, id }
    }

    /// Create an extraction error for a missing anchor or unknown markup
    pub fn extraction(context: &str, reason: impl Into<String>) -> Self {
        Self::Extraction {
            context: context.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for the common "selector matched nothing" case
    pub fn missing(context: &str, selector: &str) -> Self {
        Self::extraction(context, format!("no element matches '{selector}'"))
    }

    pub fn parse(what: &str, input: &str) -> Self {
        Self::Parse {
            what: what.to_string(),
            input: input.to_string(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error means "this entity or page does not exist"
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound { .. } | Self::EntityNotFound { .. })
    }

    /// Map a fetch-level miss onto the entity that triggered it.
    ///
    /// Any other error is returned unchanged.
    #[must_use]
    pub fn for_entity(self, kind: EntityKind, id: u32) -> Self {
        match self {
            Self::PageNotFound { .. } => Self::entity_not_found(kind, id),
            other => other,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
