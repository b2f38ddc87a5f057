//! Domain module - the entities scraped from RateBeer
//!
//! Every entity is identified by its kind and numeric id and resolves its
//! remaining fields lazily, from one extraction, on first access.

pub mod beer;
pub mod brewery;
pub mod entity;
pub mod location;
pub mod review;
pub mod search;
pub mod style;

// Re-export commonly used items for convenience
pub use beer::{Beer, BeerDetails, BeerListing, BeerRating, Glassware};
pub use brewery::{AddressField, Brewery, BreweryDetails, BreweryListing, BreweryStatus};
pub use entity::{Entity, EntityKind, EntityRef, Resolvable};
pub use location::{Location, LocationDetails, LocationKind, TopStyle};
pub use review::{RatingBreakdown, Review, ReviewBuilder, ReviewOrder};
pub use search::SearchResult;
pub use style::{HIDDEN_STYLE_IDS, Style, StyleDetails};
