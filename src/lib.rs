//! RateBeer scraper - lazily resolved RateBeer entities
//!
//! Beers, breweries, styles, countries, regions, reviews and search results
//! extracted from RateBeer's HTML pages. Entities are cheap handles: their
//! fields are fetched and extracted on first access, once.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the public surface for easier access
pub use application::RateBeer;
pub use domain::{
    Beer, Brewery, Entity, EntityKind, EntityRef, Location, LocationKind, Resolvable, Review,
    ReviewOrder, SearchResult, Style,
};
pub use infrastructure::{
    ConfigManager, DocumentFetcher, HttpFetcher, InMemoryFetcher, Page, ScrapeError, ScrapeResult,
    ScraperConfig, Session,
};
