//! HTML extraction rules for RateBeer pages
//!
//! One parser per page shape. Each parser compiles its selectors once and
//! exposes synchronous functions from a parsed document to immutable domain
//! values, so callers never keep a document alive across an await.

pub mod alias;
pub mod beer_parser;
pub mod brewery_parser;
pub mod location_parser;
pub mod pagination;
pub mod review_parser;
pub mod search_parser;
pub mod style_parser;
pub mod text;

pub use alias::{AliasChain, AliasDetector, AliasState, MAX_ALIAS_HOPS};
pub use beer_parser::{BeerPage, BeerParser};
pub use brewery_parser::{BreweryParser, BreweryRow};
pub use location_parser::{LocationHeader, LocationParser};
pub use pagination::{ListingPage, PageCount, Paginator};
pub use review_parser::ReviewParser;
pub use search_parser::SearchParser;
pub use style_parser::{StyleParser, StylePage};

use scraper::Html;

use super::fetcher::Page;
use super::parsing_error::ScrapeResult;
use super::session::Session;

/// What a parser knows about the page it is reading
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// Session used to build nested entities
    pub session: &'a Session,
    /// Id of the entity the page was fetched for
    pub id: u32,
}

impl<'a> ParseContext<'a> {
    pub const fn new(session: &'a Session, id: u32) -> Self {
        Self { session, id }
    }
}

/// Parser from one page shape to a value
pub trait PageParser {
    type Output;

    fn parse_document(&self, html: &Html, context: &ParseContext<'_>) -> ScrapeResult<Self::Output>;

    /// Parse a fetched page. The document lives only for this call.
    fn parse_page(&self, page: &Page, context: &ParseContext<'_>) -> ScrapeResult<Self::Output> {
        let html = page.document();
        self.parse_document(&html, context)
    }
}

/// Every parser, compiled once per session
#[derive(Debug)]
pub struct Parsers {
    pub beer: BeerParser,
    pub brewery: BreweryParser,
    pub style: StyleParser,
    pub location: LocationParser,
    pub review: ReviewParser,
    pub search: SearchParser,
    pub paginator: Paginator,
}

impl Parsers {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            beer: BeerParser::new()?,
            brewery: BreweryParser::new()?,
            style: StyleParser::new()?,
            location: LocationParser::new()?,
            review: ReviewParser::new()?,
            search: SearchParser::new()?,
            paginator: Paginator::new()?,
        })
    }
}
