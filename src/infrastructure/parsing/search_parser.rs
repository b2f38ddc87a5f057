//! Search results page extraction
//!
//! The results page is a run of `h2` headings, each followed by a results
//! table. Only the "brewers" and "beers" tables are read.

use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use super::text::{Css, child_elements, element_text, fix_characters, id_from_link};
use super::{PageParser, ParseContext};
use crate::domain::beer::Beer;
use crate::domain::brewery::Brewery;
use crate::domain::search::SearchResult;
use crate::infrastructure::parsing_error::ScrapeResult;

const CONTEXT: &str = "search results";

const BREWERS_HEADING: &str = "brewers";
const BEERS_HEADING: &str = "beers";

#[derive(Debug)]
pub struct SearchParser {
    heading: Css,
    table: Css,
    row: Css,
    link: Css,
}

impl SearchParser {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            heading: Css::new("h2")?,
            table: Css::new("table")?,
            row: Css::new("tr")?,
            link: Css::new("a")?,
        })
    }

    fn breweries(&self, table: ElementRef<'_>, context: &ParseContext<'_>) -> ScrapeResult<Vec<Brewery>> {
        let mut breweries = Vec::new();
        for row in self.row.all(table) {
            let Some(link) = self.link.first(row) else {
                continue;
            };
            let name = child_elements(row)
                .next()
                .map(|cell| fix_characters(&element_text(cell)))
                .unwrap_or_default();
            breweries.push(Brewery::with_name(
                context.session.clone(),
                id_from_link(link, CONTEXT)?,
                name,
            ));
        }
        Ok(breweries)
    }

    /// The first row holds column headings
    fn beers(&self, table: ElementRef<'_>, context: &ParseContext<'_>) -> ScrapeResult<Vec<Beer>> {
        let mut beers = Vec::new();
        for row in self.row.all(table).skip(1) {
            let Some(link) = self.link.first(row) else {
                warn!("Search result row without a beer link skipped");
                continue;
            };
            let name = child_elements(row)
                .next()
                .map(|cell| fix_characters(&element_text(cell)))
                .unwrap_or_default();
            beers.push(Beer::with_name(
                context.session.clone(),
                id_from_link(link, CONTEXT)?,
                name,
            ));
        }
        Ok(beers)
    }
}

impl PageParser for SearchParser {
    type Output = SearchResult;

    /// Headings and tables are paired by position
    fn parse_document(&self, html: &Html, context: &ParseContext<'_>) -> ScrapeResult<SearchResult> {
        let headings = self
            .heading
            .all_in(html)
            .map(|h2| fix_characters(&element_text(h2)).to_lowercase());

        let mut result = SearchResult::default();
        for (heading, table) in headings.zip(self.table.all_in(html)) {
            match heading.as_str() {
                BREWERS_HEADING => result.breweries = Some(self.breweries(table, context)?),
                BEERS_HEADING => result.beers = Some(self.beers(table, context)?),
                other => debug!("Ignoring search results table '{}'", other),
            }
        }
        Ok(result)
    }
}
