//! Country and region brewery listing extraction

use scraper::{ElementRef, Html};
use tracing::debug;

use super::text::{Css, element_text, fix_characters, id_from_link, leading_int, strip_nbsp};
use super::{ListingPage, ParseContext};
use crate::domain::brewery::{Brewery, BreweryListing, BreweryStatus};
use crate::domain::entity::EntityKind;
use crate::domain::location::TopStyle;
use crate::domain::style::Style;
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

const CONTEXT: &str = "location page";

const OUT_OF_BUSINESS: &str = "(Out of Business)";
const NAME_LOCATION_SEPARATOR: &str = " - ";

/// Column positions in a brewery table
const TYPE_CELL: usize = 1;
const ESTABLISHED_CELL: usize = 4;

/// Heading of a location page; only the first page's copy is kept
#[derive(Debug, Clone, PartialEq)]
pub struct LocationHeader {
    pub name: String,
    pub num_breweries: u32,
    pub top_styles: Vec<TopStyle>,
}

#[derive(Debug)]
pub struct LocationParser {
    root: Css,
    heading: Css,
    style_info: Css,
    title: Css,
    show_info: Css,
    tables: Css,
    row: Css,
    cell: Css,
    link: Css,
}

impl LocationParser {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            root: Css::new("#container table")?,
            heading: Css::new("#brewerCover")?,
            style_info: Css::new("#tagside p")?,
            title: Css::new("h1")?,
            show_info: Css::new("#showInfo")?,
            tables: Css::new("#brewerTable")?,
            row: Css::new("tr")?,
            cell: Css::new("td")?,
            link: Css::new("a")?,
        })
    }

    /// One page of a country or region listing.
    ///
    /// The first brewery table holds active breweries, any later one those out
    /// of business.
    pub fn parse_listing(
        &self,
        html: &Html,
        context: &ParseContext<'_>,
        kind: EntityKind,
    ) -> ScrapeResult<ListingPage<LocationHeader, Brewery>> {
        let root = self
            .root
            .first_in(html)
            .ok_or(ScrapeError::entity_not_found(kind, context.id))?;
        let heading = self.heading.require(root, CONTEXT)?;

        let title = element_text(self.title.require(heading, CONTEXT)?);
        let name = fix_characters(title.split("Breweries").next().unwrap_or_default());
        if name == "n/a" {
            return Err(ScrapeError::entity_not_found(kind, context.id));
        }

        let num_breweries = self
            .show_info
            .first(heading)
            .map(|info| {
                let text = element_text(info);
                u32::try_from(leading_int(text.split("active").next().unwrap_or_default()))
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        let top_styles = self.top_styles(root, context)?;

        let mut breweries = Vec::new();
        for (index, table) in self.tables.all(root).enumerate() {
            let status = if index == 0 {
                BreweryStatus::Active
            } else {
                BreweryStatus::OutOfBusiness
            };
            for row in self.row.all(table) {
                if let Some(brewery) = self.brewery_row(row, status, context)? {
                    breweries.push(brewery);
                }
            }
        }

        debug!("{} {}: {} brewery row(s) on this page", kind, context.id, breweries.len());
        Ok(ListingPage {
            header: LocationHeader {
                name,
                num_breweries,
                top_styles,
            },
            rows: breweries,
        })
    }

    /// Style links in the side panel, each followed by its beer count
    fn top_styles(&self, root: ElementRef<'_>, context: &ParseContext<'_>) -> ScrapeResult<Vec<TopStyle>> {
        let Some(panel) = self.style_info.first(root) else {
            return Ok(Vec::new());
        };

        let mut styles = Vec::new();
        for node in panel.children() {
            let Some(link) = ElementRef::wrap(node).filter(|e| e.value().name() == "a") else {
                continue;
            };
            // Count is the text between the link and the next element
            let count = node
                .next_siblings()
                .map_while(|sibling| sibling.value().as_text().map(|text| strip_nbsp(text)))
                .find(|text| !text.trim().is_empty())
                .map_or(0, |text| {
                    let digits: String = text.split_whitespace().collect();
                    u32::try_from(leading_int(&digits)).unwrap_or_default()
                });
            styles.push(TopStyle {
                style: Style::with_name(
                    context.session.clone(),
                    id_from_link(link, CONTEXT)?,
                    fix_characters(&element_text(link)),
                ),
                count,
            });
        }
        Ok(styles)
    }

    fn brewery_row(
        &self,
        row: ElementRef<'_>,
        status: BreweryStatus,
        context: &ParseContext<'_>,
    ) -> ScrapeResult<Option<Brewery>> {
        let cells: Vec<ElementRef<'_>> = self.cell.all(row).collect();
        let Some(first) = cells.first().copied() else {
            return Ok(None);
        };

        let link = self.link.require(first, CONTEXT)?;
        let (name, location) = split_name_location(&element_text(first));
        let established = match status {
            BreweryStatus::Active => cells
                .get(ESTABLISHED_CELL)
                .and_then(|c| u32::try_from(leading_int(&element_text(*c))).ok())
                .filter(|year| *year > 0),
            BreweryStatus::OutOfBusiness => None,
        };

        let listing = BreweryListing {
            status,
            established,
            location,
            brewery_type: cells
                .get(TYPE_CELL)
                .map(|c| fix_characters(&element_text(*c)))
                .unwrap_or_default(),
        };
        Ok(Some(Brewery::listed(
            context.session.clone(),
            id_from_link(link, CONTEXT)?,
            name,
            listing,
        )))
    }
}

/// `"Name - City"` into its parts; the location drops any out-of-business marker
fn split_name_location(text: &str) -> (String, String) {
    let text = fix_characters(text);
    let name = text
        .split(NAME_LOCATION_SEPARATOR)
        .next()
        .unwrap_or_default()
        .to_string();
    let location = match text.rsplit_once(NAME_LOCATION_SEPARATOR) {
        Some((_, tail)) => tail.replace(OUT_OF_BUSINESS, "").trim().to_string(),
        None => String::new(),
    };
    (name.trim().to_string(), location)
}
