//! Brewery page and brewery beer-list extraction

use chrono::NaiveDate;
use indexmap::IndexMap;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use super::text::{
    Css, child_elements, child_texts, count, element_text, fix_characters, id_from_link,
    non_zero_float, strip_nbsp,
};
use super::{PageParser, ParseContext};
use crate::domain::beer::{Beer, BeerListing};
use crate::domain::brewery::{AddressField, Brewery, BreweryDetails};
use crate::domain::entity::EntityKind;
use crate::domain::style::Style;
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

const CONTEXT: &str = "brewery page";
const LIST_CONTEXT: &str = "brewery beer list";

/// Date format of the "added" column
const DATE_ADDED_FORMAT: &str = "%m/%d/%Y";

/// Column positions in the beer list
const ABV_CELL: usize = 1;
const DATE_CELL: usize = 2;
const AVG_RATING_CELL: usize = 4;
const STYLE_RATING_CELL: usize = 5;
const NUM_RATINGS_CELL: usize = 6;

/// Another brewery a beer was produced with
#[derive(Debug, Clone)]
pub enum BrewedRelation {
    /// Brewed on another brewery's premises
    At(Brewery),
    /// Brewed by, or for, another brewery
    ByFor(Brewery),
}

/// One `tr` of the beer list
#[derive(Debug)]
pub enum BreweryRow {
    /// Section header; applies to the rows below it in the same `tbody`
    Header(BrewedRelation),
    Beer {
        id: u32,
        name: String,
        listing: BeerListing,
    },
    /// Column headings, spacers and the like
    Blank,
}

#[derive(Debug)]
pub struct BreweryParser {
    paragraphs: Css,
    info_root: Css,
    title: Css,
    div: Css,
    address_parts: Css,
    telephone: Css,
    list_sections: Css,
    cell: Css,
    link: Css,
    beer_link: Css,
    retired_note: Css,
    brewed_note: Css,
}

impl BreweryParser {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            paragraphs: Css::new("body p")?,
            info_root: Css::new("div[itemtype='http://schema.org/LocalBusiness']")?,
            title: Css::new("h1")?,
            div: Css::new("div")?,
            address_parts: Css::new("div[itemprop='address'] b span")?,
            telephone: Css::new("span[itemprop='telephone']")?,
            list_sections: Css::new("table#brewer-beer-table tbody")?,
            cell: Css::new("td")?,
            link: Css::new("a")?,
            beer_link: Css::new("strong a")?,
            retired_note: Css::new("em.real-small")?,
            brewed_note: Css::new("div.small em")?,
        })
    }

    fn is_removed(&self, html: &Html, id: u32) -> bool {
        let placeholder =
            format!("This brewer, ID#{id}, is no longer in the database. RateBeer Home");
        let text: String = self.paragraphs.all_in(html).map(element_text).collect();
        fix_characters(&text) == placeholder
    }

    fn address(&self, root: ElementRef<'_>) -> ScrapeResult<IndexMap<AddressField, String>> {
        self.address_parts
            .all(root)
            .map(|span| {
                let tag = span.value().attr("itemprop").unwrap_or_default();
                let field = AddressField::from_itemprop(tag).ok_or_else(|| {
                    ScrapeError::extraction(CONTEXT, format!("unrecognised address attribute '{tag}'"))
                })?;
                Ok((field, fix_characters(&element_text(span))))
            })
            .collect()
    }

    /// Every beer on one page of the list, with brewed-at / by-for context applied
    pub fn beer_rows(&self, html: &Html, context: &ParseContext<'_>) -> ScrapeResult<Vec<Beer>> {
        let mut beers = Vec::new();

        for section in self.list_sections.all_in(html) {
            let mut current: Option<BrewedRelation> = None;
            for row in child_elements(section).filter(|e| e.value().name() == "tr") {
                match self.parse_row(row, context)? {
                    BreweryRow::Header(relation) => current = Some(relation),
                    BreweryRow::Beer { id, name, mut listing } => {
                        if listing.brewed_at.is_none() && listing.brewed_by_for.is_none() {
                            match &current {
                                Some(BrewedRelation::At(brewery)) => {
                                    listing.brewed_at = Some(brewery.clone());
                                }
                                Some(BrewedRelation::ByFor(brewery)) => {
                                    listing.brewed_by_for = Some(brewery.clone());
                                }
                                None => {}
                            }
                        }
                        beers.push(Beer::listed(context.session.clone(), id, name, listing));
                    }
                    BreweryRow::Blank => {}
                }
            }
        }

        debug!("Parsed {} beer row(s) for brewery {}", beers.len(), context.id);
        Ok(beers)
    }

    pub fn parse_row(&self, row: ElementRef<'_>, context: &ParseContext<'_>) -> ScrapeResult<BreweryRow> {
        let cells: Vec<ElementRef<'_>> = self.cell.all(row).collect();
        let name_cell = cells.first().copied();
        let beer_link = name_cell.and_then(|cell| self.beer_link.first(cell));

        let (Some(name_cell), Some(beer_link)) = (name_cell, beer_link) else {
            let text = element_text(row);
            return Ok(self
                .link
                .first(row)
                .map(|link| self.relation(&text, link, context))
                .transpose()?
                .flatten()
                .map_or(BreweryRow::Blank, BreweryRow::Header));
        };

        let mut listing = BeerListing {
            style: self.style(name_cell, context)?,
            retired: self
                .retired_note
                .first(name_cell)
                .is_some_and(|note| element_text(note).to_lowercase().contains("retired")),
            abv: cells.get(ABV_CELL).and_then(|c| non_zero_float(&element_text(*c))),
            date_added: cells
                .get(DATE_CELL)
                .map(|c| parse_date_added(&element_text(*c)))
                .transpose()?
                .flatten(),
            avg_rating: cells.get(AVG_RATING_CELL).and_then(|c| non_zero_float(&cell_text(*c))),
            style_rating: cells.get(STYLE_RATING_CELL).and_then(|c| count(&cell_text(*c))),
            num_ratings: cells.get(NUM_RATINGS_CELL).and_then(|c| count(&cell_text(*c))),
            ..BeerListing::default()
        };

        if let Some(note) = self.brewed_note.first(name_cell) {
            let text = child_texts(note).into_iter().next().unwrap_or_default();
            if let Some(link) = self.link.first(note) {
                match self.relation(&text, link, context)? {
                    Some(BrewedRelation::At(brewery)) => listing.brewed_at = Some(brewery),
                    Some(BrewedRelation::ByFor(brewery)) => listing.brewed_by_for = Some(brewery),
                    None => warn!("Unrecognised brewed note on brewery {}: {:?}", context.id, text),
                }
            }
        }

        Ok(BreweryRow::Beer {
            id: id_from_link(beer_link, LIST_CONTEXT)?,
            name: fix_characters(&element_text(beer_link)),
            listing,
        })
    }

    fn relation(
        &self,
        text: &str,
        link: ElementRef<'_>,
        context: &ParseContext<'_>,
    ) -> ScrapeResult<Option<BrewedRelation>> {
        let brewery = || -> ScrapeResult<Brewery> {
            Ok(Brewery::with_name(
                context.session.clone(),
                id_from_link(link, LIST_CONTEXT)?,
                fix_characters(&element_text(link)),
            ))
        };
        if text.contains("Brewed at") {
            Ok(Some(BrewedRelation::At(brewery()?)))
        } else if text.contains("Brewed by/for") {
            Ok(Some(BrewedRelation::ByFor(brewery()?)))
        } else {
            Ok(None)
        }
    }

    /// The style link is the anchor wrapping a `span`
    fn style(&self, name_cell: ElementRef<'_>, context: &ParseContext<'_>) -> ScrapeResult<Option<Style>> {
        self.link
            .all(name_cell)
            .find(|a| child_elements(*a).any(|c| c.value().name() == "span"))
            .map(|a| {
                Ok(Style::with_name(
                    context.session.clone(),
                    id_from_link(a, LIST_CONTEXT)?,
                    fix_characters(&element_text(a)),
                ))
            })
            .transpose()
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    strip_nbsp(&element_text(cell)).trim().to_string()
}

fn parse_date_added(text: &str) -> ScrapeResult<Option<NaiveDate>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, DATE_ADDED_FORMAT)
        .map(Some)
        .map_err(|_| ScrapeError::parse("date added", text))
}

impl PageParser for BreweryParser {
    type Output = BreweryDetails;

    /// Info page fields; `beers` is filled from the beer list separately
    fn parse_document(&self, html: &Html, context: &ParseContext<'_>) -> ScrapeResult<BreweryDetails> {
        if self.is_removed(html, context.id) {
            return Err(ScrapeError::entity_not_found(EntityKind::Brewery, context.id));
        }
        let root = self
            .info_root
            .first_in(html)
            .ok_or(ScrapeError::entity_not_found(EntityKind::Brewery, context.id))?;

        Ok(BreweryDetails {
            name: fix_characters(&element_text(self.title.require(root, CONTEXT)?)),
            brewery_type: self
                .div
                .all(root)
                .nth(1)
                .map(|div| fix_characters(&element_text(div)))
                .unwrap_or_default(),
            address: self.address(root)?,
            telephone: self
                .telephone
                .first(root)
                .map(|t| fix_characters(&element_text(t)))
                .filter(|t| !t.is_empty()),
            beers: Vec::new(),
        })
    }
}
