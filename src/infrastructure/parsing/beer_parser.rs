//! Beer page extraction

use indexmap::IndexMap;
use scraper::Html;
use tracing::debug;

use super::alias::{AliasDetector, AliasState};
use super::text::{
    Css, MiscValue, child_texts, element_text, fix_characters, id_from_link, leading_float,
    leading_int, strip_nbsp, symbolize_text,
};
use super::{PageParser, ParseContext};
use crate::domain::beer::{BeerDetails, BeerRating, Glassware};
use crate::domain::brewery::Brewery;
use crate::domain::entity::EntityKind;
use crate::domain::style::Style;
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Heading the site shows instead of a beer name for unknown ids
const NOT_FOUND_TITLE: &str = "we didn't find this beer";

const CONTEXT: &str = "beer page";

/// A fetched beer page: either the beer, or an alias pointing elsewhere
#[derive(Debug)]
pub enum BeerPage {
    Aliased { name: String, target: u32 },
    Direct(Box<BeerDetails>),
}

#[derive(Debug)]
pub struct BeerParser {
    title: Css,
    brewery: Css,
    style: Css,
    glassware: Css,
    description: Css,
    retired_badge: Css,
    rating_figures: Css,
    stats: Css,
    availability_rows: Css,
    cell: Css,
    alias: AliasDetector,
}

impl BeerParser {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            title: Css::new("h1")?,
            brewery: Css::new("a[itemprop='brand']")?,
            style: Css::new("a[href^='/beerstyles']")?,
            glassware: Css::new("a[href^='/ShowGlassware.asp']")?,
            description: Css::new("#_description3")?,
            retired_badge: Css::new("span.beertitle2")?,
            rating_figures: Css::new("#_aggregateRating6 div[title]")?,
            stats: Css::new(".stats-container")?,
            availability_rows: Css::new("#_availability tr")?,
            cell: Css::new("td")?,
            alias: AliasDetector::new()?,
        })
    }

    /// Scraped title, or `EntityNotFound` for a missing or placeholder heading
    fn name(&self, html: &Html, id: u32) -> ScrapeResult<String> {
        let name = self
            .title
            .first_in(html)
            .map(|h1| fix_characters(&element_text(h1)))
            .ok_or(ScrapeError::entity_not_found(EntityKind::Beer, id))?;
        if name.replace('\u{2019}', "'").eq_ignore_ascii_case(NOT_FOUND_TITLE) {
            return Err(ScrapeError::entity_not_found(EntityKind::Beer, id));
        }
        Ok(name)
    }

    /// Free-text `LABEL: value` pairs from the stats block
    pub fn misc(&self, html: &Html) -> ScrapeResult<IndexMap<String, MiscValue>> {
        let stats = self.stats.require_in(html, CONTEXT)?;
        let parts: Vec<String> = child_texts(stats)
            .iter()
            .flat_map(|text| {
                strip_nbsp(text)
                    .trim()
                    .split(':')
                    .map(|part| part.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|part| !part.is_empty())
            .collect();

        Ok(parts
            .chunks_exact(2)
            .map(|pair| (symbolize_text(&pair[0]), MiscValue::from_raw(&pair[1])))
            .collect())
    }

    fn brewery(&self, html: &Html, context: &ParseContext<'_>) -> ScrapeResult<Brewery> {
        let link = self.brewery.require_in(html, CONTEXT)?;
        Ok(Brewery::with_name(
            context.session.clone(),
            id_from_link(link, CONTEXT)?,
            fix_characters(&element_text(link)),
        ))
    }

    fn style(&self, html: &Html, context: &ParseContext<'_>) -> ScrapeResult<Style> {
        let link = self.style.require_in(html, CONTEXT)?;
        Ok(Style::with_name(
            context.session.clone(),
            id_from_link(link, CONTEXT)?,
            fix_characters(&element_text(link)),
        ))
    }

    fn glassware(&self, html: &Html) -> Vec<Glassware> {
        self.glassware
            .all_in(html)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                let id = href.rsplit("GWID=").next().map(leading_int)?;
                Some(Glassware {
                    id: u32::try_from(id).ok()?,
                    name: fix_characters(&element_text(link)),
                })
            })
            .collect()
    }

    fn availability(&self, html: &Html) -> IndexMap<String, String> {
        self.availability_rows
            .all_in(html)
            .filter_map(|row| {
                let mut cells = self.cell.all(row).map(|c| fix_characters(&element_text(c)));
                let channel = cells.next().filter(|c| !c.is_empty())?;
                let info = cells.next().unwrap_or_default();
                Some((symbolize_text(channel.trim_end_matches(':')), info))
            })
            .collect()
    }

    fn retired(&self, html: &Html) -> bool {
        self.retired_badge
            .first_in(html)
            .is_some_and(|badge| element_text(badge).contains("RETIRED"))
    }

    fn rating(&self, html: &Html, misc: &IndexMap<String, MiscValue>) -> BeerRating {
        let mut figures = self.rating_figures.all_in(html).filter_map(|div| {
            let title = div.value().attr("title")?;
            title
                .contains("This figure")
                .then(|| leading_float(title.split(':').next().unwrap_or_default()))
        });

        let number = |key: &str| misc.get(key).and_then(MiscValue::as_f64);
        BeerRating {
            overall: figures.next(),
            style: figures.next(),
            ratings: number("ratings").and_then(whole_count),
            weighted_avg: number("weighted_avg"),
            mean: number("mean"),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_count(value: f64) -> Option<u32> {
    let rounded = value.round();
    (rounded >= 0.0 && rounded <= f64::from(u32::MAX)).then_some(rounded as u32)
}

impl PageParser for BeerParser {
    type Output = BeerPage;

    fn parse_document(&self, html: &Html, context: &ParseContext<'_>) -> ScrapeResult<BeerPage> {
        let name = self.name(html, context.id)?;

        if let AliasState::Aliased { target } = self.alias.detect(html)? {
            return Ok(BeerPage::Aliased { name, target });
        }

        debug!("Extracting beer {} ({})", context.id, name);
        let misc = self.misc(html)?;
        let details = BeerDetails {
            canonical_id: context.id,
            brewery: self.brewery(html, context)?,
            style: self.style(html, context)?,
            glassware: self.glassware(html),
            availability: self.availability(html),
            abv: misc.get("abv").and_then(MiscValue::as_f64),
            calories: misc.get("est_calories").and_then(MiscValue::as_f64),
            description: self
                .description
                .first_in(html)
                .map(|d| fix_characters(&element_text(d)))
                .unwrap_or_default(),
            retired: self.retired(html),
            rating: self.rating(html, &misc),
            name,
        };
        Ok(BeerPage::Direct(Box::new(details)))
    }
}
