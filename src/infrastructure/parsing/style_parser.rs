//! Style page, style beer list and styles catalogue extraction

use indexmap::IndexMap;
use scraper::Html;
use tracing::warn;

use super::text::{Css, element_text, fix_characters, id_from_link, leading_int};
use super::{PageParser, ParseContext};
use crate::domain::beer::Beer;
use crate::domain::entity::EntityKind;
use crate::domain::style::Style;
use crate::infrastructure::fetcher::Page;
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

const CONTEXT: &str = "style page";
const LIST_CONTEXT: &str = "style beer list";
const CATALOGUE_CONTEXT: &str = "styles page";

/// Fields read from a style's own page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePage {
    pub name: String,
    pub description: String,
    pub glassware: Vec<String>,
}

#[derive(Debug)]
pub struct StyleParser {
    root: Css,
    catalogue_root: Css,
    title: Css,
    description: Css,
    glassware: Css,
    row: Css,
    cell: Css,
    link: Css,
    category: Css,
    group: Css,
}

impl StyleParser {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            root: Css::new(".container-fluid")?,
            catalogue_root: Css::new("div.container-fluid")?,
            title: Css::new("h1")?,
            description: Css::new("#styleDescription")?,
            glassware: Css::new(".glassblurb")?,
            row: Css::new("tr")?,
            cell: Css::new("td")?,
            link: Css::new("a")?,
            category: Css::new("h3")?,
            group: Css::new(".styleGroup")?,
        })
    }

    /// Top beers for a style, keyed by their listed number. The first row is headings.
    pub fn beer_list(&self, page: &Page, context: &ParseContext<'_>) -> ScrapeResult<IndexMap<u32, Beer>> {
        let html = page.document();
        let mut beers = IndexMap::new();

        for row in self.row.all_in(&html).skip(1) {
            let cells: Vec<_> = self.cell.all(row).collect();
            let [number_cell, beer_cell, ..] = cells.as_slice() else {
                continue;
            };
            let link = self.link.require(*beer_cell, LIST_CONTEXT)?;
            let Ok(number) = u32::try_from(leading_int(&element_text(*number_cell))) else {
                warn!("Skipping style {} row without a number", context.id);
                continue;
            };
            let beer = Beer::with_name(
                context.session.clone(),
                id_from_link(link, LIST_CONTEXT)?,
                fix_characters(&element_text(*beer_cell)),
            );
            beers.insert(number, beer);
        }
        Ok(beers)
    }

    /// Styles page: the Nth `h3` category applies to every link in the Nth style group
    pub fn style_list(&self, page: &Page, context: &ParseContext<'_>) -> ScrapeResult<Vec<Style>> {
        let html = page.document();
        let root = self.catalogue_root.require_in(&html, CATALOGUE_CONTEXT)?;

        let categories: Vec<String> = self
            .category
            .all(root)
            .map(|h3| fix_characters(&element_text(h3)))
            .collect();

        let mut styles = Vec::new();
        for (index, group) in self.group.all(root).enumerate() {
            let category = categories.get(index).cloned();
            for link in self.link.all(group) {
                styles.push(Style::categorized(
                    context.session.clone(),
                    id_from_link(link, CATALOGUE_CONTEXT)?,
                    fix_characters(&element_text(link)),
                    category.clone(),
                ));
            }
        }
        Ok(styles)
    }
}

impl PageParser for StyleParser {
    type Output = StylePage;

    fn parse_document(&self, html: &Html, context: &ParseContext<'_>) -> ScrapeResult<StylePage> {
        let root = self
            .root
            .first_in(html)
            .ok_or(ScrapeError::entity_not_found(EntityKind::Style, context.id))?;

        Ok(StylePage {
            name: fix_characters(&element_text(self.title.require(root, CONTEXT)?)),
            description: self
                .description
                .first(root)
                .map(|d| element_text(d).trim().to_string())
                .unwrap_or_default(),
            glassware: self
                .glassware
                .all(root)
                .map(|g| element_text(g).trim().to_string())
                .collect(),
        })
    }
}
