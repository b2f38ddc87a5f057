//! Text clean-up helpers shared by every page parser
//!
//! RateBeer text is full of non-breaking spaces, stray cp1252 bytes and
//! numbers embedded in labels ("ABV: 4.1%"). These helpers normalise it.

use scraper::element_ref::Select;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};

use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

pub const NBSP: char = '\u{a0}';

/// Compile a CSS selector, reporting the selector text on failure
pub fn selector(css: &str) -> ScrapeResult<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::invalid_selector(css, &e.to_string()))
}

/// A compiled selector that remembers its source text for error messages
#[derive(Debug, Clone)]
pub struct Css {
    css: &'static str,
    selector: Selector,
}

impl Css {
    pub fn new(css: &'static str) -> ScrapeResult<Self> {
        Ok(Self {
            css,
            selector: selector(css)?,
        })
    }

    pub const fn as_str(&self) -> &'static str {
        self.css
    }

    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.select(&self.selector).next()
    }

    pub fn first_in<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        self.first(html.root_element())
    }

    pub fn all<'a, 'b>(&'b self, scope: ElementRef<'a>) -> Select<'a, 'b> {
        scope.select(&self.selector)
    }

    pub fn all_in<'a, 'b>(&'b self, html: &'a Html) -> Select<'a, 'b> {
        self.all(html.root_element())
    }

    /// First match under `scope`, or an extraction error naming the selector
    pub fn require<'a>(&self, scope: ElementRef<'a>, context: &str) -> ScrapeResult<ElementRef<'a>> {
        self.first(scope)
            .ok_or_else(|| ScrapeError::missing(context, self.css))
    }

    pub fn require_in<'a>(&self, html: &'a Html, context: &str) -> ScrapeResult<ElementRef<'a>> {
        self.require(html.root_element(), context)
    }

    /// Whether `element` itself matches
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.selector.matches(element)
    }
}

/// Replace non-breaking spaces with plain spaces
pub fn strip_nbsp(text: &str) -> String {
    text.replace(NBSP, " ")
}

/// Clean a display string scraped from the site.
///
/// Fixes stray cp1252 characters, collapses runs of spaces and trims.
pub fn fix_characters(text: &str) -> String {
    let replaced = strip_nbsp(text)
        .replace('\u{93}', "ž")
        .replace('\u{92}', "'")
        .replace('\u{96}', "–");
    replaced
        .split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Turn a free-text label into a symbolic key: `"Est. Calories"` -> `"est_calories"`
pub fn symbolize_text(text: &str) -> String {
    text.to_lowercase().replace(' ', "_").replace('.', "")
}

/// Parse the leading decimal number of `text`, `0.0` when there is none
pub fn leading_float(text: &str) -> f64 {
    let number = numeric_prefix(text, true);
    number.parse().unwrap_or(0.0)
}

/// Parse the leading integer of `text`, `0` when there is none
pub fn leading_int(text: &str) -> i64 {
    numeric_prefix(text, false).parse().unwrap_or(0)
}

/// Longest `[+-]digits[.digits]` prefix after leading whitespace
fn numeric_prefix(text: &str, allow_fraction: bool) -> &str {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if allow_fraction
        && bytes.get(end) == Some(&b'.')
        && bytes.get(end + 1).is_some_and(u8::is_ascii_digit)
    {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if end == digits_start {
        return "";
    }
    &trimmed[..end]
}

/// Leading integer as an optional count (`None` when absent or not positive)
pub fn count(text: &str) -> Option<u32> {
    u32::try_from(leading_int(&text.replace(',', "")))
        .ok()
        .filter(|n| *n > 0)
}

/// Leading float as an optional value (`None` when absent or zero)
pub fn non_zero_float(text: &str) -> Option<f64> {
    let value = leading_float(&text.replace(',', ""));
    (value != 0.0).then_some(value)
}

/// A value from a free-text `key: value` listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MiscValue {
    Number(f64),
    Text(String),
}

impl MiscValue {
    /// Numeric unless the numeric parse is exactly zero, which means the
    /// value was really text (e.g. "-" or "Seasonal"). Thousands separators
    /// are ignored.
    pub fn from_raw(raw: &str) -> Self {
        let value = leading_float(&raw.replace(',', ""));
        if value == 0.0 {
            Self::Text(raw.to_string())
        } else {
            Self::Number(value)
        }
    }

    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// Numeric id at the end of a link: `/beer/tennents-lager/1411/` -> `1411`
pub fn id_from_href(href: &str) -> Option<u32> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.split('/')
        .rfind(|segment| !segment.is_empty())
        .and_then(|segment| u32::try_from(leading_int(segment)).ok())
        .filter(|id| *id > 0)
}

/// Id of an anchor element, failing with an extraction error
pub fn id_from_link(link: ElementRef<'_>, context: &str) -> ScrapeResult<u32> {
    let href = link
        .value()
        .attr("href")
        .ok_or_else(|| ScrapeError::extraction(context, "link has no href"))?;
    id_from_href(href)
        .ok_or_else(|| ScrapeError::extraction(context, format!("no id in link '{href}'")))
}

/// All descendant text of an element, concatenated
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of each direct child node (text nodes and elements alike), in order
pub fn child_texts(element: ElementRef<'_>) -> Vec<String> {
    element
        .children()
        .map(|child| match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                text.to_string()
            }
            Node::Element(_) => ElementRef::wrap(child).map(element_text).unwrap_or_default(),
            _ => String::new(),
        })
        .collect()
}

/// Direct child elements of an element
pub fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.children().filter_map(ElementRef::wrap)
}

/// Text of direct child text nodes only (element children are skipped)
pub fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                Some(text.to_string())
            }
            _ => None,
        })
        .collect()
}
