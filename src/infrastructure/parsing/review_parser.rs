//! Review page extraction
//!
//! A review page lists reviews as a flat run of sibling elements: a rating
//! line, a reviewer line and the comment, repeated. Both lines are matched
//! against fixed patterns; anything else is a parse error.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use scraper::Html;
use tracing::{debug, trace};

use super::text::{Css, child_elements, element_text, strip_nbsp};
use crate::domain::beer::Beer;
use crate::domain::review::{RatingBreakdown, Review};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

const CONTEXT: &str = "review page";

/// Markers of ad slots interleaved with the reviews
const AD_PLACEHOLDER: &str = "googleFillSlot";

const RATING_PATTERN: &str = r"(?s)^(?P<total>\d+(?:\.\d+)?).+AROMA\s(?P<aroma>\d+)/10.+APPEARANCE\s(?P<appearance>\d+)/5.+TASTE\s(?P<taste>\d+)/10.+PALATE\s(?P<palate>\d+)/5.+OVERALL\s(?P<overall>\d+)/20$";

const REVIEWER_PATTERN: &str = r"^(?P<name>.+)\s\((?P<rank>\d+)\)\s-\s?(?P<location>.+)?\s?-\s(?P<date>.+)$";

/// Formats review dates appear in, after month names are title-cased
const DATE_FORMATS: [&str; 4] = ["%b %d, %Y", "%B %d, %Y", "%m/%d/%Y", "%Y-%m-%d"];

/// Rating line, reviewer line and comment of one review
pub type ReviewChunk = [String; 3];

#[derive(Debug)]
pub struct ReviewParser {
    container: Css,
    div: Css,
    rating: Regex,
    reviewer: Regex,
}

impl ReviewParser {
    pub fn new() -> ScrapeResult<Self> {
        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| ScrapeError::invalid_argument(format!("{name} pattern: {e}")))
        };
        Ok(Self {
            container: Css::new(".reviews-container")?,
            div: Css::new("div")?,
            rating: compile("rating", RATING_PATTERN)?,
            reviewer: compile("reviewer", REVIEWER_PATTERN)?,
        })
    }

    /// Every review on one page
    pub fn reviews(&self, html: &Html, beer: &Beer) -> ScrapeResult<Vec<Review>> {
        let reviews = self
            .chunks(html)?
            .iter()
            .map(|chunk| self.parse_chunk(beer, chunk))
            .collect::<ScrapeResult<Vec<_>>>()?;
        debug!("Parsed {} review(s) of beer {}", reviews.len(), beer.id());
        Ok(reviews)
    }

    /// Split a page into review chunks.
    ///
    /// Empty fragments and ad slots are dropped before grouping; a trailing
    /// group of fewer than three fragments cannot form a review.
    pub fn chunks(&self, html: &Html) -> ScrapeResult<Vec<ReviewChunk>> {
        let container = self.container.require_in(html, CONTEXT)?;
        // First div nested in another div inside the container
        let Some(block) = self.div.first(container).and_then(|outer| self.div.first(outer)) else {
            return Ok(Vec::new());
        };

        let fragments: Vec<String> = child_elements(block)
            .filter(|e| matches!(e.value().name(), "div" | "small"))
            .map(|e| element_text(e).trim().to_string())
            .filter(|text| !text.is_empty() && !text.contains(AD_PLACEHOLDER))
            .collect();
        trace!("Review block holds {} fragment(s)", fragments.len());

        let groups = fragments.chunks_exact(3);
        if !groups.remainder().is_empty() {
            return Err(ScrapeError::invalid_argument(format!(
                "incomplete review: {} trailing fragment(s)",
                groups.remainder().len()
            )));
        }
        Ok(groups
            .map(|group| [group[0].clone(), group[1].clone(), group[2].clone()])
            .collect())
    }

    pub fn parse_chunk(&self, beer: &Beer, chunk: &ReviewChunk) -> ScrapeResult<Review> {
        let [rating_line, reviewer_line, comment] = chunk;

        let rating = self
            .rating
            .captures(rating_line)
            .ok_or_else(|| ScrapeError::parse("rating line", rating_line))?;
        let score = |axis: &str| capture_number::<u32>(&rating, axis, rating_line);
        let breakdown = RatingBreakdown::from_scores(
            score("aroma")?,
            score("appearance")?,
            score("taste")?,
            score("palate")?,
            score("overall")?,
        );
        let total = capture_number::<f64>(&rating, "total", rating_line)?;

        let reviewer_line = strip_nbsp(reviewer_line);
        let reviewer = self
            .reviewer
            .captures(&reviewer_line)
            .ok_or_else(|| ScrapeError::parse("reviewer line", &reviewer_line))?;
        let rank = capture_number::<u32>(&reviewer, "rank", &reviewer_line)?;
        let date = parse_review_date(&reviewer["date"])?;
        let location = reviewer
            .name("location")
            .map(|m| m.as_str().trim())
            .unwrap_or_default();

        Review::builder(beer.clone())
            .reviewer(reviewer["name"].trim(), rank)
            .location(location)
            .date(date)
            .rating(total, breakdown)
            .comment(comment.trim())
            .build()
    }
}

fn capture_number<T: std::str::FromStr>(captures: &Captures<'_>, group: &str, line: &str) -> ScrapeResult<T> {
    captures
        .name(group)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| ScrapeError::parse(group, line))
}

/// Parse the free-text date of a reviewer line (`SEP 8, 2013`, `9/8/2013`, ...)
pub fn parse_review_date(text: &str) -> ScrapeResult<NaiveDate> {
    let normalized = text
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
        .ok_or_else(|| ScrapeError::parse("review date", text))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}
