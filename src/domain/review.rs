//! Beer reviews
//!
//! Reviews are not lazily resolved entities: each one is built complete from
//! a review page and carries a reference to the beer it reviews.

use chrono::NaiveDate;
use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use super::beer::Beer;
use super::entity::EntityKind;
use crate::infrastructure::config::defaults::REVIEWS_PER_PAGE;
use crate::infrastructure::parsing::pagination::aggregate;
use crate::infrastructure::parsing::{ListingPage, PageCount};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Sort orders the review pages offer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOrder {
    #[default]
    MostRecent,
    TopRaters,
    HighestScore,
}

impl ReviewOrder {
    /// Path segment selecting this order on the review pages
    pub const fn url_suffix(self) -> &'static str {
        match self {
            Self::MostRecent => "1",
            Self::TopRaters => "2",
            Self::HighestScore => "3",
        }
    }
}

impl FromStr for ReviewOrder {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "most_recent" => Ok(Self::MostRecent),
            "top_raters" => Ok(Self::TopRaters),
            "highest_score" => Ok(Self::HighestScore),
            other => Err(ScrapeError::invalid_argument(format!("unknown ordering: {other}"))),
        }
    }
}

/// Per-axis scores, kept as the fractions the site prints (`7/10`, `4/5`).
///
/// Fractions are never reduced, so `4/5` and `8/10` stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RatingBreakdown {
    pub overall: Ratio<u32>,
    pub aroma: Ratio<u32>,
    pub appearance: Ratio<u32>,
    pub taste: Ratio<u32>,
    pub palate: Ratio<u32>,
}

impl RatingBreakdown {
    pub const AROMA_SCALE: u32 = 10;
    pub const APPEARANCE_SCALE: u32 = 5;
    pub const TASTE_SCALE: u32 = 10;
    pub const PALATE_SCALE: u32 = 5;
    pub const OVERALL_SCALE: u32 = 20;

    /// Build from the numerators, each over its axis' fixed scale
    pub const fn from_scores(aroma: u32, appearance: u32, taste: u32, palate: u32, overall: u32) -> Self {
        Self {
            overall: Ratio::new_raw(overall, Self::OVERALL_SCALE),
            aroma: Ratio::new_raw(aroma, Self::AROMA_SCALE),
            appearance: Ratio::new_raw(appearance, Self::APPEARANCE_SCALE),
            taste: Ratio::new_raw(taste, Self::TASTE_SCALE),
            palate: Ratio::new_raw(palate, Self::PALATE_SCALE),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub beer: Beer,
    pub reviewer: String,
    pub reviewer_rank: u32,
    /// Empty when the reviewer gave no location
    pub location: String,
    pub date: NaiveDate,
    pub rating: f64,
    pub rating_breakdown: RatingBreakdown,
    pub comment: String,
}

impl Review {
    pub fn builder(beer: Beer) -> ReviewBuilder {
        ReviewBuilder::new(beer)
    }

    /// Up to `limit` reviews of `beer` in the given order.
    ///
    /// Pages hold ten reviews each, so `ceil(limit / 10)` pages are read and
    /// the concatenation is cut to `limit`.
    pub async fn retrieve(beer: &Beer, order: ReviewOrder, limit: usize) -> ScrapeResult<Vec<Self>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let session = beer.session();
        let parser = &session.parsers().review;
        let pages = u32::try_from(limit.div_ceil(REVIEWS_PER_PAGE))
            .map_err(|_| ScrapeError::invalid_argument(format!("review limit too large: {limit}")))?;
        debug!("Reading {} review page(s) for beer {}", pages, beer.id());

        let listing = aggregate(
            session,
            PageCount::Fixed(pages),
            |number| session.urls().beer_reviews(beer.id(), order, number),
            |html| parser.reviews(html, beer).map(ListingPage::rows),
        )
        .await
        .map_err(|e| e.for_entity(EntityKind::Beer, beer.id()))?;

        let mut reviews = listing.rows;
        reviews.truncate(limit);
        info!("📝 Retrieved {} review(s) of beer {}", reviews.len(), beer.id());
        Ok(reviews)
    }
}

/// Same reviewer, date, beer and comment
impl PartialEq for Review {
    fn eq(&self, other: &Self) -> bool {
        self.reviewer == other.reviewer
            && self.date == other.date
            && self.beer == other.beer
            && self.comment == other.comment
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Review of {} - {} on {}>", self.beer, self.reviewer, self.date)
    }
}

/// Assembles a [`Review`] field by field; every field is required
#[derive(Debug, Clone)]
pub struct ReviewBuilder {
    beer: Beer,
    reviewer: Option<String>,
    reviewer_rank: Option<u32>,
    location: Option<String>,
    date: Option<NaiveDate>,
    rating: Option<f64>,
    rating_breakdown: Option<RatingBreakdown>,
    comment: Option<String>,
}

impl ReviewBuilder {
    pub const fn new(beer: Beer) -> Self {
        Self {
            beer,
            reviewer: None,
            reviewer_rank: None,
            location: None,
            date: None,
            rating: None,
            rating_breakdown: None,
            comment: None,
        }
    }

    #[must_use]
    pub fn reviewer(mut self, name: impl Into<String>, rank: u32) -> Self {
        self.reviewer = Some(name.into());
        self.reviewer_rank = Some(rank);
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub const fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub const fn rating(mut self, total: f64, breakdown: RatingBreakdown) -> Self {
        self.rating = Some(total);
        self.rating_breakdown = Some(breakdown);
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn build(self) -> ScrapeResult<Review> {
        fn required<T>(value: Option<T>, name: &str) -> ScrapeResult<T> {
            value.ok_or_else(|| ScrapeError::invalid_argument(format!("{name} parameter required")))
        }

        Ok(Review {
            reviewer: required(self.reviewer, "reviewer")?,
            reviewer_rank: required(self.reviewer_rank, "reviewer_rank")?,
            location: required(self.location, "location")?,
            date: required(self.date, "date")?,
            rating: required(self.rating, "rating")?,
            rating_breakdown: required(self.rating_breakdown, "rating_breakdown")?,
            comment: required(self.comment, "comment")?,
            beer: self.beer,
        })
    }
}
