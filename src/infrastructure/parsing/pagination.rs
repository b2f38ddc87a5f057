//! Multi-page listing aggregation
//!
//! Brewery beer lists, location brewery lists and review pages are split
//! over numbered pages. Pages are fetched one after another, `1..=N`, and
//! their rows concatenated in page order then row order.

use scraper::Html;
use tracing::debug;

use super::text::{Css, element_text, leading_int};
use crate::infrastructure::fetcher::Page;
use crate::infrastructure::parsing_error::ScrapeResult;
use crate::infrastructure::session::Session;

/// How many pages a listing spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    /// Read the highest page number from the first page's pagination control
    Discover,
    /// A known number of pages (at least one is always fetched)
    Fixed(u32),
}

/// Rows from one page, plus page-level data only the first page supplies
#[derive(Debug)]
pub struct ListingPage<H, T> {
    pub header: H,
    pub rows: Vec<T>,
}

impl<T> ListingPage<(), T> {
    pub const fn rows(rows: Vec<T>) -> Self {
        Self { header: (), rows }
    }
}

#[derive(Debug)]
pub struct Paginator {
    pagination: Css,
    page_number: Css,
}

impl Paginator {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            pagination: Css::new(".pagination")?,
            page_number: Css::new("b")?,
        })
    }

    /// Highest page index in the pagination control; 1 when there is none
    pub fn page_count(&self, html: &Html) -> u32 {
        self.pagination
            .first_in(html)
            .and_then(|control| {
                self.page_number
                    .all(control)
                    .filter_map(|b| u32::try_from(leading_int(&element_text(b))).ok())
                    .max()
            })
            .filter(|count| *count > 0)
            .unwrap_or(1)
    }

    fn read_page<H, T, F>(&self, page: &Page, extract: &F) -> ScrapeResult<(u32, ListingPage<H, T>)>
    where
        F: Fn(&Html) -> ScrapeResult<ListingPage<H, T>>,
    {
        let html = page.document();
        let rows = extract(&html)?;
        Ok((self.page_count(&html), rows))
    }
}

/// Fetch every page of a listing and concatenate the rows.
///
/// The header of the first page is returned; later pages' headers are dropped.
pub async fn aggregate<H, T, U, F>(
    session: &Session,
    pages: PageCount,
    page_url: U,
    extract: F,
) -> ScrapeResult<ListingPage<H, T>>
where
    U: Fn(u32) -> String + Send + Sync,
    F: Fn(&Html) -> ScrapeResult<ListingPage<H, T>> + Send + Sync,
    H: Send,
    T: Send,
{
    let paginator = &session.parsers().paginator;

    let first_url = page_url(1);
    let first = session.fetch(&first_url).await?;
    let (discovered, ListingPage { header, mut rows }) = paginator.read_page(&first, &extract)?;
    let total = match pages {
        PageCount::Discover => discovered,
        PageCount::Fixed(count) => count.max(1),
    };
    debug!("Listing {} spans {} page(s)", first_url, total);

    for number in 2..=total {
        let page = session.fetch(&page_url(number)).await?;
        let (_, listing) = paginator.read_page(&page, &extract)?;
        debug!("Page {}/{} yielded {} row(s)", number, total, listing.rows.len());
        rows.extend(listing.rows);
    }

    Ok(ListingPage { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_highest_bold_number() {
        let paginator = Paginator::new().unwrap();
        let html = Html::parse_document(
            r#"<div class="pagination"><b>1</b> <a>2</a> <b>3</b> <b>12</b></div>"#,
        );
        assert_eq!(paginator.page_count(&html), 12);
    }

    #[test]
    fn missing_control_means_single_page() {
        let paginator = Paginator::new().unwrap();
        assert_eq!(paginator.page_count(&Html::parse_document("<table></table>")), 1);
        let empty = Html::parse_document(r#"<div class="pagination"></div>"#);
        assert_eq!(paginator.page_count(&empty), 1);
    }
}
