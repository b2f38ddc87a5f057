//! Review parsing and review-page aggregation

mod common;

use chrono::NaiveDate;
use common::{client, review_page, url};
use num_rational::Ratio;
use ratebeer_scraper::domain::RatingBreakdown;
use ratebeer_scraper::{InMemoryFetcher, ReviewOrder, ScrapeError};
use rstest::rstest;

fn specimen() -> [String; 3] {
    [
        "4.00 AROMA 7/10 APPEARANCE 4/5 TASTE 9/10 PALATE 3/5 OVERALL 20/20".to_string(),
        "Johnny Tester (1234) - The Moon - SEP 8, 2013".to_string(),
        "Specimen review.".to_string(),
    ]
}

#[test]
fn specimen_chunk_parses_exactly() {
    let fetcher = InMemoryFetcher::new();
    let rb = client(&fetcher);
    let beer = rb.beer(1411);
    let parser = &rb.session().parsers().review;

    let review = parser.parse_chunk(&beer, &specimen()).unwrap();
    assert_eq!(review.beer, beer);
    assert_eq!(review.reviewer, "Johnny Tester");
    assert_eq!(review.reviewer_rank, 1234);
    assert_eq!(review.location, "The Moon");
    assert_eq!(review.date, NaiveDate::from_ymd_opt(2013, 9, 8).unwrap());
    assert!((review.rating - 4.0).abs() < f64::EPSILON);
    assert_eq!(review.comment, "Specimen review.");

    let breakdown = review.rating_breakdown;
    let parts = |r: Ratio<u32>| (*r.numer(), *r.denom());
    assert_eq!(parts(breakdown.overall), (20, 20));
    assert_eq!(parts(breakdown.aroma), (7, 10));
    assert_eq!(parts(breakdown.appearance), (4, 5));
    assert_eq!(parts(breakdown.taste), (9, 10));
    assert_eq!(parts(breakdown.palate), (3, 5));
    assert_eq!(breakdown, RatingBreakdown::from_scores(7, 4, 9, 3, 20));
}

#[test]
fn reviewer_without_location_is_allowed() {
    let fetcher = InMemoryFetcher::new();
    let rb = client(&fetcher);
    let parser = &rb.session().parsers().review;
    let mut chunk = specimen();
    chunk[1] = "Johnny Tester (1234) - - SEP 8, 2013".to_string();

    let review = parser.parse_chunk(&rb.beer(1411), &chunk).unwrap();
    assert_eq!(review.location, "");
    assert_eq!(review.reviewer, "Johnny Tester");
}

#[rstest]
#[case::rating_out_of_order(0, "4.00 TASTE 9/10 AROMA 7/10 APPEARANCE 4/5 PALATE 3/5 OVERALL 20/20")]
#[case::rating_wrong_scale(0, "4.00 AROMA 7/5 APPEARANCE 4/5 TASTE 9/10 PALATE 3/5 OVERALL 20/20")]
#[case::reviewer_without_rank(1, "Johnny Tester - The Moon - SEP 8, 2013")]
#[case::reviewer_without_date(1, "Johnny Tester (1234) - The Moon")]
fn malformed_lines_are_parse_errors(#[case] line: usize, #[case] text: &str) {
    let fetcher = InMemoryFetcher::new();
    let rb = client(&fetcher);
    let parser = &rb.session().parsers().review;
    let mut chunk = specimen();
    chunk[line] = text.to_string();

    assert!(matches!(
        parser.parse_chunk(&rb.beer(1411), &chunk),
        Err(ScrapeError::Parse { .. })
    ));
}

#[tokio::test]
async fn limit_sets_page_count_and_truncates() {
    let fetcher = InMemoryFetcher::new()
        .with_page(url("/beer/a/1411/1/1/"), review_page(1..=10))
        .with_page(url("/beer/a/1411/1/2/"), review_page(11..=20))
        .with_page(url("/beer/a/1411/1/3/"), review_page(21..=30));
    let rb = client(&fetcher);

    let reviews = rb.reviews(1411, ReviewOrder::MostRecent, 25).await.unwrap();
    assert_eq!(reviews.len(), 25);
    assert_eq!(reviews[0].comment, "Review number 1.");
    assert_eq!(reviews[10].comment, "Review number 11.");
    assert_eq!(reviews[24].comment, "Review number 25.");
    assert_eq!(
        fetcher.requests(),
        vec![
            url("/beer/a/1411/1/1/"),
            url("/beer/a/1411/1/2/"),
            url("/beer/a/1411/1/3/"),
        ]
    );
}

#[tokio::test]
async fn sort_order_selects_the_page_variant() {
    let fetcher = InMemoryFetcher::new().with_page(url("/beer/a/1411/3/1/"), review_page(1..=10));
    let beer = client(&fetcher).beer(1411);

    let reviews = beer.reviews(ReviewOrder::HighestScore, 4).await.unwrap();
    assert_eq!(reviews.len(), 4);
    assert_eq!(fetcher.requests(), vec![url("/beer/a/1411/3/1/")]);
}

#[tokio::test]
async fn fewer_reviews_than_requested() {
    let fetcher = InMemoryFetcher::new()
        .with_page(url("/beer/a/9/1/1/"), review_page(1..=10))
        .with_page(url("/beer/a/9/1/2/"), review_page(11..=13));
    let rb = client(&fetcher);

    let reviews = rb.reviews(9, ReviewOrder::MostRecent, 20).await.unwrap();
    assert_eq!(reviews.len(), 13);
}

#[tokio::test]
async fn reviews_of_a_missing_beer_are_not_found() {
    let fetcher = InMemoryFetcher::new();
    let rb = client(&fetcher);

    let err = rb.reviews(404, ReviewOrder::TopRaters, 10).await.unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn equal_reviews_share_reviewer_date_beer_and_comment() {
    let fetcher = InMemoryFetcher::new();
    let rb = client(&fetcher);
    let parser = &rb.session().parsers().review;

    let first = parser.parse_chunk(&rb.beer(1411), &specimen()).unwrap();
    let mut rescored = specimen();
    rescored[0] = "3.10 AROMA 6/10 APPEARANCE 3/5 TASTE 6/10 PALATE 3/5 OVERALL 13/20".to_string();
    let second = parser.parse_chunk(&rb.beer(1411), &rescored).unwrap();
    let other_beer = parser.parse_chunk(&rb.beer(1412), &specimen()).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other_beer);
}
