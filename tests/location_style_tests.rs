//! Countries, regions and styles

mod common;

use common::{client, location_page, url};
use ratebeer_scraper::domain::{BreweryStatus, HIDDEN_STYLE_IDS};
use ratebeer_scraper::{EntityKind, InMemoryFetcher, LocationKind, Resolvable, ScrapeError};

#[tokio::test]
async fn country_lists_active_then_closed_breweries() {
    let fetcher = InMemoryFetcher::new().with_page(
        url("/breweries/a/0/79/"),
        location_page("Scotland", &[(55, "Tennents"), (56, "Drygate")], &[(57, "Old Works")]),
    );
    let country = client(&fetcher).country(79);

    assert_eq!(country.location_kind(), LocationKind::Country);
    assert_eq!(country.resolved_name().await.unwrap(), "Scotland");
    assert_eq!(country.num_breweries().await.unwrap(), 2);

    let top: Vec<(u32, u32)> = country
        .top_styles()
        .await
        .unwrap()
        .iter()
        .map(|top| (top.style.id(), top.count))
        .collect();
    assert_eq!(top, vec![(3, 2), (24, 1)]);
    let details = country.full_details().await.unwrap();
    assert_eq!(details["top_styles"][0]["style"]["name"], "Pale Lager");
    assert_eq!(details["top_styles"][0]["count"], 2);

    let breweries = country.breweries().await.unwrap();
    let ids: Vec<u32> = breweries.iter().map(|b| b.id()).collect();
    assert_eq!(ids, vec![55, 56, 57]);

    let active = breweries[0].listing().unwrap();
    assert_eq!(breweries[0].name(), Some("Tennents"));
    assert_eq!(active.status, BreweryStatus::Active);
    assert_eq!(active.location, "Glasgow");
    assert_eq!(active.brewery_type, "Microbrewery");
    assert_eq!(active.established, Some(1885));

    let closed = breweries[2].listing().unwrap();
    assert_eq!(closed.status, BreweryStatus::OutOfBusiness);
    assert_eq!(closed.location, "Leith");
    assert_eq!(closed.established, None);
}

#[tokio::test]
async fn region_pages_are_concatenated() {
    let first = location_page("Bavaria", &[(1, "One")], &[])
        .replace("<div id=\"brewerCover\">", "<div class=\"pagination\"><b>1</b><b>2</b></div><div id=\"brewerCover\">");
    let fetcher = InMemoryFetcher::new()
        .with_page(url("/breweries/a/12/0/"), first)
        .with_page(url("/breweries/a/12/0/?page=2"), location_page("Bavaria", &[(2, "Two")], &[]));
    let region = client(&fetcher).region(12);

    let ids: Vec<u32> = region.breweries().await.unwrap().iter().map(|b| b.id()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(region.resolved_name().await.unwrap(), "Bavaria");
    assert_eq!(fetcher.requests().len(), 2);
}

#[tokio::test]
async fn unnamed_location_is_not_found() {
    let fetcher = InMemoryFetcher::new().with_page(url("/breweries/a/4/0/"), location_page("n/a", &[], &[]));
    let region = client(&fetcher).region(4);

    assert_eq!(
        region.resolved_name().await.unwrap_err(),
        ScrapeError::entity_not_found(EntityKind::Region, 4)
    );
    assert!(!region.is_resolved());
}

#[tokio::test]
async fn location_kind_must_be_known() {
    let fetcher = InMemoryFetcher::new();
    let rb = client(&fetcher);

    assert_eq!(rb.location("region", 4).unwrap().location_kind(), LocationKind::Region);
    assert!(matches!(
        rb.location("continent", 4),
        Err(ScrapeError::InvalidArgument { .. })
    ));
}

fn style_page() -> String {
    r#"<html><body><div class="container-fluid">
    <h1>Pale  Lager</h1>
    <div id="styleDescription"> Light, crisp lagers. </div>
    <span class="glassblurb">Pint</span><span class="glassblurb">Stange</span>
    </div></body></html>"#
        .to_string()
}

fn style_beers_page() -> String {
    r#"<table><tr><th>#</th><th>Name</th></tr>
    <tr><td>1</td><td><a href="/beer/first/101/">First Lager</a></td></tr>
    <tr><td>2</td><td><a href="/beer/second/102/">Second Lager</a></td></tr>
    </table>"#
        .to_string()
}

#[tokio::test]
async fn style_reads_page_and_top_beers() {
    let fetcher = InMemoryFetcher::new()
        .with_page(url("/beerstyles/a/3/"), style_page())
        .with_page(url("/ajax/top-beer-by-style.asp?style=3"), style_beers_page());
    let style = client(&fetcher).style(3);

    assert_eq!(style.resolved_name().await.unwrap(), "Pale Lager");
    assert_eq!(style.description().await.unwrap(), "Light, crisp lagers.");
    assert_eq!(style.glassware().await.unwrap(), ["Pint", "Stange"]);

    let beers = style.beers().await.unwrap();
    assert_eq!(beers.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(beers[&2].id(), 102);
    assert_eq!(beers[&2].name(), Some("Second Lager"));

    let details = style.full_details().await.unwrap();
    assert_eq!(details["category"], serde_json::Value::Null);
}

#[tokio::test]
async fn missing_style_is_not_found() {
    let fetcher = InMemoryFetcher::new().with_page(url("/beerstyles/a/999/"), "<html><body></body></html>");
    let style = client(&fetcher).style(999);

    assert_eq!(
        style.description().await.unwrap_err(),
        ScrapeError::entity_not_found(EntityKind::Style, 999)
    );
}

#[tokio::test]
async fn styles_catalogue_tags_categories() {
    let page = r#"<html><body><div class="container-fluid">
        <h3>Ales</h3><div class="styleGroup"><a href="/beerstyles/bitter/1/">Bitter</a><a href="/beerstyles/mild/2/">Mild</a></div>
        <h3>Lagers</h3><div class="styleGroup"><a href="/beerstyles/pale-lager/3/">Pale Lager</a></div>
        </div></body></html>"#;
    let fetcher = InMemoryFetcher::new().with_page(url("/beerstyles/"), page);
    let rb = client(&fetcher);

    let styles = rb.all_styles(false).await.unwrap();
    let summary: Vec<(u32, Option<&str>, Option<&str>)> = styles
        .iter()
        .map(|s| (s.id(), s.name(), s.category()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, Some("Bitter"), Some("Ales")),
            (2, Some("Mild"), Some("Ales")),
            (3, Some("Pale Lager"), Some("Lagers")),
        ]
    );

    let with_hidden = rb.all_styles(true).await.unwrap();
    assert_eq!(with_hidden.len(), 3 + HIDDEN_STYLE_IDS.len());
    assert_eq!(with_hidden.last().map(|s| s.id()), HIDDEN_STYLE_IDS.last().copied());
    assert!(with_hidden[3..].iter().all(|s| s.name().is_none()));
}
