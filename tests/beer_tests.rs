//! Beer resolution: field access, alias pages and not-found handling

mod common;

use common::{BeerFixture, alias_page, beer_page, client, missing_beer_page, url};
use ratebeer_scraper::{Entity, EntityKind, InMemoryFetcher, Resolvable, ScrapeError};
use rstest::rstest;

#[tokio::test]
async fn fields_resolve_from_one_fetch() {
    let fetcher = InMemoryFetcher::new().with_page(url("/beer/a/1411/"), beer_page(&BeerFixture::default()));
    let beer = client(&fetcher).beer(1411);

    assert_eq!(beer.name(), None);
    assert_eq!(beer.resolved_name().await.unwrap(), "Tennents Lager");
    assert_eq!(beer.brewery().await.unwrap().id(), 55);
    assert_eq!(beer.brewery().await.unwrap().name(), Some("Tennents"));
    assert_eq!(beer.style().await.unwrap().id(), 3);
    assert_eq!(beer.abv().await.unwrap(), Some(4.0));
    assert_eq!(beer.calories().await.unwrap(), Some(120.0));
    assert_eq!(beer.description().await.unwrap(), "A crisp lager.");

    let rating = beer.rating().await.unwrap();
    assert_eq!(rating.overall, Some(12.0));
    assert_eq!(rating.style, Some(34.0));
    assert_eq!(rating.ratings, Some(1204));
    assert_eq!(rating.weighted_avg, Some(2.1));

    let glassware = beer.glassware().await.unwrap();
    assert_eq!(glassware.len(), 1);
    assert_eq!(glassware[0].id, 4);
    assert_eq!(glassware[0].name, "Pint");

    let availability = beer.availability().await.unwrap();
    assert_eq!(availability.get("bottled").map(String::as_str), Some("Common"));
    assert_eq!(availability.get("on_tap").map(String::as_str), Some("Common"));

    assert_eq!(fetcher.requests(), vec![url("/beer/a/1411/")]);
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn retired_flag_follows_badge(#[case] retired: bool) {
    let page = beer_page(&BeerFixture {
        retired,
        ..BeerFixture::default()
    });
    let fetcher = InMemoryFetcher::new().with_page(url("/beer/a/7/"), page);
    let beer = client(&fetcher).beer(7);

    assert_eq!(beer.is_retired().await.unwrap(), retired);
}

#[tokio::test]
async fn full_details_lists_every_field_in_order() {
    let fetcher = InMemoryFetcher::new().with_page(url("/beer/a/1411/"), beer_page(&BeerFixture::default()));
    let beer = client(&fetcher).beer(1411);

    let details = beer.full_details().await.unwrap();
    let keys: Vec<&str> = details.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "id",
            "url",
            "name",
            "brewery",
            "style",
            "glassware",
            "availability",
            "abv",
            "calories",
            "description",
            "retired",
            "rating",
        ]
    );
    assert_eq!(details["id"], 1411);
    assert_eq!(details["url"], url("/beer/a/1411/"));
    assert_eq!(details["brewery"]["id"], 55);
    assert_eq!(details["brewery"]["name"], "Tennents");
}

#[tokio::test]
async fn generic_field_access_matches_typed_accessors() {
    let fetcher = InMemoryFetcher::new().with_page(url("/beer/a/1411/"), beer_page(&BeerFixture::default()));
    let beer = client(&fetcher).beer(1411);

    assert_eq!(beer.field("abv").await.unwrap(), serde_json::json!(4.0));
    assert_eq!(beer.field("retired").await.unwrap(), serde_json::json!(false));
    assert!(matches!(
        beer.field("colour").await,
        Err(ScrapeError::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn alias_is_followed_transparently() {
    let fetcher = InMemoryFetcher::new()
        .with_page(url("/beer/a/1001/"), alias_page("Koenig Ludwig Weissbier", 1002))
        .with_page(
            url("/beer/a/1002/"),
            beer_page(&BeerFixture {
                name: "König Ludwig Weissbier Hell",
                ..BeerFixture::default()
            }),
        );
    let beer = client(&fetcher).beer(1001);

    assert_eq!(beer.resolved_name().await.unwrap(), "Koenig Ludwig Weissbier");
    assert_eq!(beer.canonical_id().await.unwrap(), 1002);
    assert_eq!(beer.id(), 1001);
    assert_eq!(beer.brewery().await.unwrap().id(), 55);
    assert_eq!(fetcher.requests(), vec![url("/beer/a/1001/"), url("/beer/a/1002/")]);

    // Apart from identity and the retained name, the alias reads as its target
    let canonical = client(&fetcher).beer(1002);
    let mut via_alias = beer.full_details().await.unwrap();
    let mut direct = canonical.full_details().await.unwrap();
    assert_eq!(via_alias["name"], "Koenig Ludwig Weissbier");
    assert_eq!(direct["name"], "König Ludwig Weissbier Hell");
    for key in ["id", "url", "name"] {
        via_alias.remove(key);
        direct.remove(key);
    }
    assert_eq!(via_alias, direct);
}

#[tokio::test]
async fn supplied_name_survives_alias() {
    let fetcher = InMemoryFetcher::new()
        .with_page(url("/beer/a/1001/"), alias_page("Koenig Ludwig Weissbier", 1002))
        .with_page(url("/beer/a/1002/"), beer_page(&BeerFixture::default()));
    let beer = client(&fetcher).beer_named(1001, "My Weissbier");

    assert_eq!(beer.name(), Some("My Weissbier"));
    assert_eq!(beer.resolved_name().await.unwrap(), "My Weissbier");
}

#[tokio::test]
async fn endless_alias_chain_is_cut_off() {
    let fetcher = InMemoryFetcher::new();
    for id in 1..=10 {
        fetcher.insert(url(&format!("/beer/a/{id}/")), alias_page("Loop", id + 1));
    }
    let beer = client(&fetcher).beer(1);

    let err = beer.abv().await.unwrap_err();
    assert_eq!(err, ScrapeError::AliasChainTooLong { id: 1, hops: 5 });
    assert_eq!(fetcher.requests().len(), 6);
    assert!(!beer.is_resolved());
}

#[rstest]
#[case::placeholder_page(Some(missing_beer_page()))]
#[case::absent_page(None)]
#[tokio::test]
async fn missing_beer_fails_on_first_access(#[case] page: Option<String>) {
    let fetcher = InMemoryFetcher::new();
    if let Some(page) = page {
        fetcher.insert(url("/beer/a/99999999/"), page);
    }
    let beer = client(&fetcher).beer(99_999_999);

    let err = beer.resolved_name().await.unwrap_err();
    assert_eq!(err, ScrapeError::entity_not_found(EntityKind::Beer, 99_999_999));
    assert!(!beer.is_resolved());
    assert!(beer.full_details().await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn equality_is_by_kind_and_id() {
    let fetcher = InMemoryFetcher::new();
    let rb = client(&fetcher);

    assert_eq!(rb.beer(1411), rb.beer_named(1411, "Tennents Lager"));
    assert_ne!(rb.beer(1411), rb.beer(1412));
    assert_ne!(rb.beer(55).entity_ref(), rb.brewery(55).entity_ref());
    assert_ne!(rb.country(79), rb.region(79));
    assert_eq!(rb.country(79), rb.location("country", 79).unwrap());
}

#[tokio::test]
async fn clones_share_the_resolution() {
    let fetcher = InMemoryFetcher::new().with_page(url("/beer/a/1411/"), beer_page(&BeerFixture::default()));
    let beer = client(&fetcher).beer(1411);
    let twin = beer.clone();

    beer.abv().await.unwrap();
    assert!(twin.is_resolved());
    twin.description().await.unwrap();
    assert_eq!(fetcher.requests().len(), 1);
}
