//! Shared fixtures for the integration tests
//!
//! Pages are small hand-written documents carrying only the markup the
//! extraction rules read.

#![allow(dead_code)]

use std::sync::Arc;

use ratebeer_scraper::{InMemoryFetcher, RateBeer, ScraperConfig};

pub const BASE: &str = "https://www.ratebeer.com";

pub fn client(fetcher: &InMemoryFetcher) -> RateBeer {
    RateBeer::new(Arc::new(fetcher.clone()), &ScraperConfig::default()).unwrap()
}

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

pub struct BeerFixture<'a> {
    pub name: &'a str,
    pub brewery: (u32, &'a str),
    pub style: (u32, &'a str),
    pub retired: bool,
}

impl Default for BeerFixture<'_> {
    fn default() -> Self {
        Self {
            name: "Tennents Lager",
            brewery: (55, "Tennents"),
            style: (3, "Pale Lager"),
            retired: false,
        }
    }
}

pub fn beer_page(beer: &BeerFixture<'_>) -> String {
    let badge = if beer.retired {
        r#"<span class="beertitle2">RETIRED</span>"#
    } else {
        ""
    };
    format!(
        r#"<html><body>
        <h1>{name}</h1>{badge}
        <a itemprop="brand" href="/brewers/brewery/{brewery_id}/">{brewery}</a>
        <a href="/beerstyles/style/{style_id}/">{style}</a>
        <a href="/ShowGlassware.asp?GWID=4">Pint</a>
        <div id="_aggregateRating6"><div title="12: This figure is the overall percentile">12</div><div title="34: This figure is the style percentile">34</div></div>
        <div class="stats-container"><small>RATINGS: </small><big>1,204</big><small>WEIGHTED AVG: 2.1</small><small>MEAN: 2.05</small><small>ABV: 4%</small><small>EST. CALORIES: 120</small></div>
        <div id="_description3">A  crisp lager.</div>
        <table id="_availability"><tr><td>Bottled:</td><td>Common</td></tr><tr><td>On Tap:</td><td>Common</td></tr></table>
        </body></html>"#,
        name = beer.name,
        brewery_id = beer.brewery.0,
        brewery = beer.brewery.1,
        style_id = beer.style.0,
        style = beer.style.1,
    )
}

pub fn alias_page(name: &str, target: u32) -> String {
    format!(
        r#"<html><body><h1>{name}</h1>
        <div class="row columns-container"><div class="col-sm-8">
        Also known as <a href="/beer/aliased/{target}/">the original</a>.
        Proceed to the aliased beer...
        </div></div></body></html>"#
    )
}

pub fn missing_beer_page() -> String {
    "<html><body><h1>we didn't find this beer</h1></body></html>".to_string()
}

pub fn brewery_page(name: &str, address: &[(&str, &str)]) -> String {
    let spans: String = address
        .iter()
        .map(|(tag, value)| format!(r#"<span itemprop="{tag}">{value}</span> "#))
        .collect();
    format!(
        r#"<html><body><div itemtype="http://schema.org/LocalBusiness">
        <div class="title"><h1>{name}</h1></div>
        <div>Microbrewery</div>
        <div itemprop="address"><b>{spans}</b></div>
        <span itemprop="telephone">+44 141 552 6552</span>
        </div></body></html>"#
    )
}

pub fn removed_brewery_page(id: u32) -> String {
    format!(
        "<html><body><p>This brewer, ID#{id}, is no longer in the database.</p><p> RateBeer Home</p></body></html>"
    )
}

/// A beer row of a brewery's beer list
pub fn beer_row(id: u32, name: &str) -> String {
    format!(
        r#"<tr><td><strong><a href="/beer/beer/{id}/">{name}</a></strong><br><a href="/beerstyles/pale-lager/3/"><span>Pale Lager</span></a></td><td>4.5</td><td>3/14/2009</td><td></td><td>3.2</td><td>55</td><td>120</td></tr>"#
    )
}

pub fn brewed_at_row(id: u32, name: &str) -> String {
    format!(r#"<tr><td colspan="7">Brewed at <a href="/brewers/brewery/{id}/">{name}</a></td></tr>"#)
}

pub fn brewed_by_for_row(id: u32, name: &str) -> String {
    format!(r#"<tr><td colspan="7">Brewed by/for <a href="/brewers/brewery/{id}/">{name}</a></td></tr>"#)
}

/// A beer list page; each inner vector of rows becomes one `tbody`
pub fn brewery_beers_page(sections: &[Vec<String>], total_pages: u32) -> String {
    let pagination: String = (1..=total_pages).map(|n| format!("<b>{n}</b> ")).collect();
    let bodies: String = sections
        .iter()
        .map(|rows| format!("<tbody>{}</tbody>", rows.concat()))
        .collect();
    format!(
        r#"<html><body><div class="pagination">{pagination}</div>
        <table id="brewer-beer-table"><thead><tr><th>Name</th></tr></thead>{bodies}</table>
        </body></html>"#
    )
}

/// A rating line, reviewer line and comment for the n-th review
pub fn review_fragments(n: u32) -> String {
    format!(
        "<div>3.{d} AROMA 7/10 APPEARANCE 4/5 TASTE 8/10 PALATE 3/5 OVERALL 15/20</div>\
         <small>Reviewer {n} ({n}) - Glasgow - SEP 8, 2013</small>\
         <div>Review number {n}.</div>",
        d = n % 10,
    )
}

pub fn review_page(numbers: impl IntoIterator<Item = u32>) -> String {
    let fragments: String = numbers.into_iter().map(review_fragments).collect();
    format!(
        r#"<html><body><div class="reviews-container"><div><div>{fragments}</div></div></div></body></html>"#
    )
}

pub fn location_page(title: &str, active: &[(u32, &str)], closed: &[(u32, &str)]) -> String {
    let active_rows: String = active
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<tr><td><a href="/brewers/brewery/{id}/">{name}</a> - Glasgow</td><td>Microbrewery</td><td></td><td></td><td>1885</td></tr>"#
            )
        })
        .collect();
    let closed_rows: String = closed
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<tr><td><a href="/brewers/brewery/{id}/">{name}</a> - Leith (Out of Business)</td><td>Brewpub</td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="container"><table><tr><td>
        <div id="tagside"><p><a href="/beerstyles/pale-lager/3/">Pale Lager</a>&nbsp;{count}<br><a href="/beerstyles/stout/24/">Stout</a>&nbsp;1<br></p></div>
        <div id="brewerCover"><h1>{title} Breweries</h1><span id="showInfo">{count} active breweries</span></div>
        <table id="brewerTable"><tr><th>Name</th></tr>{active_rows}</table>
        <table id="brewerTable"><tr><th>Name</th></tr>{closed_rows}</table>
        </td></tr></table></div></body></html>"#,
        count = active.len(),
    )
}

pub fn search_page(beers: &[(u32, &str)], breweries: &[(u32, &str)]) -> String {
    let brewery_rows: String = breweries
        .iter()
        .map(|(id, name)| format!(r#"<tr><td><a href="/brewers/brewery/{id}/">{name}</a></td><td>Scotland</td></tr>"#))
        .collect();
    let beer_rows: String = beers
        .iter()
        .map(|(id, name)| {
            format!(r#"<tr><td><a href="/beer/beer/{id}/">{name}</a></td><td></td><td></td><td>80</td><td>12</td></tr>"#)
        })
        .collect();
    let mut html = String::from("<html><body>");
    if !breweries.is_empty() {
        html.push_str(&format!("<h2>brewers</h2><table>{brewery_rows}</table>"));
    }
    if !beers.is_empty() {
        html.push_str(&format!(
            "<h2>beers</h2><table><tr><th>Name</th></tr>{beer_rows}</table>"
        ));
    }
    html.push_str("</body></html>");
    html
}
