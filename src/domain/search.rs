//! Search results

use serde::Serialize;
use std::collections::HashSet;

use super::beer::Beer;
use super::brewery::Brewery;

/// Beers and breweries matching a query.
///
/// A side is `None` when the results page had no table for it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    pub beers: Option<Vec<Beer>>,
    pub breweries: Option<Vec<Brewery>>,
}

impl SearchResult {
    /// Append beers from a secondary query; breweries are left alone
    pub fn merge_beers(&mut self, extra: Option<Vec<Beer>>) {
        if let Some(extra) = extra {
            self.beers.get_or_insert_with(Vec::new).extend(extra);
        }
    }

    /// Drop repeated beers (first occurrence wins) and sort breweries by id
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let Some(beers) = self.beers.as_mut() {
            let mut seen = HashSet::new();
            beers.retain(|beer| seen.insert(beer.id()));
        }
        if let Some(breweries) = self.breweries.as_mut() {
            breweries.sort_by_key(Brewery::id);
            breweries.dedup_by_key(|brewery| brewery.id());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.beers.as_ref().is_none_or(Vec::is_empty)
            && self.breweries.as_ref().is_none_or(Vec::is_empty)
    }
}
