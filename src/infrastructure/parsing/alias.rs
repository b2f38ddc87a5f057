//! Alias page detection
//!
//! RateBeer keeps some beers as aliases of another (Koenig Ludwig Weissbier,
//! for example): the page says "Also known as ..." and links to the canonical
//! beer. Resolution follows those links, bounded by [`MAX_ALIAS_HOPS`].

use regex::Regex;
use scraper::Html;
use tracing::debug;

use super::text::{Css, id_from_link};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Redirections allowed in one resolution before giving up
pub const MAX_ALIAS_HOPS: usize = 5;

const ALIAS_CONTAINER: &str = ".row.columns-container .col-sm-8";
const ALIAS_PATTERN: &str = r"(?s)Also known as.*Proceed to the aliased beer\.{3}";

/// Whether a fetched beer page is the beer itself or a pointer to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasState {
    Direct,
    Aliased { target: u32 },
}

#[derive(Debug)]
pub struct AliasDetector {
    container: Css,
    link: Css,
    pattern: Regex,
}

impl AliasDetector {
    pub fn new() -> ScrapeResult<Self> {
        Ok(Self {
            container: Css::new(ALIAS_CONTAINER)?,
            link: Css::new("a")?,
            pattern: Regex::new(ALIAS_PATTERN)
                .map_err(|e| ScrapeError::invalid_argument(format!("alias pattern: {e}")))?,
        })
    }

    pub fn detect(&self, html: &Html) -> ScrapeResult<AliasState> {
        let Some(container) = self.container.first_in(html) else {
            return Ok(AliasState::Direct);
        };
        let text: String = container.text().collect();
        if !self.pattern.is_match(&text) {
            return Ok(AliasState::Direct);
        }

        let link = self.link.require(container, "alias container")?;
        let target = id_from_link(link, "alias container")?;
        debug!("Alias page points at beer {}", target);
        Ok(AliasState::Aliased { target })
    }
}

/// Redirections taken while resolving one beer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasChain {
    origin: u32,
    current: u32,
    hops: usize,
}

impl AliasChain {
    pub const fn new(origin: u32) -> Self {
        Self {
            origin,
            current: origin,
            hops: 0,
        }
    }

    pub const fn current(&self) -> u32 {
        self.current
    }

    pub const fn hops(&self) -> usize {
        self.hops
    }

    /// Move to `target`, failing once the chain exceeds [`MAX_ALIAS_HOPS`]
    pub fn follow(&mut self, target: u32) -> ScrapeResult<u32> {
        if self.hops >= MAX_ALIAS_HOPS {
            return Err(ScrapeError::AliasChainTooLong {
                id: self.origin,
                hops: MAX_ALIAS_HOPS,
            });
        }
        self.hops += 1;
        self.current = target;
        Ok(target)
    }
}
