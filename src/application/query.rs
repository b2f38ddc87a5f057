//! Search query normalization
//!
//! The site's search finds nothing for queries carrying generic words like
//! "Brewing" or "Co.", or characters such as `/` and `:`. Queries are
//! rewritten before they are submitted.

use deunicode::deunicode;
use regex::Regex;
use tracing::debug;

use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

const GENERIC_WORDS: &str = r"(?i)(^|\s)(brew|brewers|brewery|brewing|brewhouse|company|co\.?|inc\.?|ltd\.?|limited)(\s|$)";

/// Substring -> replacement, applied in order after generic words are gone
const SUBSTITUTIONS: [(&str, &str); 2] = [(r"(?i)six°north", "Six Degrees North"), (r"[/:]", " ")];

const IPA: &str = " ipa";
const IPA_EXPANDED: &str = " india pale ale";

#[derive(Debug)]
pub struct QueryNormalizer {
    generic_words: Regex,
    substitutions: Vec<(Regex, &'static str)>,
}

impl QueryNormalizer {
    pub fn new() -> ScrapeResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| ScrapeError::invalid_argument(format!("query pattern {pattern}: {e}")))
        };
        Ok(Self {
            generic_words: compile(GENERIC_WORDS)?,
            substitutions: SUBSTITUTIONS
                .iter()
                .map(|(pattern, replacement)| Ok((compile(pattern)?, *replacement)))
                .collect::<ScrapeResult<_>>()?,
        })
    }

    /// The payload actually submitted for `query`
    pub fn normalize(&self, query: &str) -> String {
        let mut text = query.to_string();

        // Adjacent generic words share the space between them, so one pass
        // can leave a match behind
        loop {
            let stripped = self.generic_words.replace_all(&text, " ").into_owned();
            if stripped == text {
                break;
            }
            text = stripped;
        }

        for (pattern, replacement) in &self.substitutions {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }

        let normalized = deunicode(&text).trim().to_string();
        debug!("Normalized search query {:?} -> {:?}", query, normalized);
        normalized
    }
}

/// The follow-up query for a normalized query naming an IPA, if any.
///
/// The site matches "India Pale Ale" but often not "IPA".
pub fn secondary_query(normalized: &str) -> Option<String> {
    let lower = normalized.to_lowercase();
    lower
        .contains(IPA)
        .then(|| lower.replace(IPA, IPA_EXPANDED))
}
