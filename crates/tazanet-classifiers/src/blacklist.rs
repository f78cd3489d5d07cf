//! Manual blacklist filter
//!
//! Authoritative pre-filter that runs before any model call. Matching is
//! case-insensitive substring containment; the first configured term that
//! occurs anywhere in the text wins.

use aho_corasick::AhoCorasick;
use tazanet_core::{Error, Result};

/// Terms banned out of the box
pub const DEFAULT_BANNED_TERMS: &[&str] = &["плохоеслово", "роблокс", "убью", "кровь"];

/// A blacklist hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistMatch {
    /// The configured term that matched
    pub term: String,
}

/// Fixed set of banned terms
pub struct Blacklist {
    terms: Vec<String>,
    matcher: Option<AhoCorasick>,
}

impl Blacklist {
    /// Build a blacklist. Terms are lower-cased; blank and duplicate terms
    /// are ignored.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !normalized.contains(&term) {
                normalized.push(term);
            }
        }

        let matcher = if normalized.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&normalized).map_err(|e| {
                Error::config(format!("Failed to build blacklist matcher: {}", e))
            })?)
        };

        Ok(Self {
            terms: normalized,
            matcher,
        })
    }

    /// Blacklist with [`DEFAULT_BANNED_TERMS`]
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_BANNED_TERMS)
    }

    /// Check text against the banned terms
    pub fn check(&self, text: &str) -> Option<BlacklistMatch> {
        let matcher = self.matcher.as_ref()?;
        let lowered = text.to_lowercase();

        let first = matcher
            .find_overlapping_iter(&lowered)
            .map(|m| m.pattern().as_usize())
            .min()?;

        Some(BlacklistMatch {
            term: self.terms[first].clone(),
        })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
