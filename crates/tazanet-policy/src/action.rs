//! What the caller does with a verdict

use serde::{Deserialize, Serialize};
use tazanet_core::{AgeClass, Decision, Error, Result, Verdict};
use url::Url;

/// Spoken when a query is allowed through
pub const GRANTED_ANNOUNCEMENT: &str = "Access granted.";

/// Spoken when a query is blocked
pub const DENIED_ANNOUNCEMENT: &str = "Access denied. Content is dangerous.";

/// Where allowed queries are sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTarget {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_query_param")]
    pub query_param: String,
}

impl Default for SearchTarget {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            query_param: default_query_param(),
        }
    }
}

impl SearchTarget {
    /// Search URL for a query, with the query percent-encoded
    pub fn url_for(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("Invalid search URL '{}': {}", self.base_url, e)))?;
        url.query_pairs_mut().append_pair(&self.query_param, query);
        Ok(url)
    }
}

fn default_base_url() -> String {
    "https://www.youtube.com/results".to_string()
}

fn default_query_param() -> String {
    "search_query".to_string()
}

/// Action for the presentation shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictAction {
    /// Open the search. `caution` is set for warnings.
    Dispatch { url: Url, caution: Option<String> },

    /// Show a blocking notice instead
    Block { notice: String },
}

impl VerdictAction {
    /// Map a decision for `query` onto an action
    pub fn plan(decision: &Decision, query: &str, target: &SearchTarget) -> Result<Self> {
        match &decision.verdict {
            Verdict::Deny(reason) => Ok(Self::Block {
                notice: format!("BLOCKED!\nReason: {}", reason),
            }),
            Verdict::Warn(reason) => {
                let allowed_for = match decision.age {
                    AgeClass::Adult => " for Adult",
                    AgeClass::Child => "",
                };
                Ok(Self::Dispatch {
                    url: target.url_for(query)?,
                    caution: Some(format!("{} (Allowed{})", reason, allowed_for)),
                })
            }
            Verdict::Safe => Ok(Self::Dispatch {
                url: target.url_for(query)?,
                caution: None,
            }),
        }
    }

    /// Voice line for this action
    pub fn announcement(&self) -> &'static str {
        match self {
            Self::Dispatch { .. } => GRANTED_ANNOUNCEMENT,
            Self::Block { .. } => DENIED_ANNOUNCEMENT,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block { .. })
    }
}
