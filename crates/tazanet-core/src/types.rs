//! Core types for TazaNet

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse age classification published by the vision collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeClass {
    #[default]
    Adult,
    Child,
}

impl AgeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adult => "ADULT",
            Self::Child => "CHILD",
        }
    }
}

impl fmt::Display for AgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adult" => Ok(Self::Adult),
            "child" => Ok(Self::Child),
            other => Err(format!("unknown age class '{}' (expected adult or child)", other)),
        }
    }
}

/// Lifecycle state of the toxicity model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    Unloaded,
    Loading,
    Ready,
    Error,
}

impl ModelState {
    /// Status label shown by the status display for this state
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Unloaded => "BOOTING...",
            Self::Loading => "Loading...",
            Self::Ready => "AI SECURE ONLINE",
            Self::Error => "AI ERROR!",
        }
    }

    /// READY and ERROR are terminal for the process lifetime
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// A single (label, confidence) pair produced by the toxicity model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,

    /// Confidence score (0.0-1.0)
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// Score as a whole percentage, e.g. `0.5` -> `50`
    pub fn percent(&self) -> u32 {
        (self.score * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

impl fmt::Display for LabelScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.label, self.percent())
    }
}

/// Final access decision for a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Nothing flagged; the query may be dispatched
    Safe,

    /// Flagged for an adult, or the model could not be consulted; access proceeds
    Warn(String),

    /// Blocked
    Deny(String),
}

impl Verdict {
    /// Human-readable reason (`"Safe"` for a safe verdict)
    pub fn reason(&self) -> &str {
        match self {
            Self::Safe => "Safe",
            Self::Warn(reason) | Self::Deny(reason) => reason,
        }
    }

    /// Whether the caller may dispatch the query
    pub fn allows_access(&self) -> bool {
        !self.is_denied()
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warn(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Warn(_) => "WARN",
            Self::Deny(_) => "DENY",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => f.write_str("SAFE"),
            Self::Warn(reason) => write!(f, "WARN({})", reason),
            Self::Deny(reason) => write!(f, "DENY({})", reason),
        }
    }
}

/// Which step of the decision pipeline produced the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPath {
    Blacklist,
    ModelNotReady,
    ModelError,
    Classified,
}

/// A verdict together with the signals that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub verdict: Verdict,

    pub path: DecisionPath,

    /// Age class read at decision time
    pub age: AgeClass,

    /// Bad-label signals that exceeded the threshold
    pub signals: Vec<LabelScore>,

    /// Banned term that matched, for blacklist decisions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_term: Option<String>,

    /// Critical matches deny regardless of age class
    pub critical: bool,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl Decision {
    pub fn reason(&self) -> &str {
        self.verdict.reason()
    }
}
