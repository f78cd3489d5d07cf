//! Content policy: which model labels matter and how strictly

use serde::{Deserialize, Serialize};
use std::path::Path;
use tazanet_core::{Error, Result};

/// Labels treated as unsafe signals
pub const DEFAULT_BAD_LABELS: &[&str] = &["toxic", "severe_toxic", "threat", "insult", "obscene"];

/// Labels that deny even for adults
pub const DEFAULT_CRITICAL_LABELS: &[&str] = &["severe_toxic"];

/// What to return while the model is LOADING or in ERROR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingPosture {
    /// Allow with a warning
    #[default]
    Warn,

    /// Block until the model is ready
    Deny,
}

/// Tunable decision policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPolicy {
    #[serde(default = "default_bad_labels")]
    pub bad_labels: Vec<String>,

    /// A bad label flags the query when its score strictly exceeds this
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default = "default_critical_labels")]
    pub critical_labels: Vec<String>,

    #[serde(default)]
    pub loading_posture: LoadingPosture,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            bad_labels: default_bad_labels(),
            threshold: default_threshold(),
            critical_labels: default_critical_labels(),
            loading_posture: LoadingPosture::default(),
        }
    }
}

impl ContentPolicy {
    /// Load a policy from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let policy: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Invalid policy: {}", e)))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    pub fn is_bad_label(&self, label: &str) -> bool {
        self.bad_labels.iter().any(|l| l == label)
    }

    pub fn is_critical_label(&self, label: &str) -> bool {
        self.critical_labels.iter().any(|l| l == label)
    }
}

fn default_bad_labels() -> Vec<String> {
    DEFAULT_BAD_LABELS.iter().map(|s| s.to_string()).collect()
}

fn default_critical_labels() -> Vec<String> {
    DEFAULT_CRITICAL_LABELS.iter().map(|s| s.to_string()).collect()
}

fn default_threshold() -> f64 {
    0.2
}
