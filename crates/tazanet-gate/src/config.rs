//! Gate configuration

use crate::age::AgeConfig;
use crate::cli::Cli;
use crate::speech::SpeechConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tazanet_classifiers::{ClassifierConfig, TranslatorConfig, DEFAULT_BANNED_TERMS};
use tazanet_policy::{ContentPolicy, SearchTarget};

/// Full gate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default)]
    pub blacklist: BlacklistConfig,

    #[serde(default)]
    pub policy: ContentPolicy,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub translator: TranslatorConfig,

    #[serde(default)]
    pub age: AgeConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub search: SearchTarget,
}

/// Manually banned terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistConfig {
    #[serde(default = "default_banned_terms")]
    pub terms: Vec<String>,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            terms: default_banned_terms(),
        }
    }
}

fn default_banned_terms() -> Vec<String> {
    DEFAULT_BANNED_TERMS.iter().map(|t| t.to_string()).collect()
}

impl GateConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &Path, cli: &Cli) -> anyhow::Result<Self> {
        // A missing file means defaults
        let mut config = if config_path.exists() {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        if let Some(backend) = cli.backend {
            config.classifier.backend = backend;
        }

        if let Some(age) = cli.age {
            config.age.initial = age;
        }

        if cli.no_translate {
            config.translator.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.policy.validate()?;

        if self.age.sample_interval_ms == 0 {
            anyhow::bail!("age.sample_interval_ms must be positive");
        }

        self.search.url_for("")?;
        Ok(())
    }
}
