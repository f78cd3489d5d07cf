//! Configuration for the toxicity model and the translation adapter

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Toxicity model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Which model implementation to load
    #[serde(default)]
    pub backend: ModelBackend,

    /// Settings for the BERT backend
    #[serde(default)]
    pub model: BertModelConfig,

    /// Upper bound on a single classification call
    #[serde(default = "default_classify_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            model: BertModelConfig::default(),
            timeout_ms: default_classify_timeout_ms(),
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Model implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Built-in lexicon model, no downloads
    Lexicon,

    /// `unitary/toxic-bert` (or a compatible checkpoint) through Candle
    #[default]
    Bert,
}

impl std::str::FromStr for ModelBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lexicon" => Ok(Self::Lexicon),
            "bert" => Ok(Self::Bert),
            other => Err(format!("unknown backend '{}' (expected lexicon or bert)", other)),
        }
    }
}

/// Where to find model weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Directory with config.json, weights, and tokenizer files
    Local { path: PathBuf },

    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::HuggingFace {
            repo: "unitary/toxic-bert".to_string(),
            revision: default_revision(),
        }
    }
}

/// Activation applied to the classification logits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Independent per-label probabilities (multi-label checkpoints)
    #[default]
    Sigmoid,
    Softmax,
}

/// BERT toxicity model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BertModelConfig {
    #[serde(default)]
    pub source: ModelSource,

    /// Device to run on (cpu, cuda, metal)
    #[serde(default = "default_device")]
    pub device: String,

    /// Maximum sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default)]
    pub activation: Activation,
}

impl Default for BertModelConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::default(),
            device: default_device(),
            max_length: default_max_length(),
            activation: Activation::default(),
        }
    }
}

/// Translation adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Disable to classify text as typed
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,

    /// Source language, `auto` to detect
    #[serde(default = "default_source_lang")]
    pub source: String,

    #[serde(default = "default_target_lang")]
    pub target: String,

    #[serde(default = "default_translate_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_translate_endpoint(),
            source: default_source_lang(),
            target: default_target_lang(),
            timeout_ms: default_translate_timeout_ms(),
        }
    }
}

fn default_classify_timeout_ms() -> u64 {
    10_000
}

fn default_translate_timeout_ms() -> u64 {
    5_000
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    512
}

fn default_true() -> bool {
    true
}

fn default_translate_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_source_lang() -> String {
    "auto".to_string()
}

fn default_target_lang() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_toxic_bert() {
        let config = ClassifierConfig::default();
        assert_eq!(config.backend, ModelBackend::Bert);
        match config.model.source {
            ModelSource::HuggingFace { repo, revision } => {
                assert_eq!(repo, "unitary/toxic-bert");
                assert_eq!(revision, "main");
            }
            _ => panic!("Wrong model source"),
        }
    }

    #[test]
    fn test_classifier_config_deserialization() {
        let yaml = r#"
backend: bert
model:
  source:
    type: local
    path: /opt/models/toxic-bert
  device: cuda
  max_length: 256
timeout_ms: 2500
"#;

        let config = ClassifierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.model.max_length, 256);
        assert_eq!(config.model.activation, Activation::Sigmoid);
        assert!(matches!(config.model.source, ModelSource::Local { .. }));
    }

    #[test]
    fn test_translator_defaults() {
        let config: TranslatorConfig = serde_yaml::from_str("enabled: false").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.source, "auto");
        assert_eq!(config.target, "en");
    }
}
