//! Toxicity model trait and raw model output

use async_trait::async_trait;
use serde_json::Value;
use tazanet_core::{LabelScore, Result};

/// Trait for toxicity models
///
/// A model returns every (label, score) pair it produced for the text. The
/// caller decides which labels matter.
#[async_trait]
pub trait ToxicityModel: Send + Sync {
    /// Classify English text
    async fn classify(&self, text: &str) -> Result<ModelOutput>;

    /// Get the model name
    fn name(&self) -> &str;
}

/// One entry of raw model output. Either field may be missing when the
/// output comes from an untyped source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLabelScore {
    pub label: Option<String>,
    pub score: Option<f64>,
}

impl RawLabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: Some(label.into()),
            score: Some(score),
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                label: map.get("label").and_then(Value::as_str).map(str::to_string),
                score: map.get("score").and_then(Value::as_f64),
            },
            _ => Self::default(),
        }
    }
}

impl From<LabelScore> for RawLabelScore {
    fn from(value: LabelScore) -> Self {
        Self::new(value.label, value.score)
    }
}

/// Shape of a model's output for one input text.
///
/// Pipelines return either a single pair, a flat list of pairs, or a list
/// of per-input lists.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    Single(RawLabelScore),
    Flat(Vec<RawLabelScore>),
    Nested(Vec<Vec<RawLabelScore>>),
}

impl ModelOutput {
    /// Build from pairs that are known to be well formed
    pub fn from_scores(scores: impl IntoIterator<Item = LabelScore>) -> Self {
        Self::Flat(scores.into_iter().map(RawLabelScore::from).collect())
    }

    /// Interpret untyped JSON output. Never fails: anything unrecognized
    /// becomes an entry with no label and no score.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                if matches!(items.first(), Some(Value::Array(_))) {
                    Self::Nested(
                        items
                            .iter()
                            .map(|inner| match inner {
                                Value::Array(entries) => {
                                    entries.iter().map(RawLabelScore::from_value).collect()
                                }
                                other => vec![RawLabelScore::from_value(other)],
                            })
                            .collect(),
                    )
                } else {
                    Self::Flat(items.iter().map(RawLabelScore::from_value).collect())
                }
            }
            other => Self::Single(RawLabelScore::from_value(other)),
        }
    }

    /// Flatten nested output one level and wrap a single pair, yielding an
    /// ordered sequence. A missing score counts as `0`; entries with no
    /// label can never match a label and are dropped.
    ///
    /// Every inner group of nested output is kept, in order. The gate sends
    /// one text per call, so there is a single group and this equals taking
    /// the first one.
    pub fn normalize(self) -> Vec<LabelScore> {
        let entries = match self {
            Self::Single(entry) => vec![entry],
            Self::Flat(entries) => entries,
            Self::Nested(groups) => groups.into_iter().flatten().collect(),
        };

        entries
            .into_iter()
            .filter_map(|entry| {
                let label = entry.label?;
                Some(LabelScore::new(label, entry.score.unwrap_or(0.0)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_nested() {
        let output = ModelOutput::from_value(&json!([[
            {"label": "toxic", "score": 0.9},
            {"label": "insult", "score": 0.4}
        ]]));

        let scores = output.normalize();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], LabelScore::new("toxic", 0.9));
        assert_eq!(scores[1].label, "insult");
    }

    #[test]
    fn test_normalize_keeps_every_group() {
        let output = ModelOutput::from_value(&json!([
            [{"label": "toxic", "score": 0.1}],
            [{"label": "threat", "score": 0.8}]
        ]));

        let labels: Vec<String> = output.normalize().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["toxic", "threat"]);
    }

    #[test]
    fn test_scores_keep_json_precision() {
        let output = ModelOutput::from_value(&json!([{"label": "insult", "score": 0.20000001}]));
        let scores = output.normalize();

        assert_eq!(scores[0].score, 0.20000001);
        assert!(scores[0].score > 0.2);
    }

    #[test]
    fn test_normalize_single_pair() {
        let output = ModelOutput::from_value(&json!({"label": "threat", "score": 0.7}));
        assert!(matches!(output, ModelOutput::Single(_)));
        assert_eq!(output.normalize(), vec![LabelScore::new("threat", 0.7)]);
    }

    #[test]
    fn test_normalize_malformed_entries() {
        let output = ModelOutput::from_value(&json!([
            {"label": "insult"},
            {"score": 0.99},
            "garbage",
            42,
            {"label": 7, "score": 0.5}
        ]));

        let scores = output.normalize();
        assert_eq!(scores, vec![LabelScore::new("insult", 0.0)]);
    }

    #[test]
    fn test_normalize_empty_and_scalar() {
        assert!(ModelOutput::from_value(&json!([])).normalize().is_empty());
        assert!(ModelOutput::from_value(&json!(null)).normalize().is_empty());
        assert!(ModelOutput::from_value(&json!("toxic")).normalize().is_empty());
    }

    #[test]
    fn test_integer_scores_are_accepted() {
        let output = ModelOutput::from_value(&json!([{"label": "obscene", "score": 1}]));
        assert_eq!(output.normalize(), vec![LabelScore::new("obscene", 1.0)]);
    }
}
