//! Lexicon toxicity model
//!
//! Deterministic multi-label model with no downloads. Emits the same label
//! set as `unitary/toxic-bert` so it can stand in for it offline.

use crate::classifier::{ModelOutput, ToxicityModel};
use tazanet_core::{LabelScore, Result};

const INSULT: &[&str] = &["idiot", "stupid", "dumb", "moron", "loser", "bastard"];
const OBSCENE: &[&str] = &["fuck", "shit", "asshole", "bitch", "damn"];
const THREAT: &[&str] = &["kill", "murder", "shoot", "hurt you"];
const IDENTITY_HATE: &[&str] = &["subhuman", "vermin"];

/// Lexicon-based toxicity model
pub struct LexiconToxicityModel {
    name: String,
}

impl LexiconToxicityModel {
    pub fn new() -> Self {
        Self {
            name: "toxicity-lexicon".to_string(),
        }
    }

    fn hits(text: &str, lexicon: &[&str]) -> usize {
        lexicon.iter().filter(|word| text.contains(**word)).count()
    }

    fn bounded(hits: usize, weight: f64) -> f64 {
        (hits as f64 * weight).clamp(0.0, 0.95)
    }

    /// Score every label for the text
    pub fn score(&self, text: &str) -> Vec<LabelScore> {
        let text = text.to_lowercase();

        let insult = Self::hits(&text, INSULT);
        let obscene = Self::hits(&text, OBSCENE);
        let threat = Self::hits(&text, THREAT);
        let identity_hate = Self::hits(&text, IDENTITY_HATE);
        let total = insult + obscene + threat + identity_hate;

        vec![
            LabelScore::new("toxic", Self::bounded(total, 0.35)),
            // Only piles of abuse count as severe
            LabelScore::new("severe_toxic", Self::bounded(total.saturating_sub(2), 0.35)),
            LabelScore::new("obscene", Self::bounded(obscene, 0.35)),
            LabelScore::new("threat", Self::bounded(threat, 0.45)),
            LabelScore::new("insult", Self::bounded(insult, 0.35)),
            LabelScore::new("identity_hate", Self::bounded(identity_hate, 0.45)),
        ]
    }
}

impl Default for LexiconToxicityModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ToxicityModel for LexiconToxicityModel {
    async fn classify(&self, text: &str) -> Result<ModelOutput> {
        Ok(ModelOutput::from_scores(self.score(text)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
