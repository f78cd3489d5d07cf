//! Decision engine
//!
//! Turns `(query text, age class, model)` into a [`Decision`]. Steps, in
//! order:
//! 1. Blacklist on the raw text: a hit denies immediately and is critical.
//! 2. No ready model: answer according to the loading posture.
//! 3. Translate to English, falling back to the raw text on any failure.
//! 4. Classify; a model failure is surfaced as a warning, never a crash.
//! 5. Collect bad labels scoring strictly above the threshold.
//! 6. Critical signals, or any signal for a child, deny; otherwise warn.

use crate::policy::{ContentPolicy, LoadingPosture};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tazanet_classifiers::{Blacklist, ToxicityModel, Translator};
use tazanet_core::{AgeClass, Decision, DecisionPath, Error, LabelScore, Result, Verdict};
use tracing::{debug, info, warn};

/// Reason attached to blacklist denials
pub const BLACKLIST_REASON: &str = "Blacklist (Manual Ban)";

/// Reason attached while the model is not ready
pub const LOADING_REASON: &str = "AI is loading...";

/// Prefix of the reason for model failures
pub const MODEL_ERROR_PREFIX: &str = "Model error: ";

const DEFAULT_TRANSLATE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Translation step settings
struct Translation {
    translator: Arc<dyn Translator>,
    source: String,
    target: String,
}

/// The single authority for query verdicts
pub struct DecisionEngine {
    blacklist: Blacklist,
    policy: ContentPolicy,
    translation: Option<Translation>,
    translate_timeout: Duration,
    classify_timeout: Duration,
}

impl DecisionEngine {
    /// Create an engine that classifies text as typed
    pub fn new(blacklist: Blacklist, policy: ContentPolicy) -> Self {
        Self {
            blacklist,
            policy,
            translation: None,
            translate_timeout: DEFAULT_TRANSLATE_TIMEOUT,
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }

    /// Translate queries from `source` into `target` before classification
    pub fn with_translator(
        mut self,
        translator: Arc<dyn Translator>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.translation = Some(Translation {
            translator,
            source: source.into(),
            target: target.into(),
        });
        self
    }

    /// Bound the translation and classification calls
    pub fn with_timeouts(mut self, translate: Duration, classify: Duration) -> Self {
        self.translate_timeout = translate;
        self.classify_timeout = classify;
        self
    }

    pub fn policy(&self) -> &ContentPolicy {
        &self.policy
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    /// Decide on a query.
    ///
    /// `model` is `None` whenever the model lifecycle is not READY. Never
    /// fails: external-call errors become part of the verdict.
    pub async fn decide(
        &self,
        text: &str,
        age: AgeClass,
        model: Option<&dyn ToxicityModel>,
    ) -> Decision {
        let start = Instant::now();

        let decision = match self.blacklist.check(text) {
            Some(hit) => {
                metrics::counter!("tazanet_blacklist_hits_total").increment(1);
                Decision {
                    verdict: Verdict::Deny(BLACKLIST_REASON.to_string()),
                    path: DecisionPath::Blacklist,
                    age,
                    signals: Vec::new(),
                    matched_term: Some(hit.term),
                    critical: true,
                    latency_us: 0,
                }
            }
            None => match model {
                Some(model) => self.classify(text, age, model).await,
                None => self.not_ready(age),
            },
        };

        let decision = Decision {
            latency_us: start.elapsed().as_micros() as u64,
            ..decision
        };

        metrics::counter!("tazanet_decisions_total", "verdict" => decision.verdict.kind())
            .increment(1);
        metrics::histogram!("tazanet_decision_latency_us").record(decision.latency_us as f64);

        info!(
            verdict = decision.verdict.kind(),
            reason = %decision.reason(),
            age = %age,
            path = ?decision.path,
            latency_us = decision.latency_us,
            "Query decided"
        );

        decision
    }

    fn not_ready(&self, age: AgeClass) -> Decision {
        debug!("Toxicity model not ready, blacklist only");

        let verdict = match self.policy.loading_posture {
            LoadingPosture::Warn => Verdict::Warn(LOADING_REASON.to_string()),
            LoadingPosture::Deny => Verdict::Deny(LOADING_REASON.to_string()),
        };

        Decision {
            verdict,
            path: DecisionPath::ModelNotReady,
            age,
            signals: Vec::new(),
            matched_term: None,
            critical: false,
            latency_us: 0,
        }
    }

    async fn classify(&self, text: &str, age: AgeClass, model: &dyn ToxicityModel) -> Decision {
        let english = self.translate(text).await;

        let output = match tokio::time::timeout(self.classify_timeout, model.classify(&english)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                metrics::counter!("tazanet_classifier_errors_total").increment(1);
                warn!(model = model.name(), error = %e, "Toxicity model call failed");

                return Decision {
                    verdict: Verdict::Warn(format!("{}{}", MODEL_ERROR_PREFIX, e.detail())),
                    path: DecisionPath::ModelError,
                    age,
                    signals: Vec::new(),
                    matched_term: None,
                    critical: false,
                    latency_us: 0,
                };
            }
        };

        let signals = self.flagged_signals(output.normalize());
        let critical = signals.iter().any(|s| self.policy.is_critical_label(&s.label));

        Decision {
            verdict: compose_verdict(&signals, critical, age),
            path: DecisionPath::Classified,
            age,
            signals,
            matched_term: None,
            critical,
            latency_us: 0,
        }
    }

    /// Translated text, or the input when translation is off or fails
    async fn translate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let Some(translation) = &self.translation else {
            return Cow::Borrowed(text);
        };

        match self.try_translate(translation, text).await {
            Ok(translated) => {
                debug!(original = %text, translated = %translated, "Query translated");
                Cow::Owned(translated)
            }
            Err(e) => {
                metrics::counter!("tazanet_translation_fallbacks_total").increment(1);
                warn!(error = %e, "Translation failed, classifying original text");
                Cow::Borrowed(text)
            }
        }
    }

    async fn try_translate(&self, translation: &Translation, text: &str) -> Result<String> {
        let call = translation
            .translator
            .translate(text, &translation.source, &translation.target);

        tokio::time::timeout(self.translate_timeout, call)
            .await
            .map_err(|_| Error::Timeout)?
    }

    /// Bad-label entries above the threshold, in model order
    fn flagged_signals(&self, scores: Vec<LabelScore>) -> Vec<LabelScore> {
        scores
            .into_iter()
            .filter(|s| self.policy.is_bad_label(&s.label) && s.score > self.policy.threshold)
            .collect()
    }
}

/// Verdict for classified signals.
///
/// No signals is SAFE. Signals deny when critical or when the user is a
/// child, and warn otherwise.
pub fn compose_verdict(signals: &[LabelScore], critical: bool, age: AgeClass) -> Verdict {
    if signals.is_empty() {
        return Verdict::Safe;
    }

    let reason = signals
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ");

    if critical || age == AgeClass::Child {
        Verdict::Deny(reason)
    } else {
        Verdict::Warn(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_safe_when_nothing_flagged() {
        assert_eq!(compose_verdict(&[], false, AgeClass::Child), Verdict::Safe);
        assert_eq!(compose_verdict(&[], false, AgeClass::Adult), Verdict::Safe);
    }

    #[test]
    fn test_compose_joins_signals() {
        let signals = vec![LabelScore::new("toxic", 0.81), LabelScore::new("insult", 0.5)];

        assert_eq!(
            compose_verdict(&signals, false, AgeClass::Adult),
            Verdict::Warn("toxic (81%) | insult (50%)".to_string())
        );
        assert_eq!(
            compose_verdict(&signals, false, AgeClass::Child),
            Verdict::Deny("toxic (81%) | insult (50%)".to_string())
        );
    }

    #[test]
    fn test_compose_critical_denies_adults() {
        let signals = vec![LabelScore::new("severe_toxic", 0.9)];
        assert_eq!(
            compose_verdict(&signals, true, AgeClass::Adult),
            Verdict::Deny("severe_toxic (90%)".to_string())
        );
    }
}
