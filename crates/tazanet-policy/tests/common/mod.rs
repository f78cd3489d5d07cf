//! Mock models and translators for decision engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tazanet_classifiers::{Blacklist, ModelOutput, ToxicityModel, Translator};
use tazanet_core::{Error, LabelScore, Result};
use tazanet_policy::{ContentPolicy, DecisionEngine};

/// Model that returns a fixed output and records what it was asked
pub struct FixedModel {
    output: ModelOutput,
    seen: Mutex<Vec<String>>,
    call_count: AtomicU32,
}

impl FixedModel {
    pub fn new(output: ModelOutput) -> Self {
        Self {
            output,
            seen: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn scores(scores: &[(&str, f64)]) -> Self {
        Self::new(ModelOutput::from_scores(
            scores.iter().map(|(label, score)| LabelScore::new(*label, *score)),
        ))
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToxicityModel for FixedModel {
    async fn classify(&self, text: &str) -> Result<ModelOutput> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.seen.lock().unwrap().push(text.to_string());
        Ok(self.output.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Model whose every call fails
pub struct FailingModel;

#[async_trait]
impl ToxicityModel for FailingModel {
    async fn classify(&self, _text: &str) -> Result<ModelOutput> {
        Err(Error::classifier("inference exploded"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Model that takes a while to answer
pub struct SlowModel(pub Duration);

#[async_trait]
impl ToxicityModel for SlowModel {
    async fn classify(&self, _text: &str) -> Result<ModelOutput> {
        tokio::time::sleep(self.0).await;
        Ok(ModelOutput::from_scores(Vec::new()))
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Translator that always fails
pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String> {
        Err(Error::translation("service unavailable"))
    }
}

/// Translator that tags its output so tests can see it ran
pub struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        Ok(format!("[{}->{}] {}", source, target, text))
    }
}

/// Translator that never answers in time
pub struct HangingTranslator;

#[async_trait]
impl Translator for HangingTranslator {
    async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(text.to_string())
    }
}

/// Engine with the default blacklist and policy, no translation
pub fn default_engine() -> DecisionEngine {
    DecisionEngine::new(Blacklist::with_defaults().unwrap(), ContentPolicy::default())
}
