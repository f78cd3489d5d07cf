//! Gate session
//!
//! Wires the model lifecycle, the age signal, and the decision engine, and
//! turns each decision into an action plus an announcement.

use crate::age::AgeSignal;
use crate::announcer::Announcer;
use crate::config::GateConfig;
use crate::dispatcher::{LogDispatcher, SearchDispatcher};
use crate::speech::{SpeechRecognizer, SPEECH_FAILURE_ANNOUNCEMENT};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tazanet_classifiers::{
    loader_from_config, translator_from_config, Blacklist, LifecycleEvent, ModelLifecycle,
    ModelLoader,
};
use tazanet_core::{AgeClass, Decision, ModelState, Result};
use tazanet_policy::{DecisionEngine, SearchTarget, VerdictAction};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Spoken once the model is ready
pub const READY_ANNOUNCEMENT: &str = "Scanning your face";

const MAX_HISTORY: usize = 100;

/// A decided query and what was done with it
#[derive(Debug, Clone)]
pub struct Outcome {
    pub query: String,
    pub decision: Decision,
    pub action: VerdictAction,
}

/// One interactive session
pub struct Gate {
    engine: DecisionEngine,
    lifecycle: Arc<ModelLifecycle>,
    age: Arc<AgeSignal>,
    announcer: Arc<dyn Announcer>,
    dispatcher: Arc<dyn SearchDispatcher>,
    search: SearchTarget,
    speech_language: String,
    history: RwLock<VecDeque<Outcome>>,
}

impl Gate {
    pub fn new(
        engine: DecisionEngine,
        lifecycle: Arc<ModelLifecycle>,
        age: Arc<AgeSignal>,
        announcer: Arc<dyn Announcer>,
        search: SearchTarget,
    ) -> Self {
        Self {
            engine,
            lifecycle,
            age,
            announcer,
            dispatcher: Arc::new(LogDispatcher),
            search,
            speech_language: "ru-RU".to_string(),
            history: RwLock::new(VecDeque::with_capacity(MAX_HISTORY)),
        }
    }

    /// Replace where allowed searches are sent
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn SearchDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Build an unstarted gate from configuration
    pub fn from_config(config: &GateConfig, announcer: Arc<dyn Announcer>) -> Result<Self> {
        let blacklist = Blacklist::new(&config.blacklist.terms)?;
        let translator = translator_from_config(&config.translator)?;

        let engine = DecisionEngine::new(blacklist, config.policy.clone())
            .with_translator(
                translator,
                config.translator.source.clone(),
                config.translator.target.clone(),
            )
            .with_timeouts(
                Duration::from_millis(config.translator.timeout_ms),
                Duration::from_millis(config.classifier.timeout_ms),
            );

        let mut gate = Self::new(
            engine,
            ModelLifecycle::new(),
            AgeSignal::new(config.age.initial),
            announcer,
            config.search.clone(),
        );
        gate.speech_language = config.speech.language.clone();
        Ok(gate)
    }

    /// Loader for the configured backend
    pub fn loader(config: &GateConfig) -> Result<Arc<dyn ModelLoader>> {
        loader_from_config(&config.classifier)
    }

    /// Begin loading the model in the background
    pub fn start(&self, loader: Arc<dyn ModelLoader>) -> Result<JoinHandle<()>> {
        self.lifecycle.start(loader)
    }

    /// Report lifecycle transitions until the model settles.
    ///
    /// Call before [`Gate::start`] so the LOADING notification is seen.
    pub fn spawn_status_reporter(&self) -> JoinHandle<()> {
        let mut events = self.lifecycle.subscribe();
        let announcer = Arc::clone(&self.announcer);

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        info!(status = event.status_label(), "Model status");
                        match event {
                            LifecycleEvent::Loading => {}
                            LifecycleEvent::Ready { .. } => {
                                announcer.announce(READY_ANNOUNCEMENT);
                                break;
                            }
                            LifecycleEvent::Failed { .. } => break,
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed model status updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Decide on a typed or transcribed query.
    ///
    /// Blank input yields `None` without touching the engine.
    pub async fn submit(&self, query: &str) -> Result<Option<Outcome>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let age = self.age.get();
        let model = self.lifecycle.ready_model();
        let decision = self.engine.decide(query, age, model.as_deref()).await;

        let action = VerdictAction::plan(&decision, query, &self.search)?;
        self.announcer.announce(action.announcement());

        // A dispatch failure still leaves a decided query
        if let VerdictAction::Dispatch { url, .. } = &action {
            if let Err(e) = self.dispatcher.open(url) {
                warn!(error = %e, url = %url, "Failed to dispatch search");
            }
        }

        let outcome = Outcome {
            query: query.to_string(),
            decision,
            action,
        };
        self.record(outcome.clone());
        Ok(Some(outcome))
    }

    /// Take one utterance from `recognizer` and submit it
    pub async fn listen(&self, recognizer: &dyn SpeechRecognizer) -> Result<Option<Outcome>> {
        match recognizer.recognize(&self.speech_language).await {
            Ok(transcript) => {
                info!(transcript = %transcript, "Speech recognized");
                self.submit(&transcript).await
            }
            Err(e) => {
                warn!(error = %e, "Speech recognition failed");
                self.announcer.announce(SPEECH_FAILURE_ANNOUNCEMENT);
                Ok(None)
            }
        }
    }

    fn record(&self, outcome: Outcome) {
        let mut history = self.history.write();
        history.push_front(outcome);
        if history.len() > MAX_HISTORY {
            history.pop_back();
        }
    }

    /// Most recent outcomes, newest first
    pub fn recent(&self, limit: usize) -> Vec<Outcome> {
        self.history.read().iter().take(limit).cloned().collect()
    }

    pub fn status(&self) -> ModelState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &Arc<ModelLifecycle> {
        &self.lifecycle
    }

    pub fn age_signal(&self) -> &Arc<AgeSignal> {
        &self.age
    }

    pub fn age(&self) -> AgeClass {
        self.age.get()
    }
}
