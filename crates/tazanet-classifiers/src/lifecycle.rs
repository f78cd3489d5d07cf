//! Toxicity model lifecycle
//!
//! The model is expensive to initialize, so it is loaded by a single
//! background task:
//!
//! ```text
//! UNLOADED --start()--> LOADING --ok--> READY
//!                               \--err-> ERROR
//! ```
//!
//! READY and ERROR are terminal; a failed load is not retried. Nothing here
//! blocks the caller: readiness is polled with [`ModelLifecycle::is_ready`]
//! or observed through [`ModelLifecycle::watch`] and
//! [`ModelLifecycle::subscribe`].

use crate::classifier::ToxicityModel;
use crate::loader::ModelLoader;
use std::sync::{Arc, OnceLock};
use tazanet_core::{Error, ModelState, Result};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Notification emitted on every lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Loading,
    Ready { model: String },
    Failed { message: String },
}

impl LifecycleEvent {
    /// Text for the status display
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Loading => ModelState::Loading.status_label(),
            Self::Ready { .. } => ModelState::Ready.status_label(),
            Self::Failed { .. } => ModelState::Error.status_label(),
        }
    }
}

/// Owner of the toxicity model and its load state
pub struct ModelLifecycle {
    state: watch::Sender<ModelState>,
    model: OnceLock<Arc<dyn ToxicityModel>>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl ModelLifecycle {
    /// A lifecycle in UNLOADED
    pub fn new() -> Arc<Self> {
        let (state, _) = watch::channel(ModelState::Unloaded);
        let (events, _) = broadcast::channel(16);

        Arc::new(Self {
            state,
            model: OnceLock::new(),
            events,
        })
    }

    /// A lifecycle that is already READY with the given model
    pub fn preloaded(model: Arc<dyn ToxicityModel>) -> Arc<Self> {
        let lifecycle = Self::new();
        let _ = lifecycle.model.set(model);
        lifecycle.state.send_replace(ModelState::Ready);
        lifecycle
    }

    /// Move UNLOADED -> LOADING and load the model in the background.
    ///
    /// Returns the handle of the loading task. Fails if the lifecycle has
    /// already been started.
    pub fn start(self: &Arc<Self>, loader: Arc<dyn ModelLoader>) -> Result<JoinHandle<()>> {
        let started = self.state.send_if_modified(|state| {
            if *state == ModelState::Unloaded {
                *state = ModelState::Loading;
                true
            } else {
                false
            }
        });

        if !started {
            return Err(Error::internal(format!(
                "model lifecycle already started (state: {})",
                self.state()
            )));
        }

        info!(loader = %loader.describe(), "Loading toxicity model");
        self.emit(LifecycleEvent::Loading);

        let lifecycle = Arc::clone(self);
        Ok(tokio::spawn(async move {
            // Run the load in its own task so a panicking loader still ends in ERROR.
            let outcome = tokio::spawn(async move { loader.load().await }).await;

            match outcome {
                Ok(Ok(model)) => lifecycle.finish_ready(model),
                Ok(Err(e)) => lifecycle.finish_failed(e.to_string()),
                Err(e) => lifecycle.finish_failed(format!("loader task aborted: {}", e)),
            }
        }))
    }

    fn finish_ready(&self, model: Arc<dyn ToxicityModel>) {
        let name = model.name().to_string();
        // Publish the model before the state so READY always has one.
        let _ = self.model.set(model);
        self.state.send_replace(ModelState::Ready);

        info!(model = %name, "Toxicity model ready");
        self.emit(LifecycleEvent::Ready { model: name });
    }

    fn finish_failed(&self, message: String) {
        self.state.send_replace(ModelState::Error);

        error!(error = %message, "Toxicity model failed to load");
        self.emit(LifecycleEvent::Failed { message });
    }

    fn emit(&self, event: LifecycleEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Current state
    pub fn state(&self) -> ModelState {
        *self.state.borrow()
    }

    /// True only in READY
    pub fn is_ready(&self) -> bool {
        self.state() == ModelState::Ready
    }

    /// The model, if and only if the lifecycle is READY
    pub fn ready_model(&self) -> Option<Arc<dyn ToxicityModel>> {
        if self.is_ready() {
            self.model.get().cloned()
        } else {
            None
        }
    }

    /// Observe state changes
    pub fn watch(&self) -> watch::Receiver<ModelState> {
        self.state.subscribe()
    }

    /// Subscribe to lifecycle notifications
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Wait until the lifecycle reaches READY or ERROR
    pub async fn settled(&self) -> ModelState {
        let mut rx = self.watch();
        let settled = match rx.wait_for(|state| state.is_terminal()).await {
            Ok(state) => *state,
            // The sender lives in self, so this cannot close while we borrow it
            Err(_) => self.state(),
        };
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelOutput;
    use crate::loader::LexiconLoader;
    use std::time::Duration;

    struct FailingLoader;

    #[async_trait::async_trait]
    impl ModelLoader for FailingLoader {
        async fn load(&self) -> Result<Arc<dyn ToxicityModel>> {
            Err(Error::classifier("weights not found"))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    struct PanickingLoader;

    #[async_trait::async_trait]
    impl ModelLoader for PanickingLoader {
        async fn load(&self) -> Result<Arc<dyn ToxicityModel>> {
            panic!("loader exploded");
        }

        fn describe(&self) -> String {
            "panicking".to_string()
        }
    }

    struct SlowLoader(Duration);

    #[async_trait::async_trait]
    impl ModelLoader for SlowLoader {
        async fn load(&self) -> Result<Arc<dyn ToxicityModel>> {
            tokio::time::sleep(self.0).await;
            LexiconLoader.load().await
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test]
    async fn test_successful_load() {
        let lifecycle = ModelLifecycle::new();
        assert_eq!(lifecycle.state(), ModelState::Unloaded);
        assert!(lifecycle.ready_model().is_none());

        let mut events = lifecycle.subscribe();
        let handle = lifecycle.start(Arc::new(LexiconLoader)).unwrap();
        handle.await.unwrap();

        assert!(lifecycle.is_ready());
        assert_eq!(events.recv().await.unwrap(), LifecycleEvent::Loading);
        let ready = events.recv().await.unwrap();
        assert_eq!(ready.status_label(), "AI SECURE ONLINE");

        let model = lifecycle.ready_model().unwrap();
        let output = model.classify("hello").await.unwrap();
        assert!(matches!(output, ModelOutput::Flat(_)));
    }

    #[tokio::test]
    async fn test_failed_load_is_permanent() {
        let lifecycle = ModelLifecycle::new();
        let mut events = lifecycle.subscribe();

        lifecycle.start(Arc::new(FailingLoader)).unwrap().await.unwrap();

        assert_eq!(lifecycle.state(), ModelState::Error);
        assert!(!lifecycle.is_ready());
        assert!(lifecycle.ready_model().is_none());

        assert_eq!(events.recv().await.unwrap(), LifecycleEvent::Loading);
        match events.recv().await.unwrap() {
            LifecycleEvent::Failed { message } => assert!(message.contains("weights not found")),
            other => panic!("Wrong event: {:?}", other),
        }

        // No retry out of ERROR
        assert!(lifecycle.start(Arc::new(LexiconLoader)).is_err());
        assert_eq!(lifecycle.state(), ModelState::Error);
    }

    #[tokio::test]
    async fn test_panicking_loader_ends_in_error() {
        let lifecycle = ModelLifecycle::new();
        lifecycle.start(Arc::new(PanickingLoader)).unwrap().await.unwrap();
        assert_eq!(lifecycle.state(), ModelState::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_does_not_block() {
        let lifecycle = ModelLifecycle::new();
        let _handle = lifecycle
            .start(Arc::new(SlowLoader(Duration::from_secs(30))))
            .unwrap();

        assert_eq!(lifecycle.state(), ModelState::Loading);
        assert!(lifecycle.ready_model().is_none());
        assert!(lifecycle.start(Arc::new(LexiconLoader)).is_err());

        assert_eq!(lifecycle.settled().await, ModelState::Ready);
        assert!(lifecycle.is_ready());
    }

    #[tokio::test]
    async fn test_preloaded_is_ready() {
        let model = LexiconLoader.load().await.unwrap();
        let lifecycle = ModelLifecycle::preloaded(model);

        assert!(lifecycle.is_ready());
        assert_eq!(lifecycle.settled().await, ModelState::Ready);
        assert!(lifecycle.start(Arc::new(LexiconLoader)).is_err());
    }
}
