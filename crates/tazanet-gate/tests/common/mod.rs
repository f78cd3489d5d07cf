//! Shared fixtures for gate tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tazanet_classifiers::{Blacklist, LexiconToxicityModel, ModelLifecycle};
use tazanet_core::{AgeClass, Error, Result};
use tazanet_gate::{AgeSignal, Announcer, FaceBox, FaceSource, Gate, SearchDispatcher};
use tazanet_policy::{ContentPolicy, DecisionEngine, SearchTarget};

/// Announcer that remembers what it said
#[derive(Default)]
pub struct RecordingAnnouncer {
    spoken: Mutex<Vec<String>>,
}

impl RecordingAnnouncer {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.spoken.lock().last().cloned()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, text: &str) {
        self.spoken.lock().push(text.to_string());
    }
}

/// Dispatcher that remembers every URL it was asked to open
#[derive(Default)]
pub struct RecordingDispatcher {
    opened: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingDispatcher {
    /// Dispatcher whose every open fails after recording the URL
    pub fn failing() -> Self {
        Self {
            opened: Mutex::default(),
            fail: true,
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl SearchDispatcher for RecordingDispatcher {
    fn open(&self, url: &url::Url) -> Result<()> {
        self.opened.lock().push(url.to_string());
        if self.fail {
            return Err(Error::internal("no browser available"));
        }
        Ok(())
    }
}

/// Face source fed from a fixed list of reads
pub struct ScriptedFaces {
    frames: VecDeque<Result<Option<Vec<FaceBox>>>>,
}

impl ScriptedFaces {
    pub fn new(frames: Vec<Result<Option<Vec<FaceBox>>>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn unreadable() -> Result<Option<Vec<FaceBox>>> {
        Err(Error::internal("camera frame dropped"))
    }
}

#[async_trait]
impl FaceSource for ScriptedFaces {
    async fn next_faces(&mut self) -> Result<Option<Vec<FaceBox>>> {
        // Exhausted means closed
        self.frames.pop_front().unwrap_or(Ok(None))
    }
}

pub fn child_face() -> FaceBox {
    FaceBox::new(40, 60, 120, 130)
}

pub fn adult_face() -> FaceBox {
    FaceBox::new(40, 60, 200, 260)
}

fn engine() -> DecisionEngine {
    DecisionEngine::new(Blacklist::with_defaults().unwrap(), ContentPolicy::default())
}

/// Gate with the lexicon model already READY
pub fn ready_gate(age: AgeClass) -> (Gate, Arc<RecordingAnnouncer>) {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let gate = Gate::new(
        engine(),
        ModelLifecycle::preloaded(Arc::new(LexiconToxicityModel::new())),
        AgeSignal::new(age),
        announcer.clone(),
        SearchTarget::default(),
    );
    (gate, announcer)
}

/// Gate whose model has not been started
pub fn unloaded_gate(age: AgeClass) -> (Gate, Arc<RecordingAnnouncer>) {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let gate = Gate::new(
        engine(),
        ModelLifecycle::new(),
        AgeSignal::new(age),
        announcer.clone(),
        SearchTarget::default(),
    );
    (gate, announcer)
}
