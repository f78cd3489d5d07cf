//! Speech input seam
//!
//! A recognized transcript is submitted exactly like a typed query. A
//! failed recognition announces [`SPEECH_FAILURE_ANNOUNCEMENT`] and yields
//! no verdict.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use tazanet_core::{Error, Result};

/// Spoken when audio could not be turned into text
pub const SPEECH_FAILURE_ANNOUNCEMENT: &str = "Could not understand audio.";

/// Speech recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Recognition language hint
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "ru-RU".to_string()
}

/// Turns one utterance into text
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, language: &str) -> Result<String>;
}

/// Recognizer that replays prepared transcripts in order
#[derive(Default)]
pub struct QueuedRecognizer {
    transcripts: Mutex<VecDeque<String>>,
}

impl QueuedRecognizer {
    pub fn new<I, S>(transcripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            transcripts: Mutex::new(transcripts.into_iter().map(Into::into).collect()),
        }
    }

    /// One transcript per line
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(content.lines()))
    }

    pub fn remaining(&self) -> usize {
        self.transcripts.lock().len()
    }
}

#[async_trait]
impl SpeechRecognizer for QueuedRecognizer {
    async fn recognize(&self, _language: &str) -> Result<String> {
        let next = self.transcripts.lock().pop_front();

        match next {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(Error::internal("no speech in utterance")),
            None => Err(Error::internal("no audio input available")),
        }
    }
}
