//! Age signal
//!
//! The current age class lives in a single-slot cell: one producer (the
//! face sampling loop or the shell) overwrites it, and every query reads the
//! latest value. Reads never block and never see a torn value.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tazanet_core::{AgeClass, Error, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Age detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeConfig {
    /// Class assumed before any face has been seen
    #[serde(default)]
    pub initial: AgeClass,

    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// A face narrower than this height/width ratio reads as a child
    #[serde(default = "default_child_face_ratio")]
    pub child_face_ratio: f32,

    /// Faces at least this wide (pixels) are never a child
    #[serde(default = "default_child_face_max_width")]
    pub child_face_max_width: u32,
}

impl Default for AgeConfig {
    fn default() -> Self {
        Self {
            initial: AgeClass::default(),
            sample_interval_ms: default_sample_interval_ms(),
            child_face_ratio: default_child_face_ratio(),
            child_face_max_width: default_child_face_max_width(),
        }
    }
}

impl AgeConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn heuristic(&self) -> AgeHeuristic {
        AgeHeuristic {
            child_face_ratio: self.child_face_ratio,
            child_face_max_width: self.child_face_max_width,
        }
    }
}

fn default_sample_interval_ms() -> u64 {
    33
}

fn default_child_face_ratio() -> f32 {
    1.15
}

fn default_child_face_max_width() -> u32 {
    180
}

/// A detected face, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl FaceBox {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

impl std::str::FromStr for FaceBox {
    type Err = String;

    /// Parse `x,y,w,h`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid face box '{}': {}", s, e))?;

        match parts.as_slice() {
            [x, y, w, h] => Ok(Self::new(*x, *y, *w, *h)),
            _ => Err(format!("face box '{}' needs four values", s)),
        }
    }
}

/// Face-geometry age classifier
#[derive(Debug, Clone, Copy)]
pub struct AgeHeuristic {
    pub child_face_ratio: f32,
    pub child_face_max_width: u32,
}

impl Default for AgeHeuristic {
    fn default() -> Self {
        AgeConfig::default().heuristic()
    }
}

impl AgeHeuristic {
    /// CHILD if any face is both round and small, ADULT otherwise
    pub fn classify(&self, faces: &[FaceBox]) -> AgeClass {
        let child = faces.iter().any(|face| {
            face.w > 0
                && (face.h as f32 / face.w as f32) < self.child_face_ratio
                && face.w < self.child_face_max_width
        });

        if child {
            AgeClass::Child
        } else {
            AgeClass::Adult
        }
    }
}

/// Latest-value cell holding the current age class
pub struct AgeSignal {
    current: watch::Sender<AgeClass>,
}

impl AgeSignal {
    pub fn new(initial: AgeClass) -> Arc<Self> {
        let (current, _) = watch::channel(initial);
        Arc::new(Self { current })
    }

    /// The latest published class
    pub fn get(&self) -> AgeClass {
        *self.current.borrow()
    }

    /// Overwrite the current class
    pub fn set(&self, age: AgeClass) {
        let previous = self.current.send_replace(age);
        if previous != age {
            info!(from = %previous, to = %age, "Age class changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AgeClass> {
        self.current.subscribe()
    }
}

/// Source of per-frame face detections
#[async_trait]
pub trait FaceSource: Send {
    /// Faces in the next frame.
    ///
    /// `Ok(None)` means the source is closed. An error skips the frame.
    async fn next_faces(&mut self) -> Result<Option<Vec<FaceBox>>>;
}

/// Face detections replayed from text, one frame per line.
///
/// Each line holds `x,y,w,h` boxes separated by `;`. An empty line is a
/// frame with no faces.
pub struct LineFaceSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LineFaceSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl LineFaceSource<BufReader<tokio::fs::File>> {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::new(BufReader::new(file)))
    }
}

/// Parse one frame of `x,y,w,h;x,y,w,h`
pub fn parse_frame(line: &str) -> Result<Vec<FaceBox>> {
    line.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<FaceBox>().map_err(Error::config))
        .collect()
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> FaceSource for LineFaceSource<R> {
    async fn next_faces(&mut self) -> Result<Option<Vec<FaceBox>>> {
        match self.lines.next_line().await? {
            Some(line) => parse_frame(&line).map(Some),
            None => Ok(None),
        }
    }
}

/// Sample `source` every `interval` and publish the class to `signal`.
///
/// Stops when the source closes.
pub fn spawn_age_producer(
    mut source: Box<dyn FaceSource>,
    heuristic: AgeHeuristic,
    signal: Arc<AgeSignal>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match source.next_faces().await {
                Ok(Some(faces)) => signal.set(heuristic.classify(&faces)),
                Ok(None) => {
                    info!("Face source closed, age sampling stopped");
                    break;
                }
                Err(e) => debug!(error = %e, "Skipping unreadable frame"),
            }
        }
    })
}
