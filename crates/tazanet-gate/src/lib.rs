//! TazaNet Gate
//!
//! Interactive front end for the TazaNet content-safety gate. Every query
//! goes through the decision engine with the current age class, and the
//! verdict is turned into a search dispatch or a block.
//!
//! - [`Gate`] owns the model lifecycle, age signal, and engine
//! - [`SearchDispatcher`] opens the search for allowed queries
//! - [`AgeSignal`] holds the latest age class from face sampling
//! - [`run_shell`] is the line-oriented user interface

pub mod age;
pub mod announcer;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod session;
pub mod shell;
pub mod speech;

pub use age::{
    parse_frame, spawn_age_producer, AgeConfig, AgeHeuristic, AgeSignal, FaceBox, FaceSource,
    LineFaceSource,
};
pub use announcer::{Announcer, TracingAnnouncer};
pub use config::{BlacklistConfig, GateConfig};
pub use dispatcher::{BrowserDispatcher, LogDispatcher, SearchDispatcher};
pub use session::{Gate, Outcome, READY_ANNOUNCEMENT};
pub use shell::{render_outcome, run_shell, Command};
pub use speech::{QueuedRecognizer, SpeechConfig, SpeechRecognizer, SPEECH_FAILURE_ANNOUNCEMENT};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::age::{AgeSignal, FaceSource};
    pub use crate::announcer::Announcer;
    pub use crate::config::GateConfig;
    pub use crate::dispatcher::SearchDispatcher;
    pub use crate::session::Gate;
    pub use crate::speech::SpeechRecognizer;
}
