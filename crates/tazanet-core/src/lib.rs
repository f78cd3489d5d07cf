//! TazaNet Core
//!
//! Core types and error handling shared across TazaNet components.
//!
//! This crate provides:
//! - Age classes, label scores, and model lifecycle states
//! - The `Verdict` returned for every query and the `Decision` that wraps it
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{AgeClass, Decision, DecisionPath, LabelScore, ModelState, Verdict};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{AgeClass, Decision, DecisionPath, LabelScore, ModelState, Verdict};
}
