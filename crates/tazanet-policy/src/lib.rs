//! TazaNet Policy
//!
//! The decision engine and the policy it applies.
//!
//! - [`DecisionEngine`] composes blacklist, toxicity scores, and the age
//!   class into a SAFE / WARN / DENY verdict
//! - [`ContentPolicy`] holds the bad labels, threshold, critical labels,
//!   and the posture while the model is loading
//! - [`VerdictAction`] maps a verdict onto what the shell does next

pub mod action;
pub mod engine;
pub mod policy;

pub use action::{SearchTarget, VerdictAction, DENIED_ANNOUNCEMENT, GRANTED_ANNOUNCEMENT};
pub use engine::{compose_verdict, DecisionEngine, BLACKLIST_REASON, LOADING_REASON, MODEL_ERROR_PREFIX};
pub use policy::{ContentPolicy, LoadingPosture, DEFAULT_BAD_LABELS, DEFAULT_CRITICAL_LABELS};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{SearchTarget, VerdictAction};
    pub use crate::engine::DecisionEngine;
    pub use crate::policy::{ContentPolicy, LoadingPosture};
}
