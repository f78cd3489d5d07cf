//! TazaNet Classifiers
//!
//! Everything the decision engine consults about a query's text:
//! - The manual blacklist, checked before any model call
//! - The toxicity model seam and normalization of its raw output
//! - A lexicon model and a Candle BERT model (`ml-models` feature)
//! - The model lifecycle that gates when the model may be used
//! - The translation adapter that brings queries into English

pub mod blacklist;
pub mod classifier;
pub mod config;
pub mod lifecycle;
pub mod loader;
pub mod toxicity;
pub mod translator;

#[cfg(feature = "ml-models")]
pub mod bert;

pub use blacklist::{Blacklist, BlacklistMatch, DEFAULT_BANNED_TERMS};
pub use classifier::{ModelOutput, RawLabelScore, ToxicityModel};
pub use config::{
    Activation, BertModelConfig, ClassifierConfig, ModelBackend, ModelSource, TranslatorConfig,
};
pub use lifecycle::{LifecycleEvent, ModelLifecycle};
pub use loader::{loader_from_config, LexiconLoader, ModelLoader};
pub use toxicity::LexiconToxicityModel;
pub use translator::{translator_from_config, GoogleTranslator, PassthroughTranslator, Translator};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::blacklist::Blacklist;
    pub use crate::classifier::{ModelOutput, ToxicityModel};
    pub use crate::lifecycle::ModelLifecycle;
    pub use crate::loader::ModelLoader;
    pub use crate::translator::Translator;
}
