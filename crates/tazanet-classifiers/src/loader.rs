//! Extension point for toxicity model loading.

use crate::classifier::ToxicityModel;
use crate::config::{ClassifierConfig, ModelBackend};
use crate::toxicity::LexiconToxicityModel;
use std::sync::Arc;
use tazanet_core::Result;

/// Pluggable backend that produces a ready-to-use toxicity model.
///
/// Loading may be slow (downloads, weight mapping); it is always driven by
/// [`crate::lifecycle::ModelLifecycle`] off the caller's task.
#[async_trait::async_trait]
pub trait ModelLoader: Send + Sync {
    /// Load the model.
    async fn load(&self) -> Result<Arc<dyn ToxicityModel>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Loader for [`LexiconToxicityModel`]
#[derive(Debug, Default)]
pub struct LexiconLoader;

#[async_trait::async_trait]
impl ModelLoader for LexiconLoader {
    async fn load(&self) -> Result<Arc<dyn ToxicityModel>> {
        Ok(Arc::new(LexiconToxicityModel::new()))
    }

    fn describe(&self) -> String {
        "lexicon".to_string()
    }
}

/// Pick the loader for the configured backend
pub fn loader_from_config(config: &ClassifierConfig) -> Result<Arc<dyn ModelLoader>> {
    match config.backend {
        ModelBackend::Lexicon => Ok(Arc::new(LexiconLoader)),
        #[cfg(feature = "ml-models")]
        ModelBackend::Bert => Ok(Arc::new(crate::bert::BertToxicityLoader::new(
            config.model.clone(),
        ))),
        #[cfg(not(feature = "ml-models"))]
        ModelBackend::Bert => Err(tazanet_core::Error::config(
            "BERT backend requires the `ml-models` feature",
        )),
    }
}
