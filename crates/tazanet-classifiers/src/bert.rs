//! Candle-backed BERT toxicity model (`unitary/toxic-bert` and compatible
//! multi-label checkpoints).

use crate::classifier::{ModelOutput, ToxicityModel};
use crate::config::{Activation, BertModelConfig, ModelSource};
use crate::loader::ModelLoader;
use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tazanet_core::{Error, LabelScore, Result};
use tokenizers::{Tokenizer, TruncationDirection};

/// Loads a BERT sequence-classification checkpoint.
pub struct BertToxicityLoader {
    config: BertModelConfig,
}

impl BertToxicityLoader {
    pub fn new(config: BertModelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoader for BertToxicityLoader {
    async fn load(&self) -> Result<Arc<dyn ToxicityModel>> {
        let config = self.config.clone();

        // Downloads and weight mapping block; keep them off the runtime workers.
        let model = tokio::task::spawn_blocking(move || load_model(&config))
            .await
            .map_err(|e| Error::internal(format!("Model loading task failed: {}", e)))??;

        Ok(Arc::new(model))
    }

    fn describe(&self) -> String {
        match &self.config.source {
            ModelSource::Local { path } => format!("bert ({})", path.display()),
            ModelSource::HuggingFace { repo, revision } => format!("bert ({}@{})", repo, revision),
        }
    }
}

fn ml_err(context: &'static str) -> impl Fn(candle_core::Error) -> Error {
    move |e| Error::classifier(format!("{}: {}", context, e))
}

fn load_model(config: &BertModelConfig) -> Result<BertToxicityModel> {
    let model_dir = resolve_model_dir(&config.source)?;
    let device = get_device(&config.device)?;

    let config_path = model_dir.join("config.json");
    let bert_config: BertConfig = parse_json_config(&config_path)?;
    let labels = load_labels(&config_path)?;

    let tokenizer = load_tokenizer(&model_dir)?;
    let vb = load_var_builder(&model_dir, &device)?;

    let model = load_bert_backbone(&vb, &bert_config)?;
    let pooler = load_pooler(&vb, bert_config.hidden_size);
    let classifier = candle_nn::linear(bert_config.hidden_size, labels.len(), vb.pp("classifier"))
        .map_err(ml_err("Failed to load classification head"))?;

    tracing::info!(
        labels = ?labels,
        pooled = pooler.is_some(),
        "Loaded BERT toxicity model from {}",
        model_dir.display()
    );

    Ok(BertToxicityModel {
        name: model_name(&config.source),
        inner: Arc::new(BertInner {
            tokenizer,
            model,
            pooler,
            classifier,
            device,
            labels,
            activation: config.activation,
            max_length: config.max_length,
        }),
    })
}

fn model_name(source: &ModelSource) -> String {
    match source {
        ModelSource::HuggingFace { repo, .. } => repo.clone(),
        ModelSource::Local { path } => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "toxic-bert".to_string()),
    }
}

fn resolve_model_dir(source: &ModelSource) -> Result<PathBuf> {
    match source {
        ModelSource::Local { path } => {
            if !path.exists() {
                return Err(Error::classifier(format!(
                    "Model path does not exist: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace { repo, revision } => download_from_huggingface(repo, revision),
    }
}

fn download_from_huggingface(repo: &str, revision: &str) -> Result<PathBuf> {
    tracing::info!("Downloading model from HuggingFace: {}@{}", repo, revision);

    let mut builder = hf_hub::api::sync::ApiBuilder::new();
    if let Some(cache) = dirs::cache_dir() {
        builder = builder.with_cache_dir(cache.join("tazanet").join("huggingface"));
    }
    let api = builder
        .build()
        .map_err(|e| Error::classifier(format!("Failed to initialize HuggingFace API: {}", e)))?;

    let repo_obj = api.repo(hf_hub::Repo::with_revision(
        repo.to_string(),
        hf_hub::RepoType::Model,
        revision.to_string(),
    ));

    let config_path = repo_obj
        .get("config.json")
        .map_err(|e| Error::classifier(format!("Failed to download config.json: {}", e)))?;

    let has_weights = ["model.safetensors", "pytorch_model.bin"]
        .iter()
        .any(|file| match repo_obj.get(file) {
            Ok(_) => {
                tracing::debug!("Found weight file: {}", file);
                true
            }
            Err(_) => false,
        });
    if !has_weights {
        return Err(Error::classifier(
            "No model weights found (tried model.safetensors, pytorch_model.bin)",
        ));
    }

    let has_tokenizer = ["tokenizer.json", "vocab.txt"]
        .iter()
        .any(|file| repo_obj.get(file).is_ok());
    if !has_tokenizer {
        return Err(Error::classifier(
            "No tokenizer found (tried tokenizer.json, vocab.txt)",
        ));
    }

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::classifier("Invalid cache path"))?;

    tracing::info!("Model available at: {}", model_dir.display());
    Ok(model_dir.to_path_buf())
}

fn get_device(device: &str) -> Result<Device> {
    match device.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0).map_err(ml_err("Failed to initialize CUDA")),
        "mps" | "metal" => Device::new_metal(0).map_err(ml_err("Failed to initialize Metal")),
        _ => Ok(Device::Cpu),
    }
}

fn parse_json_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        Error::classifier(format!("Failed to parse config {}: {}", path.display(), e))
    })
}

#[derive(Deserialize)]
struct LabelConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Labels ordered by class id
fn load_labels(config_path: &Path) -> Result<Vec<String>> {
    let config: LabelConfig = parse_json_config(config_path)?;

    let mut indexed = config
        .id2label
        .into_iter()
        .map(|(id, label)| {
            id.parse::<usize>()
                .map(|id| (id, label))
                .map_err(|_| Error::classifier(format!("Invalid label id '{}' in id2label", id)))
        })
        .collect::<Result<Vec<_>>>()?;

    if indexed.is_empty() {
        return Err(Error::classifier("config.json has no id2label mapping"));
    }

    indexed.sort_by_key(|(id, _)| *id);
    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_json = model_dir.join("tokenizer.json");
    if tokenizer_json.exists() {
        return Tokenizer::from_file(&tokenizer_json)
            .map_err(|e| Error::classifier(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab_path = model_dir.join("vocab.txt");
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|e| Error::classifier(format!("Failed to build WordPiece model: {}", e)))?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
        tokenizer.with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), 102),
            ("[CLS]".to_string(), 101),
        )));

        return Ok(tokenizer);
    }

    Err(Error::classifier(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_dir.display()
    )))
}

fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the weights file is not modified while the mapping is alive.
        return unsafe {
            VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)
                .map_err(ml_err("Failed to load weights"))
        };
    }

    let pytorch = model_dir.join("pytorch_model.bin");
    if pytorch.exists() {
        return VarBuilder::from_pth(&pytorch, DType::F32, device)
            .map_err(ml_err("Failed to load weights"));
    }

    Err(Error::classifier(format!(
        "No weights in {} (tried model.safetensors, pytorch_model.bin)",
        model_dir.display()
    )))
}

fn load_bert_backbone(vb: &VarBuilder, config: &BertConfig) -> Result<BertModel> {
    let mut errors = Vec::new();

    for prefix in ["bert", ""] {
        let vb_prefix = if prefix.is_empty() { vb.clone() } else { vb.pp(prefix) };

        match BertModel::load(vb_prefix, config) {
            Ok(model) => return Ok(model),
            Err(e) => {
                let effective_prefix = if prefix.is_empty() { "<root>" } else { prefix };
                errors.push(format!("{}: {}", effective_prefix, e));
            }
        }
    }

    Err(Error::classifier(format!(
        "Failed to load BERT backbone with tried prefixes [{}]",
        errors.join(" | ")
    )))
}

fn load_pooler(vb: &VarBuilder, hidden_size: usize) -> Option<Linear> {
    for prefix in ["bert.pooler.dense", "pooler.dense"] {
        let mut vb_prefix = vb.clone();
        for part in prefix.split('.') {
            vb_prefix = vb_prefix.pp(part);
        }
        if let Ok(linear) = candle_nn::linear(hidden_size, hidden_size, vb_prefix) {
            return Some(linear);
        }
    }

    tracing::warn!("No pooler weights found, classifying the raw [CLS] embedding");
    None
}

fn activate(logits: &[f32], activation: Activation) -> Vec<f32> {
    match activation {
        Activation::Sigmoid => logits.iter().map(|x| 1.0 / (1.0 + (-x).exp())).collect(),
        Activation::Softmax => {
            let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
            let sum: f32 = exps.iter().sum();
            exps.into_iter().map(|e| e / sum).collect()
        }
    }
}

struct BertInner {
    tokenizer: Tokenizer,
    model: BertModel,
    pooler: Option<Linear>,
    classifier: Linear,
    device: Device,
    labels: Vec<String>,
    activation: Activation,
    max_length: usize,
}

impl BertInner {
    fn forward(&self, text: &str) -> Result<Vec<LabelScore>> {
        let mut encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))?;
        encoding.truncate(self.max_length, 0, TruncationDirection::Right);

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(ml_err("Failed to create input tensor"))?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(ml_err("Failed to create token type tensor"))?;

        let hidden_states = self
            .model
            .forward(&input_ids, &token_type_ids, None)
            .map_err(ml_err("Model forward pass failed"))?;

        let cls = hidden_states
            .i((.., 0, ..))
            .map_err(ml_err("Failed to get CLS token"))?;

        let pooled = match &self.pooler {
            Some(pooler) => pooler
                .forward(&cls)
                .and_then(|t| t.tanh())
                .map_err(ml_err("Pooler failed"))?,
            None => cls,
        };

        let logits: Vec<f32> = self
            .classifier
            .forward(&pooled)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1())
            .map_err(ml_err("Classification head failed"))?;

        Ok(self
            .labels
            .iter()
            .zip(activate(&logits, self.activation))
            .map(|(label, score)| LabelScore::new(label.clone(), f64::from(score)))
            .collect())
    }
}

/// BERT multi-label toxicity model
pub struct BertToxicityModel {
    name: String,
    inner: Arc<BertInner>,
}

#[async_trait]
impl ToxicityModel for BertToxicityModel {
    async fn classify(&self, text: &str) -> Result<ModelOutput> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();

        let scores = tokio::task::spawn_blocking(move || inner.forward(&text))
            .await
            .map_err(|e| Error::internal(format!("Inference task failed: {}", e)))??;

        Ok(ModelOutput::Nested(vec![scores
            .into_iter()
            .map(Into::into)
            .collect()]))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
