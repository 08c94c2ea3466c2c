//! Sentence embeddings for folio.
//!
//! [`BertEmbedder`] runs a local BERT sentence-transformer (all-MiniLM-L6-v2
//! by default) through candle and mean-pools the token states into
//! L2-normalized vectors. [`FakeEmbedder`] is a deterministic hashing stand-in
//! used by tests and by `APP_USE_FAKE_EMBEDDINGS=1`.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use folio_core::traits::Embedder;

mod device;
mod fake;
mod pool;
mod tokenize;

pub use device::select_device;
pub use fake::FakeEmbedder;
pub use pool::masked_mean_l2;
pub use tokenize::{tokenize_on_device, Encoded};

pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_MAX_LEN: usize = 256;
/// Output dimension of all-MiniLM-L6-v2, also used by the fake embedder.
pub const DEFAULT_DIM: usize = 384;

pub struct BertEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl BertEmbedder {
    pub fn new(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        tracing::info!("Loading sentence embedding model from {}", model_dir.display());
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)
            .with_context(|| format!("Invalid model config {}", config_path.display()))?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;

        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        tracing::info!("Embedding model ready (dim={}, max_len={})", dim, max_len);
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let enc = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let hidden_states = self.model.forward(&enc.input_ids, &enc.token_type_ids, Some(&enc.attention_mask))?;
        let pooled = masked_mean_l2(&hidden_states, &enc.attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_dtype(DType::F32)?.to_vec1()?;
        if emb.len() != self.dim {
            return Err(anyhow!("model produced {} values, expected {}", emb.len(), self.dim));
        }
        if start.elapsed().as_millis() > 100 { tracing::debug!("Slow embedding: {:?}", start.elapsed()); }
        Ok(emb)
    }
}

impl Embedder for BertEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

/// Prefer `model.safetensors`, fall back to the PyTorch pickle.
fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the weights file is opened read-only and not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)? };
        return Ok(vb);
    }
    let weights_path = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&weights_path)
        .with_context(|| format!("Failed to read weights from {}", weights_path.display()))?;
    let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
    Ok(VarBuilder::from_tensors(weights_map, DType::F32, device))
}

/// Pick the embedder for this process.
///
/// `APP_USE_FAKE_EMBEDDINGS=1` selects the [`FakeEmbedder`]; otherwise the
/// BERT model is loaded from `model_dir` or the usual fallbacks.
pub fn get_default_embedder(model_dir: Option<&Path>, max_len: usize) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    if use_fake { tracing::warn!("Using FakeEmbedder"); return Ok(Box::new(FakeEmbedder::new(DEFAULT_DIM))); }
    let dir = resolve_model_dir(model_dir)?;
    Ok(Box::new(BertEmbedder::new(&dir, max_len)?))
}

fn resolve_model_dir(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = configured {
        if p.exists() { return Ok(p.to_path_buf()); }
        tracing::warn!("Configured model dir {} does not exist", p.display());
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { let p = PathBuf::from(&dir); if p.exists() { tracing::info!("Using {}: {}", var, p.display()); return Ok(p); } }
    }
    let local = Path::new("models").join(DEFAULT_MODEL_NAME); if local.exists() { return Ok(local); }
    let parent = Path::new("..").join("models").join(DEFAULT_MODEL_NAME); if parent.exists() { return Ok(parent); }
    Err(anyhow!("Could not locate the {} model directory", DEFAULT_MODEL_NAME))
}
