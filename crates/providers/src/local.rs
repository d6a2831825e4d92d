//! Local sentence-transformer embedder.
//!
//! Runs a BERT-family model (by default
//! `sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2`) on the CPU
//! through [Candle](https://github.com/huggingface/candle). No API key, no
//! per-call network traffic: weights are fetched once from the Hugging Face
//! Hub and cached by `hf-hub` (`HF_HOME`).
//!
//! Sentence vectors are the attention-masked mean of the last hidden
//! state, L2-normalised.

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::api::sync::Api;
use std::path::PathBuf;
use std::sync::Arc;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use vahed_core::error::ProviderError;
use vahed_core::provider::*;

use crate::pooling::mean_pool;

/// Tokens kept per document; longer timetable sections are truncated.
const MAX_SEQUENCE_LENGTH: usize = 128;

/// A provider that embeds text with a local sentence-transformer.
///
/// The model is loaded lazily on the first `embed` call and shared by
/// every call after that.
pub struct LocalEmbedder {
    model_id: String,
    state: OnceCell<Arc<EmbedderState>>,
}

/// The loaded model state (tokenizer + weights).
struct EmbedderState {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl LocalEmbedder {
    /// Create a new local embedder for a Hugging Face model id.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            state: OnceCell::new(),
        }
    }

    async fn state(&self) -> Result<Arc<EmbedderState>, ProviderError> {
        self.state
            .get_or_try_init(|| async {
                let model_id = self.model_id.clone();
                info!(model = %model_id, "Loading local embedding model on first request...");
                let loaded = tokio::task::spawn_blocking(move || EmbedderState::load(&model_id))
                    .await
                    .map_err(|e| ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Model loading task failed: {e}"),
                    })??;
                Ok(Arc::new(loaded))
            })
            .await
            .cloned()
    }
}

fn map_candle_err(e: candle_core::Error) -> ProviderError {
    ProviderError::ApiError {
        status_code: 500,
        message: format!("Candle inference error: {e}"),
    }
}

fn not_configured(what: &str, e: impl std::fmt::Display) -> ProviderError {
    ProviderError::NotConfigured(format!("Failed to load {what}: {e}"))
}

impl EmbedderState {
    fn load(model_id: &str) -> Result<Self, ProviderError> {
        let device = Device::Cpu;

        let api = Api::new().map_err(|e| {
            ProviderError::Network(format!("Failed to initialize HuggingFace Hub API: {e}"))
        })?;
        let repo = api.model(model_id.to_string());
        let fetch = |file: &str| -> Result<PathBuf, ProviderError> {
            repo.get(file).map_err(|e| {
                ProviderError::Network(format!(
                    "Failed to download '{file}' from '{model_id}': {e}"
                ))
            })
        };

        let config_path = fetch("config.json")?;
        let config: BertConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).map_err(|e| not_configured("model config", e))?,
        )
        .map_err(|e| not_configured("model config", e))?;

        let mut tokenizer = Tokenizer::from_file(fetch("tokenizer.json")?)
            .map_err(|e| not_configured("tokenizer", e))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| not_configured("tokenizer", e))?;

        // Prefer safetensors, fall back to a PyTorch checkpoint
        let vb = match fetch("model.safetensors") {
            Ok(path) => {
                let tensors =
                    candle_core::safetensors::load(&path, &device).map_err(map_candle_err)?;
                VarBuilder::from_tensors(tensors, DTYPE, &device)
            }
            Err(_) => {
                let path = fetch("pytorch_model.bin")?;
                VarBuilder::from_pth(&path, DTYPE, &device).map_err(map_candle_err)?
            }
        };
        let model = BertModel::load(vb, &config).map_err(|e| not_configured("model weights", e))?;

        info!(model = model_id, "Local embedding model loaded successfully");

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(inputs, true)
            .map_err(|e| ProviderError::ApiError {
                status_code: 500,
                message: format!("Tokenization failed: {e}"),
            })?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());
        if seq_len == 0 {
            return Ok(vec![Vec::new(); batch]);
        }

        let ids: Vec<u32> = encodings.iter().flat_map(|e| e.get_ids().to_vec()).collect();
        let mask: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_attention_mask().to_vec())
            .collect();

        debug!(batch, seq_len, "Local embedding forward pass");

        let input_ids = Tensor::from_vec(ids, (batch, seq_len), &self.device).map_err(map_candle_err)?;
        let attention_mask =
            Tensor::from_vec(mask.clone(), (batch, seq_len), &self.device).map_err(map_candle_err)?;
        let token_type_ids = input_ids.zeros_like().map_err(map_candle_err)?;

        let hidden: Vec<Vec<Vec<f32>>> = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(map_candle_err)?
            .to_dtype(DType::F32)
            .map_err(map_candle_err)?
            .to_vec3()
            .map_err(map_candle_err)?;

        Ok(hidden
            .iter()
            .zip(mask.chunks(seq_len))
            .map(|(tokens, mask)| mean_pool(tokens, mask))
            .collect())
    }
}

// ── Provider trait implementation ──────────────────────────────────────

#[async_trait]
impl Provider for LocalEmbedder {
    fn name(&self) -> &str {
        "local"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            "the local embedder cannot generate text".into(),
        ))
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        let state = self.state().await?;

        // Candle is CPU-bound
        let embeddings = tokio::task::spawn_blocking(move || state.embed(request.inputs))
            .await
            .map_err(|e| ProviderError::ApiError {
                status_code: 500,
                message: format!("Embedding task panicked: {e}"),
            })??;

        Ok(EmbeddingResponse {
            embeddings,
            model: self.model_id.clone(),
            usage: None,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        // No network needed once the model is cached
        Ok(true)
    }
}
