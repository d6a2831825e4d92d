//! Configuration loading, validation, and management for vahed.
//!
//! Loads configuration from `~/.vahed/config.toml` (or an explicit path) with
//! environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Generation providers that run locally and need no API key.
const KEYLESS_PROVIDERS: &[&str] = &["ollama", "vllm", "llamacpp", "llama.cpp"];

/// The root configuration structure.
///
/// Maps directly to `~/.vahed/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generation provider (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Generation provider
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Generation model used by both pipeline stages
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for both pipeline stages
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per generated answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    8192
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("generation", &self.generation)
            .field("corpus", &self.corpus)
            .field("retrieval", &self.retrieval)
            .field("gateway", &self.gateway)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Deadline for a single generation or embedding call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Where the two corpora live on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Line-delimited curriculum records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curriculum_path: Option<PathBuf>,

    /// JSON array of `{text, metadata}` timetable documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Documents retrieved per stage-2 query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// "local" for the sentence-transformer, "hashing" for the offline
    /// bag-of-terms embedder, otherwise a provider name
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: String,

    /// Hugging Face model id for "local", model name for remote providers
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Vector width of the hashing embedder
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

fn default_top_k() -> usize {
    250
}
fn default_embedding_provider() -> String {
    "local".into()
}
fn default_embedding_model() -> String {
    "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2".into()
}
fn default_embedding_dimensions() -> usize {
    384
}
fn default_embed_batch_size() -> usize {
    64
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            embedding_provider: default_embedding_provider(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:8080".into()]
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.vahed/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, then apply process environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides, reading variables through `lookup`.
    ///
    /// - `VAHED_API_KEY`, then `GOOGLE_API_KEY`, then `OPENAI_API_KEY` (only if no key is configured)
    /// - `VAHED_PROVIDER`, `VAHED_MODEL`
    /// - `VAHED_CURRICULUM_FILE` or `JSONL_FILE`
    /// - `VAHED_DOCUMENTS_FILE` or `RAG_FILE`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(k).filter(|v| !v.is_empty()));

        if self.api_key.is_none() {
            self.api_key = first(&["VAHED_API_KEY", "GOOGLE_API_KEY", "OPENAI_API_KEY"]);
        }
        if let Some(provider) = first(&["VAHED_PROVIDER"]) {
            self.provider = provider;
        }
        if let Some(model) = first(&["VAHED_MODEL"]) {
            self.model = model;
        }
        if let Some(path) = first(&["VAHED_CURRICULUM_FILE", "JSONL_FILE"]) {
            self.corpus.curriculum_path = Some(PathBuf::from(path));
        }
        if let Some(path) = first(&["VAHED_DOCUMENTS_FILE", "RAG_FILE"]) {
            self.corpus.documents_path = Some(PathBuf::from(path));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".vahed")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError("retrieval.top_k must be > 0".into()));
        }
        if self.retrieval.embed_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.embed_batch_size must be > 0".into(),
            ));
        }
        if self.retrieval.embedding_dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.embedding_dimensions must be > 0".into(),
            ));
        }
        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generation.timeout_secs must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// The API key for `provider`: its own entry first, then the global key.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| self.api_key.clone())
    }

    /// Whether the generation provider can run without a credential.
    pub fn provider_is_keyless(&self) -> bool {
        KEYLESS_PROVIDERS.contains(&self.provider.as_str())
    }

    /// Check the inputs the server cannot start without: both corpus paths
    /// and, unless the provider is local, an API credential.
    pub fn require_startup_inputs(&self) -> Result<StartupInputs, ConfigError> {
        let curriculum_path = self
            .corpus
            .curriculum_path
            .clone()
            .ok_or(ConfigError::Missing("corpus.curriculum_path (or JSONL_FILE)"))?;
        let documents_path = self
            .corpus
            .documents_path
            .clone()
            .ok_or(ConfigError::Missing("corpus.documents_path (or RAG_FILE)"))?;

        if !self.provider_is_keyless() && self.api_key_for(&self.provider).is_none() {
            return Err(ConfigError::Missing("api_key (or GOOGLE_API_KEY)"));
        }

        Ok(StartupInputs {
            curriculum_path,
            documents_path,
        })
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Resolved corpus paths, guaranteed present.
#[derive(Debug, Clone)]
pub struct StartupInputs {
    pub curriculum_path: PathBuf,
    pub documents_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            generation: GenerationConfig::default(),
            corpus: CorpusConfig::default(),
            retrieval: RetrievalConfig::default(),
            gateway: GatewayConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}
