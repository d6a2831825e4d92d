//! Provider router: selects the correct backend based on config.
//!
//! Handles provider creation and hands out the two capabilities the advisor
//! needs: a text generator and an embedder. Remote providers are bounded by
//! the configured per-call deadline; the in-process embedders are not.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use vahed_core::provider::Provider;

use crate::deadline::DeadlineProvider;
use crate::hashing::HashingEmbedder;
use crate::openai_compat::OpenAiCompatProvider;

/// Name of the offline bag-of-terms embedder.
pub const HASHING: &str = "hashing";

/// Name of the local sentence-transformer embedder.
pub const LOCAL: &str = "local";

/// Routes requests to the correct provider.
#[derive(Default)]
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

fn remote_provider(config: &vahed_config::AppConfig, name: &str) -> Arc<dyn Provider> {
    let api_key = config.api_key_for(name).unwrap_or_default();
    let base_url = config
        .providers
        .get(name)
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(name));
    Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key))
}

#[cfg(feature = "local")]
fn local_embedder(config: &vahed_config::AppConfig) -> Arc<dyn Provider> {
    Arc::new(crate::local::LocalEmbedder::new(&config.retrieval.embedding_model))
}

#[cfg(not(feature = "local"))]
fn local_embedder(config: &vahed_config::AppConfig) -> Arc<dyn Provider> {
    tracing::warn!(
        model = %config.retrieval.embedding_model,
        "Built without the 'local' feature, falling back to the hashing embedder"
    );
    Arc::new(HashingEmbedder::new(config.retrieval.embedding_dimensions))
}

/// Build providers from configuration.
///
/// Every configured `[providers.<name>]` entry is registered, plus the
/// generation provider and the embedding provider if not listed.
pub fn build_from_config(config: &vahed_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new();

    for name in config.providers.keys() {
        router.register(name.clone(), remote_provider(config, name));
    }

    if router.get(&config.provider).is_none() {
        router.register(config.provider.clone(), remote_provider(config, &config.provider));
    }

    let embedding = &config.retrieval.embedding_provider;
    if router.get(embedding).is_none() {
        let provider: Arc<dyn Provider> = match embedding.as_str() {
            HASHING => Arc::new(HashingEmbedder::new(config.retrieval.embedding_dimensions)),
            LOCAL => local_embedder(config),
            _ => remote_provider(config, embedding),
        };
        router.register(embedding.clone(), provider);
    }

    router
}

impl ProviderRouter {
    fn bounded(&self, name: &str, timeout: Duration) -> Option<Arc<dyn Provider>> {
        self.get(name)
            .map(|p| Arc::new(DeadlineProvider::new(p, timeout)) as Arc<dyn Provider>)
    }

    /// The text generator used by both pipeline stages.
    pub fn generator(&self, config: &vahed_config::AppConfig) -> Option<Arc<dyn Provider>> {
        self.bounded(
            &config.provider,
            Duration::from_secs(config.generation.timeout_secs),
        )
    }

    /// The embedder used to index and query the timetable documents.
    pub fn embedder(&self, config: &vahed_config::AppConfig) -> Option<Arc<dyn Provider>> {
        let name = &config.retrieval.embedding_provider;
        if name == HASHING || name == LOCAL {
            return self.get(name);
        }
        self.bounded(name, Duration::from_secs(config.generation.timeout_secs))
    }
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "gemini" => "https://generativelanguage.googleapis.com/v1beta/openai".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vahed_config::{AppConfig, ProviderConfig};

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new();
        router.register("gemini", Arc::new(OpenAiCompatProvider::gemini("key")));

        assert!(router.get("gemini").is_some());
        assert!(router.get("nonexistent").is_none());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("gemini").contains("generativelanguage.googleapis.com"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
        assert_eq!(default_base_url("groq"), "https://groq.api.example.com/v1");
    }

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        let router = build_from_config(&config);
        assert_eq!(router.list(), vec!["gemini", "local"]);

        let generator = router.generator(&config).unwrap();
        assert_eq!(generator.name(), "gemini");
        let embedder = router.embedder(&config).unwrap();
        #[cfg(feature = "local")]
        assert_eq!(embedder.name(), "local");
        #[cfg(not(feature = "local"))]
        assert_eq!(embedder.name(), "hashing");
    }

    #[test]
    fn hashing_embedder_is_selectable() {
        let mut config = AppConfig::default();
        config.retrieval.embedding_provider = HASHING.into();
        let router = build_from_config(&config);
        assert_eq!(router.list(), vec!["gemini", "hashing"]);
        assert_eq!(router.embedder(&config).unwrap().name(), "hashing");
    }

    #[test]
    fn remote_embedder_is_registered() {
        let mut config = AppConfig::default();
        config.retrieval.embedding_provider = "openai".into();
        config.providers.insert(
            "openai".into(),
            ProviderConfig {
                api_key: Some("sk".into()),
                api_url: Some("http://localhost:9999/v1".into()),
            },
        );
        let router = build_from_config(&config);
        assert_eq!(router.embedder(&config).unwrap().name(), "openai");
        assert!(router.list().contains(&"openai"));
        assert!(!router.list().contains(&"hashing"));
        assert!(!router.list().contains(&"local"));
    }

    #[tokio::test]
    async fn hashing_embedder_uses_configured_dimensions() {
        let mut config = AppConfig::default();
        config.retrieval.embedding_provider = HASHING.into();
        config.retrieval.embedding_dimensions = 32;
        let router = build_from_config(&config);
        let embedder = router.embedder(&config).unwrap();
        let response = embedder
            .embed(vahed_core::provider::EmbeddingRequest {
                model: String::new(),
                inputs: vec!["Logic Circuits".into()],
            })
            .await
            .unwrap();
        assert_eq!(response.embeddings[0].len(), 32);
    }
}
