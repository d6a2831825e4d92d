//! One-time startup: load both corpora, build the index, wire the planner.
//!
//! Everything built here is read-only for the life of the process. Any
//! failure is fatal: the server does not start without a complete corpus,
//! a built index and a generation provider.

use std::sync::Arc;
use tracing::info;
use vahed_advisor::{CoursePlanner, GenerationSettings};
use vahed_config::AppConfig;
use vahed_core::provider::Provider;
use vahed_core::Error;
use vahed_corpus::{load_documents, CurriculumCorpus};
use vahed_index::{IndexOptions, VectorIndex};
use vahed_providers::ProviderRouter;

fn config_error(message: impl ToString) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

/// Build the planner with the configured generation provider.
pub async fn bootstrap(config: &AppConfig) -> vahed_core::Result<Arc<CoursePlanner>> {
    let router = vahed_providers::build_from_config(config);
    let generator = router
        .generator(config)
        .ok_or_else(|| config_error(format!("No provider registered for '{}'", config.provider)))?;
    assemble(config, &router, generator).await
}

/// Build the planner around an explicit generation provider.
pub async fn bootstrap_with_generator(
    config: &AppConfig,
    generator: Arc<dyn Provider>,
) -> vahed_core::Result<Arc<CoursePlanner>> {
    let router = vahed_providers::build_from_config(config);
    assemble(config, &router, generator).await
}

async fn assemble(
    config: &AppConfig,
    router: &ProviderRouter,
    generator: Arc<dyn Provider>,
) -> vahed_core::Result<Arc<CoursePlanner>> {
    let inputs = config.require_startup_inputs().map_err(config_error)?;

    let corpus = CurriculumCorpus::load(&inputs.curriculum_path)?;
    let documents = load_documents(&inputs.documents_path)?;

    let embedder = router.embedder(config).ok_or_else(|| {
        config_error(format!(
            "No provider registered for embeddings '{}'",
            config.retrieval.embedding_provider
        ))
    })?;

    let index = VectorIndex::build(
        documents,
        embedder,
        IndexOptions {
            batch_size: config.retrieval.embed_batch_size,
            model: config.retrieval.embedding_model.clone(),
        },
    )
    .await?;

    info!(
        records = corpus.len(),
        skipped = corpus.skipped(),
        documents = index.len(),
        generator = %generator.name(),
        model = %config.model,
        "Advisor ready"
    );

    let settings = GenerationSettings {
        model: config.model.clone(),
        temperature: config.temperature,
        max_tokens: Some(config.max_tokens),
        top_k: config.retrieval.top_k,
    };

    Ok(Arc::new(CoursePlanner::new(
        Arc::new(corpus),
        Arc::new(index),
        generator,
        settings,
    )))
}
