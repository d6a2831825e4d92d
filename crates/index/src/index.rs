//! The immutable document index.
//!
//! `build` embeds every document through the embedding provider in batches
//! and keeps `(document, vector)` pairs in insertion order. Retrieval is an
//! exhaustive cosine scan, which is exact and fast enough for a timetable of
//! a few thousand sections.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use vahed_core::error::IndexError;
use vahed_core::provider::{EmbeddingRequest, Provider};
use vahed_core::RetrievalDocument;

use crate::vector;

/// How the index talks to its embedder.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Texts sent per embedding call
    pub batch_size: usize,
    /// Embedding model name passed to the provider
    pub model: String,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            batch_size: 64,
            model: String::new(),
        }
    }
}

/// A retrieved document with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub document: RetrievalDocument,
    pub score: f32,
}

struct Entry {
    document: RetrievalDocument,
    embedding: Vec<f32>,
}

/// Nearest-neighbour index over timetable documents.
pub struct VectorIndex {
    entries: Vec<Entry>,
    dimensions: usize,
    embedder: Arc<dyn Provider>,
    options: IndexOptions,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("documents", &self.entries.len())
            .field("dimensions", &self.dimensions)
            .field("embedder", &self.embedder.name())
            .finish()
    }
}

impl VectorIndex {
    /// Embed and insert every document.
    pub async fn build(
        documents: Vec<RetrievalDocument>,
        embedder: Arc<dyn Provider>,
        options: IndexOptions,
    ) -> Result<Self, IndexError> {
        let batch_size = options.batch_size.max(1);
        let mut entries = Vec::with_capacity(documents.len());
        let mut dimensions = 0;

        let mut documents = documents.into_iter().peekable();
        while documents.peek().is_some() {
            let batch: Vec<RetrievalDocument> = documents.by_ref().take(batch_size).collect();
            let inputs: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();

            let response = embedder
                .embed(EmbeddingRequest {
                    model: options.model.clone(),
                    inputs,
                })
                .await?;

            if response.embeddings.len() != batch.len() {
                return Err(IndexError::CountMismatch {
                    expected: batch.len(),
                    actual: response.embeddings.len(),
                });
            }

            for (document, embedding) in batch.into_iter().zip(response.embeddings) {
                if dimensions == 0 {
                    dimensions = embedding.len();
                } else if embedding.len() != dimensions {
                    return Err(IndexError::DimensionMismatch {
                        expected: dimensions,
                        actual: embedding.len(),
                    });
                }
                entries.push(Entry {
                    document,
                    embedding,
                });
            }
            debug!(indexed = entries.len(), "Embedded document batch");
        }

        info!(
            documents = entries.len(),
            dimensions,
            embedder = %embedder.name(),
            "Vector index built"
        );

        Ok(Self {
            entries,
            dimensions,
            embedder,
            options,
        })
    }

    /// The `k` documents nearest to an already-embedded query.
    pub fn search(&self, embedding: &[f32], k: usize) -> Vec<ScoredDocument> {
        vector::rank(self.entries.iter().map(|e| e.embedding.as_slice()), embedding, k)
            .into_iter()
            .map(|(i, score)| ScoredDocument {
                document: self.entries[i].document.clone(),
                score,
            })
            .collect()
    }

    /// Embed `query` and return the `k` nearest documents.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, IndexError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.options.model.clone(),
                inputs: vec![query.to_string()],
            })
            .await?;

        let embedding = response
            .embeddings
            .into_iter()
            .next()
            .ok_or(IndexError::CountMismatch {
                expected: 1,
                actual: 0,
            })?;

        if embedding.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        let results = self.search(&embedding, k);
        debug!(k, returned = results.len(), "Retrieved documents");
        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector width, or 0 for an empty index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}
