//! Local hashing embedder.
//!
//! Generates fixed-dimension vectors by hashing terms into buckets and
//! weighting by term frequency. Deterministic, needs no network, and handles
//! Persian text: Arabic letter variants and Eastern digits are folded before
//! hashing so `"ترم ۳"` and `"ترم 3"` share terms.

use async_trait::async_trait;
use std::collections::HashMap;
use vahed_core::error::ProviderError;
use vahed_core::provider::*;

/// A deterministic bag-of-terms embedder.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Hash a term into a bucket index using FNV-1a.
    fn bucket(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    fn fold(c: char) -> char {
        match c {
            'ي' | 'ى' => 'ی',
            'ك' => 'ک',
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            _ => c,
        }
    }

    /// Split text into lowercase terms of at least two characters.
    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.chars().count() >= 2)
            .map(|s| s.chars().map(Self::fold).collect::<String>().to_lowercase())
            .collect()
    }

    /// Embed one text.
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let tokens = Self::tokenize(text);
        let mut vec = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in &tf {
            // Longer terms carry more signal than short function words.
            let weight = 1.0 + (term.chars().count() as f32).ln();
            vec[Self::bucket(term, self.dimensions)] += count / total * weight;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl Provider for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            "the hashing embedder cannot generate text".into(),
        ))
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        let embeddings = request.inputs.iter().map(|t| self.vector(t)).collect();
        Ok(EmbeddingResponse {
            embeddings,
            model: format!("hashing-{}", self.dimensions),
            usage: None,
        })
    }
}
