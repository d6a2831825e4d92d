//! Stage 1: the constraint-aware course advisor.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use vahed_core::error::ProviderError;
use vahed_core::provider::{Provider, ProviderRequest};

use crate::prompts;

/// The first stage's free-text answer.
///
/// Opaque by contract: it is passed verbatim into the second stage's query
/// and never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList(String);

impl CandidateList {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Asks the generator which courses a student should register for.
pub struct CandidateAdvisor {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl CandidateAdvisor {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }

    /// Cap the answer length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// One generation call over the whole curriculum.
    pub async fn advise(
        &self,
        curriculum: &str,
        program: &str,
        term: i64,
        outstanding: &[String],
    ) -> Result<CandidateList, ProviderError> {
        let prompt = prompts::candidate_prompt(curriculum, program, term, outstanding);

        info!(
            model = %self.model,
            program = %program,
            term,
            outstanding = outstanding.len(),
            "Stage 1: requesting candidate courses"
        );

        let mut request = ProviderRequest::prompt(&self.model, prompt, self.temperature);
        request.max_tokens = self.max_tokens;

        let response = self.provider.complete(request).await?;
        debug!(chars = response.message.content.chars().count(), "Stage 1: candidates received");

        Ok(CandidateList::new(response.message.content))
    }
}
