//! Stage 2: the schedule retrieval filter.
//!
//! The candidate list and availability map become one query. The query
//! retrieves timetable sections from the index, and the generator answers
//! from those sections alone.

use std::sync::Arc;
use tracing::{debug, info};
use vahed_core::provider::{Provider, ProviderRequest};
use vahed_core::TimeMap;
use vahed_index::{ScoredDocument, VectorIndex};

use crate::candidate::CandidateList;
use crate::prompts;

/// What the second stage produced, before extraction.
#[derive(Debug, Clone)]
pub struct ScheduleAnswer {
    /// The generator's raw answer
    pub answer: String,
    /// The retrieval query, also the question of the final prompt
    pub query: String,
    /// Sections handed to the generator as context
    pub retrieved: Vec<ScoredDocument>,
}

/// Filters candidates down to sections that fit the student's free time.
pub struct ScheduleFilter {
    provider: Arc<dyn Provider>,
    index: Arc<VectorIndex>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    top_k: usize,
}

impl ScheduleFilter {
    pub fn new(
        provider: Arc<dyn Provider>,
        index: Arc<VectorIndex>,
        model: impl Into<String>,
        temperature: f32,
        top_k: usize,
    ) -> Self {
        Self {
            provider,
            index,
            model: model.into(),
            temperature,
            max_tokens: None,
            top_k,
        }
    }

    /// Cap the answer length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Retrieve, then one generation call over the retrieved sections.
    pub async fn filter(
        &self,
        candidates: &CandidateList,
        time: &TimeMap,
    ) -> Result<ScheduleAnswer, vahed_core::Error> {
        let query = prompts::schedule_query(candidates.as_str(), time);

        let retrieved = self.index.retrieve(&query, self.top_k).await?;
        info!(
            top_k = self.top_k,
            retrieved = retrieved.len(),
            "Stage 2: timetable sections retrieved"
        );

        let context = retrieved
            .iter()
            .map(|d| d.document.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut request = ProviderRequest::prompt(
            &self.model,
            prompts::rag_prompt(&context, &query),
            self.temperature,
        );
        request.max_tokens = self.max_tokens;

        let response = self.provider.complete(request).await?;
        debug!(chars = response.message.content.chars().count(), "Stage 2: answer received");

        Ok(ScheduleAnswer {
            answer: response.message.content,
            query,
            retrieved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SequentialMockProvider;
    use vahed_core::error::ProviderError;
    use vahed_core::RetrievalDocument;
    use vahed_index::IndexOptions;
    use vahed_providers::HashingEmbedder;

    async fn index(texts: &[&str]) -> Arc<VectorIndex> {
        let docs = texts.iter().map(|t| RetrievalDocument::new(*t)).collect();
        Arc::new(
            VectorIndex::build(docs, Arc::new(HashingEmbedder::new(256)), IndexOptions::default())
                .await
                .unwrap(),
        )
    }

    fn sunday_morning() -> TimeMap {
        let mut time = TimeMap::new();
        time.insert("Sunday".into(), vec!["08:00-10:00".into(), "10:00-12:00".into()]);
        time
    }

    #[tokio::test]
    async fn context_is_retrieved_texts_joined_by_blank_lines() {
        let index = index(&[
            "Logic Circuits: Sunday 08:00-10:00",
            "Physics 2: Monday 10:00-12:00",
        ])
        .await;
        let provider = Arc::new(SequentialMockProvider::texts(&["```json\n[]\n```"]));
        let filter = ScheduleFilter::new(provider.clone(), index, "gemini-2.5-flash", 0.7, 250);

        let answer = filter
            .filter(&CandidateList::new("Logic Circuits, Physics 2"), &sunday_morning())
            .await
            .unwrap();

        assert_eq!(answer.retrieved.len(), 2);
        assert_eq!(answer.answer, "```json\n[]\n```");

        let prompt = provider.prompt(0);
        let context = format!(
            "{}\n\n{}",
            answer.retrieved[0].document.text, answer.retrieved[1].document.text
        );
        assert_eq!(prompt, prompts::rag_prompt(&context, &answer.query));
        assert!(answer.query.contains("Logic Circuits, Physics 2"));
        assert!(answer.query.contains(r#"{"Sunday":["08:00-10:00","10:00-12:00"]}"#));
    }

    #[tokio::test]
    async fn top_k_bounds_context() {
        let index = index(&["a1 Sunday", "b2 Monday", "c3 Tuesday", "d4 Wednesday"]).await;
        let provider = Arc::new(SequentialMockProvider::texts(&["none"]));
        let filter = ScheduleFilter::new(provider, index, "m", 0.7, 2);

        let answer = filter
            .filter(&CandidateList::new("a1"), &sunday_morning())
            .await
            .unwrap();
        assert_eq!(answer.retrieved.len(), 2);
    }

    #[tokio::test]
    async fn conflicting_sessions_both_reach_the_prompt_in_fixed_order() {
        const SUNDAY: &str = "Logic Circuits: Sunday 08:00-10:00";
        const WEDNESDAY: &str = "Logic Circuits: Wednesday 14:00-16:00";
        let index = index(&[SUNDAY, WEDNESDAY]).await;

        let mut prompts = Vec::new();
        for _ in 0..2 {
            let provider = Arc::new(SequentialMockProvider::texts(&["x"]));
            let filter = ScheduleFilter::new(provider.clone(), index.clone(), "m", 0.7, 250);
            let answer = filter
                .filter(&CandidateList::new("Logic Circuits"), &sunday_morning())
                .await
                .unwrap();

            assert_eq!(answer.retrieved.len(), 2);
            let prompt = provider.prompt(0);
            let first = prompt.find(&answer.retrieved[0].document.text).unwrap();
            let second = prompt.find(&answer.retrieved[1].document.text).unwrap();
            assert!(first < second);
            assert!(answer.retrieved[0].score >= answer.retrieved[1].score);
            prompts.push(prompt);
        }

        assert!(prompts[0].contains(SUNDAY));
        assert!(prompts[0].contains(WEDNESDAY));
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn generation_error_propagates() {
        let index = index(&["Logic Circuits: Sunday 08:00-10:00"]).await;
        let provider = Arc::new(SequentialMockProvider::new(vec![Err(ProviderError::RateLimited {
            retry_after_secs: 5,
        })]));
        let filter = ScheduleFilter::new(provider, index, "m", 0.7, 250);

        let err = filter
            .filter(&CandidateList::new("x"), &sunday_morning())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            vahed_core::Error::Provider(ProviderError::RateLimited { .. })
        ));
    }
}
