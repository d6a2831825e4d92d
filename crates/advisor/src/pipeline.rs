//! The full advisor pipeline: validate, advise, filter, extract.

use std::sync::Arc;
use tracing::{info, warn};
use vahed_core::provider::Provider;
use vahed_core::{CourseSelectionRequest, CourseSelectionResult};
use vahed_corpus::CurriculumCorpus;
use vahed_index::{ScoredDocument, VectorIndex};

use crate::candidate::{CandidateAdvisor, CandidateList};
use crate::extract::{self, EmptyReason, Extraction};
use crate::schedule::ScheduleFilter;

/// Generation parameters shared by both stages.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Documents retrieved per stage-2 query
    pub top_k: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            temperature: 0.7,
            max_tokens: None,
            top_k: 250,
        }
    }
}

/// How a plan's course list came about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatus {
    /// Courses were extracted from the stage-2 answer
    Extracted,
    /// The stage-2 answer held no usable course list
    Degraded(EmptyReason),
    /// No availability was declared, so no stage ran
    NoAvailability,
}

/// The result of one pipeline run, with its intermediate payloads.
#[derive(Debug, Clone)]
pub struct Plan {
    pub courses: CourseSelectionResult,
    pub candidates: Option<CandidateList>,
    pub answer: Option<String>,
    pub retrieved: Vec<ScoredDocument>,
    pub status: PlanStatus,
}

/// Runs stage 1 and stage 2 over the process-wide corpus and index.
pub struct CoursePlanner {
    corpus: Arc<CurriculumCorpus>,
    index: Arc<VectorIndex>,
    advisor: CandidateAdvisor,
    filter: ScheduleFilter,
}

impl CoursePlanner {
    pub fn new(
        corpus: Arc<CurriculumCorpus>,
        index: Arc<VectorIndex>,
        generator: Arc<dyn Provider>,
        settings: GenerationSettings,
    ) -> Self {
        let mut advisor =
            CandidateAdvisor::new(generator.clone(), &settings.model, settings.temperature);
        let mut filter = ScheduleFilter::new(
            generator,
            index.clone(),
            &settings.model,
            settings.temperature,
            settings.top_k,
        );
        if let Some(max_tokens) = settings.max_tokens {
            advisor = advisor.with_max_tokens(max_tokens);
            filter = filter.with_max_tokens(max_tokens);
        }

        Self {
            corpus,
            index,
            advisor,
            filter,
        }
    }

    pub fn corpus(&self) -> &CurriculumCorpus {
        &self.corpus
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Recommend schedule-compatible courses for one request.
    ///
    /// Errors only on an invalid request or a failed provider call. A
    /// malformed stage-2 answer yields an empty course list instead.
    pub async fn plan(&self, request: &CourseSelectionRequest) -> vahed_core::Result<Plan> {
        request.validate()?;

        if request.has_no_availability() {
            info!(program = %request.program, term = request.term, "No availability declared, skipping generation");
            return Ok(Plan {
                courses: Vec::new(),
                candidates: None,
                answer: None,
                retrieved: Vec::new(),
                status: PlanStatus::NoAvailability,
            });
        }

        let candidates = self
            .advisor
            .advise(
                self.corpus.text(),
                &request.program,
                request.term,
                &request.course,
            )
            .await?;

        let scheduled = self.filter.filter(&candidates, &request.time).await?;

        let (courses, status) = match extract::extract(&scheduled.answer) {
            Extraction::Parsed(courses) => (courses, PlanStatus::Extracted),
            Extraction::Empty(reason) => {
                warn!(?reason, "Returning an empty course list");
                (Vec::new(), PlanStatus::Degraded(reason))
            }
        };

        info!(
            program = %request.program,
            term = request.term,
            courses = courses.len(),
            "Plan complete"
        );

        Ok(Plan {
            courses,
            candidates: Some(candidates),
            answer: Some(scheduled.answer),
            retrieved: scheduled.retrieved,
            status,
        })
    }
}
