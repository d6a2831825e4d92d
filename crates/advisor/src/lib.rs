//! The vahed course advisor.
//!
//! A request flows through two generative stages:
//!
//! 1. [`candidate`]: the whole curriculum plus the student's situation go to
//!    the generator, which answers with a free-text list of courses the
//!    student may take ([`CandidateList`]).
//! 2. [`schedule`]: that list and the student's free time become a retrieval
//!    query over the timetable index. The retrieved sections and the query
//!    go to the generator again, which answers with JSON.
//!
//! [`extract`] pulls the JSON out of the second answer, degrading to an empty
//! list, and [`pipeline`] wires the stages together.

pub mod candidate;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod schedule;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use candidate::{CandidateAdvisor, CandidateList};
pub use extract::{extract, EmptyReason, Extraction};
pub use pipeline::{CoursePlanner, GenerationSettings, Plan, PlanStatus};
pub use schedule::{ScheduleAnswer, ScheduleFilter};
