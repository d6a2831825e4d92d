//! # vahed core
//!
//! Domain types, traits, and error definitions for the vahed course-registration
//! advisor. This crate has **no framework dependencies**: it defines the domain
//! model that every other crate implements against.
//!
//! ## Layout
//!
//! - [`course`]: curriculum records, retrieval documents, and the
//!   request/response contract of the advisor
//! - [`timeslot`]: `HH:MM-HH:MM` availability intervals
//! - [`provider`]: the capability trait over generation and embedding backends
//! - [`message`]: prompt messages sent to a provider
//! - [`error`]: one error enum per bounded context

pub mod course;
pub mod error;
pub mod message;
pub mod provider;
pub mod timeslot;

// Re-export key types at crate root for ergonomics
pub use course::{
    CourseSelection, CourseSelectionRequest, CourseSelectionResult, CurriculumRecord,
    RetrievalDocument, TimeMap, NONE_MARKER,
};
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use timeslot::TimeSlot;
