//! Vector index for vahed.
//!
//! Timetable documents are embedded once at startup and searched by cosine
//! similarity for every stage-2 query. The index is immutable after build.

pub mod index;
pub mod vector;

pub use index::{IndexOptions, ScoredDocument, VectorIndex};
pub use vector::cosine_similarity;
