//! Corpus loading for vahed.
//!
//! Two read-only sources are loaded once at startup:
//! - the curriculum, a line-delimited file of [`CurriculumRecord`]s rendered
//!   into one text block for the stage-1 prompt;
//! - the timetable documents, a JSON array of [`RetrievalDocument`]s that
//!   feed the vector index.
//!
//! [`CurriculumRecord`]: vahed_core::CurriculumRecord
//! [`RetrievalDocument`]: vahed_core::RetrievalDocument

pub mod curriculum;
pub mod documents;

pub use curriculum::{render_record, CurriculumCorpus};
pub use documents::{load_documents, parse_documents};
