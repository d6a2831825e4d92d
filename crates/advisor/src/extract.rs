//! Structured-result extraction from the second stage's free text.
//!
//! The generator is asked for a fenced ```json block. The first such block
//! is decoded into course selections. Anything else degrades to an empty
//! list: extraction never fails past this module.

use regex_lite::Regex;
use tracing::{debug, warn};
use vahed_core::{CourseSelection, CourseSelectionResult};

/// Opening fence line, body, closing fence line. Lazy so the first block wins.
const FENCE: &str = r"(?s)```json\r?\n(.*?)\r?\n```";

/// Why an extraction produced no courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// No ```json block in the text
    NoFence,
    /// The block was not a course list
    InvalidJson(String),
}

/// The outcome of scanning a generator answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Parsed(CourseSelectionResult),
    Empty(EmptyReason),
}

impl Extraction {
    /// The extracted courses, or an empty list.
    pub fn into_courses(self) -> CourseSelectionResult {
        match self {
            Extraction::Parsed(courses) => courses,
            Extraction::Empty(_) => Vec::new(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Extraction::Parsed(_))
    }
}

/// Body of the first fenced JSON block, if any.
fn fenced_body(raw: &str) -> Option<&str> {
    let re = Regex::new(FENCE).ok()?;
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Decode the block element by element. A malformed element is skipped,
/// and the block is invalid only when no element survives.
fn decode(body: &str) -> Result<CourseSelectionResult, String> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        // A lone record shaped like the prompt's example.
        one @ serde_json::Value::Object(_) => vec![one],
        other => return Err(format!("expected a JSON array, got {other}")),
    };

    let mut courses = Vec::with_capacity(items.len());
    let mut last_error = None;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<CourseSelection>(item) {
            Ok(course) => courses.push(course),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed course selection");
                last_error = Some(e.to_string());
            }
        }
    }

    match last_error {
        Some(reason) if courses.is_empty() => Err(reason),
        _ => Ok(courses),
    }
}

/// Extract the course list from a generator answer.
pub fn extract(raw: &str) -> Extraction {
    let Some(body) = fenced_body(raw) else {
        warn!(chars = raw.chars().count(), "No fenced JSON block in generator answer");
        return Extraction::Empty(EmptyReason::NoFence);
    };

    match decode(body) {
        Ok(courses) => {
            debug!(count = courses.len(), "Extracted course selections");
            Extraction::Parsed(courses)
        }
        Err(reason) => {
            warn!(error = %reason, "Fenced block is not a valid course list");
            Extraction::Empty(EmptyReason::InvalidJson(reason))
        }
    }
}
