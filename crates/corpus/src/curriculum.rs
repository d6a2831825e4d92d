//! Line-delimited curriculum file → rendered text block.
//!
//! Each valid line becomes one Persian paragraph:
//!
//! ```text
//! رشته: {program}
//! ترم: {term}
//! نام درس: {name}
//! تعداد واحد: {units_text}
//! نوع: {type}
//! پیش‌نیازها: {prerequisites, or ندارد}
//! هم‌نیازها: {corequisites, or ندارد}
//! ```
//!
//! Paragraphs end with a newline and are separated by a blank line.

use std::path::Path;
use tracing::{debug, info, warn};
use vahed_core::error::CorpusError;
use vahed_core::{CurriculumRecord, NONE_MARKER};

/// Render a requisite list, or the none-marker when empty.
fn requisites(list: &[String]) -> String {
    if list.is_empty() {
        NONE_MARKER.to_string()
    } else {
        list.join(", ")
    }
}

/// Render one record as a paragraph of the curriculum text block.
pub fn render_record(record: &CurriculumRecord) -> String {
    format!(
        "رشته: {}\nترم: {}\nنام درس: {}\nتعداد واحد: {}\nنوع: {}\nپیش\u{200c}نیازها: {}\nهم\u{200c}نیازها: {}\n",
        record.program,
        record.term,
        record.name,
        record.units_text,
        record.kind,
        requisites(&record.prerequisites),
        requisites(&record.corequisites),
    )
}

/// The loaded curriculum: parsed records plus their rendered text block.
///
/// Built once per process and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct CurriculumCorpus {
    records: Vec<CurriculumRecord>,
    text: String,
    skipped: usize,
}

impl CurriculumCorpus {
    /// Load the curriculum from a line-delimited file.
    ///
    /// A missing or unreadable file is fatal. Malformed lines are not.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        if !path.exists() {
            return Err(CorpusError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CorpusError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let corpus = Self::parse(&content);
        info!(
            path = %path.display(),
            records = corpus.records.len(),
            skipped = corpus.skipped,
            "Curriculum loaded"
        );
        Ok(corpus)
    }

    /// Parse line-delimited records, skipping lines that are not valid records.
    pub fn parse(content: &str) -> Self {
        let mut records = Vec::new();
        let mut skipped = 0;

        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CurriculumRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(line = i + 1, error = %e, "Skipping malformed curriculum line");
                    skipped += 1;
                }
            }
        }

        let text = records
            .iter()
            .map(render_record)
            .collect::<Vec<_>>()
            .join("\n\n");

        debug!(bytes = text.len(), "Curriculum text block rendered");

        Self {
            records,
            text,
            skipped,
        }
    }

    /// The rendered text block embedded in the stage-1 prompt.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn records(&self) -> &[CurriculumRecord] {
        &self.records
    }

    /// Number of lines that failed to parse.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct program names in first-seen order.
    pub fn programs(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.program.as_str()) {
                seen.push(&record.program);
            }
        }
        seen
    }

    /// Courses of `program` taught before `term`: what a student entering
    /// `term` may still owe.
    pub fn courses_before(&self, program: &str, term: i64) -> Vec<&CurriculumRecord> {
        self.records
            .iter()
            .filter(|r| r.program.contains(program) && r.term < term)
            .collect()
    }
}
