//! Timetable documents for the vector index.

use std::path::Path;
use tracing::info;
use vahed_core::error::CorpusError;
use vahed_core::RetrievalDocument;

/// Load a JSON array of `{text, metadata}` documents verbatim.
pub fn load_documents(path: &Path) -> Result<Vec<RetrievalDocument>, CorpusError> {
    if !path.exists() {
        return Err(CorpusError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| CorpusError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let documents = parse_documents(&content, path)?;
    info!(path = %path.display(), count = documents.len(), "Retrieval documents loaded");
    Ok(documents)
}

/// Parse the document array. `path` is only used for error reporting.
pub fn parse_documents(content: &str, path: &Path) -> Result<Vec<RetrievalDocument>, CorpusError> {
    serde_json::from_str(content).map_err(|e| CorpusError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
