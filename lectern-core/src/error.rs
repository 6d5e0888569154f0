//! Error types for lectern operations

use std::path::PathBuf;

/// Maximum page size the search endpoint accepts.
pub const MAX_SEARCH_PAGE_SIZE: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum LecternError {
    /// Reference does not exist in the canon. Raised before any network call.
    #[error("Passage Invalid {0}")]
    InvalidPassage(String),

    /// Upstream was unreachable or returned no usable content. Retryable.
    #[error("Passage not found {0}")]
    PassageNotFound(String),

    #[error("{0} > 100, the max page size")]
    SearchInvalid(usize),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("Unknown book: {0}")]
    UnknownBook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("No API key found (checked {})", .0.display())]
    MissingApiKey(PathBuf),
}

impl LecternError {
    /// Whether the caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LecternError::PassageNotFound(_) | LecternError::SearchError(_)
        )
    }
}
