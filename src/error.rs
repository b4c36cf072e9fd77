use thiserror::Error;

/// Per-subject failure. Never fatal to a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubjectError {
    #[error("no content available")]
    NoContent,

    #[error("upstream fetch failed: {0}")]
    Fetch(String),

    #[error("analysis task failed: {0}")]
    Task(String),
}

impl SubjectError {
    /// Message exposed in `per_subject` entries.
    pub fn public_message(&self) -> &'static str {
        "no content available"
    }

    /// Whether this failure also belongs in the report's `errors` list.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, SubjectError::NoContent)
    }
}
