use thiserror::Error;

/// Engine-boundary error type. Save attempts never surface through this —
/// they resolve to `SaveOutcome` and feedback — but session-level operations
/// (initial load, asset upload) do.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] anyhow::Error),
}
