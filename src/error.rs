use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required snapshot: {0}")]
    MissingSnapshot(String),

    #[error("Snapshot format error: {0}")]
    SnapshotFormat(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
