use outfit_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;
use vision_api::VisionError;

/// Failures the pipeline can surface to its caller. The narrative
/// client never appears here: it degrades internally and always
/// returns a complete summary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing required input (photo source, user id). Surfaced
    /// immediately, never retried.
    #[error("{0}")]
    InvalidInput(String),
    #[error("Local file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to read local file: {0}")]
    Io(#[from] std::io::Error),
    /// Label detection failed on both of its transports.
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
