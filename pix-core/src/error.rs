use thiserror::Error;

use pix_model::ModelError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Invalid source: {0}")]
    InvalidSource(String),
}

/// Failures of a local record cache. Never surfaced through a dispatch;
/// the engine logs them and treats the lookup as a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache entry not found: {0}")]
    NotFound(String),

    #[error("Cache storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
