use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("scrape target missing: {0}")]
    ScrapeTargetMissing(String),
    #[error("page host error: {0}")]
    PageHost(String),
    #[error("explanation service error: {0}")]
    ExplanationService(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reasons an explanation payload is rejected before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid explanation format: {0}")]
    MalformedPayload(String),
    #[error("missing required fields in explanation: {0}")]
    MissingRequiredFields(&'static str),
}

pub type AppResult<T> = Result<T, AppError>;
