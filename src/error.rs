use thiserror::Error;

/// Application error types.
///
/// Only invalid input to the crate's own public operations propagates to
/// callers. Failures in the optional upstream services are absorbed by the
/// pipeline and converted into fallback results, never surfaced here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
