use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("invalid input: {0}")]
    Input(String),
}

/// Errors raised by the creation and edit forms.
#[derive(Debug, Error)]
pub enum FormError {
    /// Rejected locally; nothing was sent.
    #[error("validation error: {0}")]
    Validation(String),
    #[error("the form was already submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Client(#[from] ClientError),
}
