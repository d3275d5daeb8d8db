use thiserror::Error;

/// Message shown when an import payload matches neither export shape.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid tier list format";

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("Board validation failed: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BoardError {
    pub fn invalid_format() -> Self {
        BoardError::InvalidFormat(INVALID_FORMAT_MESSAGE.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
