use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Unknown media type: {0}")]
    UnknownMediaType(String),

    #[error("Unknown media category: {0}")]
    UnknownCategory(String),

    #[error("Media type {media_type} is not offered by category {category}")]
    TypeNotInCategory { media_type: String, category: String },
}

pub type Result<T> = std::result::Result<T, MediaError>;
