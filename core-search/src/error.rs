use bridge_traits::error::BridgeError;
use bridge_traits::provider::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Invalid search parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
