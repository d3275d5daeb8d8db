//! External Provider Failures
//!
//! Search, details and image providers live outside the core (route handlers
//! proxying MusicBrainz, TMDB, Fanart.tv, OpenLibrary, ...). Whatever transport
//! they use, they report failures through [`ProviderError`] so the core can
//! apply one error policy to all of them.

use thiserror::Error;

/// HTTP status codes upstream services use to signal throttling.
///
/// MusicBrainz answers `503` when a client exceeds its rate limit.
pub const RATE_LIMIT_STATUS_CODES: &[u16] = &[429, 503];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} rate limited the request")]
    RateLimited {
        provider: String,
        retry_after_seconds: Option<u64>,
    },

    #[error("{provider} returned HTTP {status}")]
    HttpStatus { provider: String, status: u16 },

    #[error("{provider} timed out")]
    Timeout { provider: String },

    #[error("{provider} returned a malformed payload: {message}")]
    MalformedPayload { provider: String, message: String },

    #[error("{provider} is not configured")]
    NotConfigured { provider: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Classify a non-2xx upstream status.
    pub fn from_status(
        provider: impl Into<String>,
        status: u16,
        retry_after_seconds: Option<u64>,
    ) -> Self {
        let provider = provider.into();
        if RATE_LIMIT_STATUS_CODES.contains(&status) {
            ProviderError::RateLimited {
                provider,
                retry_after_seconds,
            }
        } else {
            ProviderError::HttpStatus { provider, status }
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
