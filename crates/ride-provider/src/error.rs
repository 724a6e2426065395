//! Provider Error Taxonomy

use thiserror::Error;

/// Classified failures from the ride provider.
///
/// A single closed taxonomy; transport and HTTP details collapse into
/// `Unavailable`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Too many requests against the provider API.
    #[error("Provider rate limit reached")]
    RateLimited,

    /// No vehicles can serve the requested pickup.
    #[error("No drivers available")]
    NoDriversAvailable,

    /// Surge pricing is active and needs rider confirmation.
    #[error("Surge pricing requires confirmation")]
    SurgeActive,

    /// The configured ride product id is unknown to the provider.
    #[error("Invalid product selected")]
    InvalidProduct,

    /// Any other provider failure.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}
