use rivals_exa::ExaError;
use std::time::Duration;
use thiserror::Error;

/// Everything a discovery operation can fail with.
///
/// The `Display` output is exactly what callers put on the wire.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Caller-correctable: the website URL was absent or empty.
    #[error("Website URL is required")]
    MissingWebsiteUrl,

    /// Any downstream failure; not distinguished further for callers.
    #[error("Failed to perform search | {0}")]
    Search(#[from] SearchFailure),
}

impl DiscoveryError {
    pub fn is_validation(&self) -> bool {
        matches!(self, DiscoveryError::MissingWebsiteUrl)
    }
}

impl From<ExaError> for DiscoveryError {
    fn from(err: ExaError) -> Self {
        DiscoveryError::Search(SearchFailure::Provider(err))
    }
}

/// Structured cause carried by [`DiscoveryError::Search`].
#[derive(Debug, Error)]
pub enum SearchFailure {
    #[error(transparent)]
    Provider(#[from] ExaError),

    #[error("Invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}
