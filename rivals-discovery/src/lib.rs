//! Competitor discovery on top of a [`SearchProvider`].
//!
//! Two independent, stateless operations share nothing but an immutable
//! provider handle:
//!
//! - [`CompetitorFinder`]: similar-page search with a summary-text fallback,
//!   then truncation, snippet extraction and per-host dedup
//! - [`MentionScraper`]: live keyword search restricted to one discussion
//!   site, results passed through untouched
//!
//! Failures are either a missing input ([`DiscoveryError::MissingWebsiteUrl`])
//! or anything downstream ([`DiscoveryError::Search`]).
//!
//! [`SearchProvider`]: rivals_exa::SearchProvider
pub mod competitors;
pub mod error;
pub mod mentions;

pub use competitors::{Competitor, CompetitorFinder, CompetitorQuery};
pub use error::{DiscoveryError, SearchFailure};
pub use mentions::{MentionQuery, MentionScraper};

/// Reads an optional text field with truthiness rules: `null`, `false`, `0`
/// and a missing field are all absent. Other non-strings are rejected.
pub(crate) fn falsy_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(de)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(D::Error::custom(format!(
            "invalid type: {other}, expected a string"
        ))),
    }
}

/// Presence check shared by both operations. Well-formedness is not checked
/// here; a URL that fails to parse later is a search failure.
pub(crate) fn required_url(raw: Option<&str>) -> Result<&str, DiscoveryError> {
    match raw {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(DiscoveryError::MissingWebsiteUrl),
    }
}
