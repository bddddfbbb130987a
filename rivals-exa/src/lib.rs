//! Exa search/crawl API integration.
//!
//! - [`client::ExaClient`]: authenticated client over `rivals-http`
//! - [`types`]: request builders and response models (camelCase on the wire)
//! - [`provider::SearchProvider`]: the seam handlers depend on, so tests can
//!   substitute a scripted provider
pub mod client;
pub mod provider;
pub mod types;

pub use client::{ExaClient, ExaError};
pub use provider::SearchProvider;
pub use types::{
    ContentsOptions, FindSimilarRequest, LiveCrawl, SearchHit, SearchRequest, SearchResponse,
    SearchType,
};
