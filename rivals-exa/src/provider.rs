use crate::client::ExaError;
use crate::types::{FindSimilarRequest, SearchRequest, SearchResponse};
use async_trait::async_trait;

/// The operations the discovery handlers need from a search/crawl provider.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Pages similar to `req.url`.
    async fn find_similar(&self, req: &FindSimilarRequest) -> Result<SearchResponse, ExaError>;

    /// General search with typed hits.
    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, ExaError>;

    /// General search where every hit is kept exactly as the provider sent it.
    async fn search_raw(
        &self,
        req: &SearchRequest,
    ) -> Result<SearchResponse<serde_json::Value>, ExaError>;
}
