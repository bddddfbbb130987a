use crate::error::DiscoveryError;
use crate::required_url;
use rivals_exa::{LiveCrawl, SearchProvider, SearchRequest, SearchType};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub use rivals_config::DEFAULT_MENTION_DOMAIN;

/// Body of a scrape-mentions request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MentionQuery {
    #[serde(rename = "websiteurl", default, deserialize_with = "crate::falsy_as_none")]
    pub website_url: Option<String>,
}

impl MentionQuery {
    pub fn new(website_url: impl Into<String>) -> Self {
        Self {
            website_url: Some(website_url.into()),
        }
    }
}

/// Finds live discussion of a site on a single content domain.
#[derive(Clone)]
pub struct MentionScraper {
    provider: Arc<dyn SearchProvider>,
    domain: String,
}

impl MentionScraper {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self::with_domain(provider, DEFAULT_MENTION_DOMAIN)
    }

    pub fn with_domain(provider: Arc<dyn SearchProvider>, domain: impl Into<String>) -> Self {
        Self {
            provider,
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Keyword search for the URL itself, always crawled live; the provider's
    /// hits come back exactly as sent.
    pub async fn find_mentions(&self, query: &MentionQuery) -> Result<Vec<Value>, DiscoveryError> {
        let website_url = required_url(query.website_url.as_deref())?;

        let request = SearchRequest::new(website_url)
            .search_type(SearchType::Keyword)
            .livecrawl(LiveCrawl::Always)
            .include_domains([self.domain.as_str()])
            .include_text([website_url]);
        let results = self.provider.search_raw(&request).await?.results;

        tracing::info!(
            target: "discovery",
            website_url,
            domain = %self.domain,
            returned = results.len(),
            "mentions.done"
        );
        Ok(results)
    }
}
