use crate::error::{DiscoveryError, SearchFailure};
use crate::required_url;
use rivals_exa::{FindSimilarRequest, LiveCrawl, SearchHit, SearchProvider, SearchRequest, SearchType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Results requested from the similarity query.
pub const PRIMARY_NUM_RESULTS: u32 = 5;
/// Below this many similarity hits the summary-text fallback kicks in.
pub const FALLBACK_THRESHOLD: usize = 3;
/// Cap on candidates considered (and therefore returned).
pub const MAX_COMPETITORS: usize = 10;
/// Characters of page text used when no highlight is available.
pub const SUMMARY_TEXT_CHARS: usize = 150;
const ELLIPSIS: &str = "...";

/// Body of a find-competitors request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompetitorQuery {
    #[serde(rename = "websiteurl", default, deserialize_with = "crate::falsy_as_none")]
    pub website_url: Option<String>,
    #[serde(rename = "summaryText", default, deserialize_with = "crate::falsy_as_none")]
    pub summary_text: Option<String>,
}

impl CompetitorQuery {
    pub fn new(website_url: impl Into<String>) -> Self {
        Self {
            website_url: Some(website_url.into()),
            summary_text: None,
        }
    }

    pub fn with_summary(mut self, summary_text: impl Into<String>) -> Self {
        self.summary_text = Some(summary_text.into());
        self
    }
}

/// A competitor ready for display. `summary` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub title: String,
    pub url: String,
    pub summary: String,
}

#[derive(Clone)]
pub struct CompetitorFinder {
    provider: Arc<dyn SearchProvider>,
}

impl CompetitorFinder {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// Find up to [`MAX_COMPETITORS`] companies similar to the query's site,
    /// at most one per hostname.
    pub async fn find_competitors(
        &self,
        query: &CompetitorQuery,
    ) -> Result<Vec<Competitor>, DiscoveryError> {
        let website_url = required_url(query.website_url.as_deref())?;
        let summary_text = query.summary_text.as_deref().filter(|s| !s.is_empty());

        let similar = FindSimilarRequest::new(website_url)
            .with_text()
            .with_highlights()
            .num_results(PRIMARY_NUM_RESULTS)
            .exclude_source_domain();
        let mut hits = self.provider.find_similar(&similar).await?.results;
        let primary_count = hits.len();

        if let Some(text) = summary_text.filter(|_| primary_count < FALLBACK_THRESHOLD) {
            let fallback = SearchRequest::new(text)
                .search_type(SearchType::Auto)
                .with_highlights()
                .livecrawl(LiveCrawl::Fallback)
                .exclude_domains([hostname(website_url)?]);
            let extra = self.provider.search(&fallback).await?.results;
            tracing::info!(
                target: "discovery",
                primary_count,
                fallback_count = extra.len(),
                "competitors.fallback"
            );
            hits.extend(extra);
        }

        let competitors = shape_competitors(hits)?;
        tracing::info!(
            target: "discovery",
            website_url,
            primary_count,
            returned = competitors.len(),
            "competitors.done"
        );
        Ok(competitors)
    }
}

/// Truncate, summarise, drop unsummarisable hits, then dedup by hostname.
fn shape_competitors(hits: Vec<SearchHit>) -> Result<Vec<Competitor>, SearchFailure> {
    let candidates = hits
        .into_iter()
        .take(MAX_COMPETITORS)
        .filter_map(to_competitor);

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for competitor in candidates {
        if seen.insert(hostname(&competitor.url)?) {
            out.push(competitor);
        }
    }
    Ok(out)
}

fn to_competitor(hit: SearchHit) -> Option<Competitor> {
    let summary = display_summary(&hit)?;
    Some(Competitor {
        title: hit.title.unwrap_or_default(),
        url: hit.url,
        summary,
    })
}

/// First highlight, else the head of the page text plus an ellipsis.
fn display_summary(hit: &SearchHit) -> Option<String> {
    let highlight = hit
        .highlights
        .as_deref()
        .and_then(<[String]>::first)
        .filter(|h| !h.is_empty());
    if let Some(h) = highlight {
        return Some(h.clone());
    }

    hit.text.as_deref().filter(|t| !t.is_empty()).map(|text| {
        let mut summary: String = text.chars().take(SUMMARY_TEXT_CHARS).collect();
        summary.push_str(ELLIPSIS);
        summary
    })
}

/// Exact hostname as the URL parser normalises it; no `www.` folding.
fn hostname(raw: &str) -> Result<String, SearchFailure> {
    let parsed = Url::parse(raw).map_err(|source| SearchFailure::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    Ok(parsed.host_str().unwrap_or_default().to_string())
}
