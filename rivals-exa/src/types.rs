use serde::{Deserialize, Serialize};

/// How Exa interprets a search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Let the provider pick between keyword and neural retrieval.
    Auto,
    Keyword,
    Neural,
    Fast,
}

/// Freshness policy: serve from cache, crawl live, or mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveCrawl {
    Never,
    /// Cached content unless none exists, then crawl live.
    Fallback,
    /// Always re-crawl.
    Always,
    Preferred,
}

/// Content extraction options attached to a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub livecrawl: Option<LiveCrawl>,
}

impl ContentsOptions {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.highlights.is_none() && self.livecrawl.is_none()
    }
}

/// Body of `POST /findSimilar`.
///
/// ```
/// use rivals_exa::FindSimilarRequest;
///
/// let req = FindSimilarRequest::new("https://acme.test")
///     .with_text()
///     .with_highlights()
///     .num_results(5)
///     .exclude_source_domain();
/// let body = serde_json::to_value(&req).unwrap();
/// assert_eq!(body["numResults"], 5);
/// assert_eq!(body["excludeSourceDomain"], true);
/// assert_eq!(body["contents"]["highlights"], true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSimilarRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_source_domain: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "ContentsOptions::is_empty")]
    pub contents: ContentsOptions,
}

impl FindSimilarRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            num_results: None,
            exclude_source_domain: None,
            exclude_domains: None,
            contents: ContentsOptions::default(),
        }
    }

    pub fn with_text(mut self) -> Self {
        self.contents.text = Some(true);
        self
    }

    pub fn with_highlights(mut self) -> Self {
        self.contents.highlights = Some(true);
        self
    }

    pub fn num_results(mut self, n: u32) -> Self {
        self.num_results = Some(n);
        self
    }

    pub fn exclude_source_domain(mut self) -> Self {
        self.exclude_source_domain = Some(true);
        self
    }
}

/// Body of `POST /search`.
///
/// ```
/// use rivals_exa::{LiveCrawl, SearchRequest, SearchType};
///
/// let req = SearchRequest::new("acme.test")
///     .search_type(SearchType::Keyword)
///     .include_domains(["reddit.com"])
///     .include_text(["acme.test"])
///     .livecrawl(LiveCrawl::Always);
/// let body = serde_json::to_value(&req).unwrap();
/// assert_eq!(body["type"], "keyword");
/// assert_eq!(body["includeDomains"][0], "reddit.com");
/// assert_eq!(body["contents"]["livecrawl"], "always");
/// assert!(body.get("excludeDomains").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "ContentsOptions::is_empty")]
    pub contents: ContentsOptions,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_type: None,
            num_results: None,
            include_domains: None,
            exclude_domains: None,
            include_text: None,
            contents: ContentsOptions::default(),
        }
    }

    pub fn search_type(mut self, kind: SearchType) -> Self {
        self.search_type = Some(kind);
        self
    }

    pub fn num_results(mut self, n: u32) -> Self {
        self.num_results = Some(n);
        self
    }

    pub fn include_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    /// Phrases every result must contain.
    pub fn include_text<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_text = Some(phrases.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_text(mut self) -> Self {
        self.contents.text = Some(true);
        self
    }

    pub fn with_highlights(mut self) -> Self {
        self.contents.highlights = Some(true);
        self
    }

    pub fn livecrawl(mut self, policy: LiveCrawl) -> Self {
        self.contents.livecrawl = Some(policy);
        self
    }
}

/// Envelope shared by `/search` and `/findSimilar`.
///
/// `T` defaults to the typed [`SearchHit`]; callers that must hand the
/// provider payload through untouched use `SearchResponse<serde_json::Value>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<T = SearchHit> {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub resolved_search_type: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// One provider result. Everything except `url` may be absent or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub highlights: Option<Vec<String>>,
    #[serde(default)]
    pub highlight_scores: Option<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hits_tolerate_nulls_and_missing_fields() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "requestId": "abc",
            "results": [
                { "url": "https://a.test", "title": null, "highlights": ["h1", "h2"] },
                { "url": "https://b.test", "text": "body", "score": 0.42, "publishedDate": null }
            ]
        }))
        .unwrap();

        assert_eq!(resp.request_id.as_deref(), Some("abc"));
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].title, None);
        assert_eq!(
            resp.results[0].highlights.as_deref(),
            Some(&["h1".to_string(), "h2".to_string()][..])
        );
        assert_eq!(resp.results[1].text.as_deref(), Some("body"));
        assert_eq!(resp.results[1].score, Some(0.42));
    }

    #[test]
    fn missing_results_is_empty() {
        let resp: SearchResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.results.is_empty());
    }

    #[test]
    fn empty_contents_are_omitted() {
        let body = serde_json::to_value(SearchRequest::new("q")).unwrap();
        assert_eq!(body, json!({ "query": "q" }));
    }

    #[test]
    fn fallback_search_shape() {
        let req = SearchRequest::new("payments for startups")
            .search_type(SearchType::Auto)
            .with_highlights()
            .livecrawl(LiveCrawl::Fallback)
            .exclude_domains(["acme.test"]);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "query": "payments for startups",
                "type": "auto",
                "excludeDomains": ["acme.test"],
                "contents": { "highlights": true, "livecrawl": "fallback" }
            })
        );
    }
}
