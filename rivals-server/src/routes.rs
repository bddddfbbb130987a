use crate::error::ApiError;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use rivals_config::RivalsConfig;
use rivals_discovery::{
    Competitor, CompetitorFinder, CompetitorQuery, DiscoveryError, MentionQuery, MentionScraper,
    SearchFailure,
};
use rivals_exa::SearchProvider;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{future::Future, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub finder: CompetitorFinder,
    pub mentions: MentionScraper,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(provider: Arc<dyn SearchProvider>, request_timeout: Duration) -> Self {
        Self {
            finder: CompetitorFinder::new(provider.clone()),
            mentions: MentionScraper::new(provider),
            request_timeout,
        }
    }

    pub fn from_config(config: &RivalsConfig, provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            finder: CompetitorFinder::new(provider.clone()),
            mentions: MentionScraper::with_domain(provider, config.mentions.domain.clone()),
            request_timeout: config.server.request_timeout(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Results<T> {
    results: Vec<T>,
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/api/findcompetitors", post(find_competitors))
        .route("/api/scrapereddit", post(scrape_mentions))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn find_competitors(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Results<Competitor>>, ApiError> {
    let query: CompetitorQuery = parse_body(&body)?;
    let results = within(state.request_timeout, state.finder.find_competitors(&query)).await?;
    Ok(Json(Results { results }))
}

async fn scrape_mentions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Results<Value>>, ApiError> {
    let query: MentionQuery = parse_body(&body)?;
    let results = within(state.request_timeout, state.mentions.find_mentions(&query)).await?;
    Ok(Json(Results { results }))
}

async fn health() -> &'static str {
    "ok"
}

// The body is read as JSON regardless of Content-Type. Anything that does not
// parse is a search failure rather than a validation error.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, SearchFailure> {
    serde_json::from_slice(body).map_err(|e| SearchFailure::InvalidBody(e.to_string()))
}

async fn within<T>(
    limit: Duration,
    op: impl Future<Output = Result<T, DiscoveryError>>,
) -> Result<T, DiscoveryError> {
    tokio::time::timeout(limit, op)
        .await
        .map_err(|_| SearchFailure::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_parsing_ignores_unknown_fields() {
        let q: CompetitorQuery =
            parse_body(br#"{"websiteurl":"https://a.test","summaryText":"x","extra":1}"#).unwrap();
        assert_eq!(q.website_url.as_deref(), Some("https://a.test"));
        assert_eq!(q.summary_text.as_deref(), Some("x"));

        let q: MentionQuery = parse_body(b"{}").unwrap();
        assert_eq!(q.website_url, None);
    }

    #[test]
    fn garbage_body_is_a_search_failure() {
        let err = parse_body::<MentionQuery>(b"not json").unwrap_err();
        assert!(matches!(err, SearchFailure::InvalidBody(_)));
    }

    #[tokio::test]
    async fn slow_operations_time_out() {
        let limit = Duration::from_millis(10);
        let err = within(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, DiscoveryError>(())
        })
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to perform search | request timed out after 10ms"
        );
    }
}
