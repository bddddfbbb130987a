//! Authenticated Exa client.
//!
//! One instance is built at start-up from the process-wide API key and then
//! shared (behind an `Arc`) by every handler. Provider calls are not retried
//! unless the configured retry budget says otherwise.
use crate::provider::SearchProvider;
use crate::types::{FindSimilarRequest, SearchHit, SearchRequest, SearchResponse};
use async_trait::async_trait;
use rivals_config::ProviderConfig;
use rivals_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Instant;
use thiserror::Error;

pub const EXA_API_BASE: &str = "https://api.exa.ai";
const API_KEY_HEADER: &str = "x-api-key";
const LOG_SNIPPET_CHARS: usize = 160;

#[derive(Debug, Error)]
pub enum ExaError {
    #[error("exa {endpoint} request failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: HttpError,
    },
    #[error("exa client misconfigured: {0}")]
    Config(String),
}

impl ExaError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ExaError::Request {
                source: HttpError::Timeout(_),
                ..
            }
        )
    }
}

#[derive(Clone, Debug)]
pub struct ExaClient {
    http: HttpClient,
    auth: Auth,
}

impl ExaClient {
    /// Client against the public API with default timeouts and no retries.
    pub fn new(api_key: &str) -> Result<Self, ExaError> {
        let http = HttpClient::new(EXA_API_BASE)
            .map_err(|e| ExaError::Config(e.to_string()))?
            .with_retries(0);
        Self::with_http(http, api_key)
    }

    /// Wrap a pre-configured transport (custom base URL, timeout, retries).
    pub fn with_http(http: HttpClient, api_key: &str) -> Result<Self, ExaError> {
        let auth = Auth::api_key_header(API_KEY_HEADER, api_key)
            .map_err(|e| ExaError::Config(e.to_string()))?;
        Ok(Self { http, auth })
    }

    /// Build from the `provider` config section, resolving the API key once.
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self, ExaError> {
        let api_key = cfg
            .resolve_api_key()
            .map_err(|e| ExaError::Config(e.to_string()))?;
        let http = HttpClient::new(&cfg.base_url)
            .map_err(|e| ExaError::Config(e.to_string()))?
            .with_timeout(cfg.timeout())
            .with_retries(cfg.max_retries);
        Self::with_http(http, &api_key)
    }

    /// `POST /search`, decoding each hit as `T`.
    pub async fn search_as<T>(&self, req: &SearchRequest) -> Result<SearchResponse<T>, ExaError>
    where
        T: DeserializeOwned,
    {
        self.post("search", &req.query, req).await
    }

    async fn post<B, T>(
        &self,
        endpoint: &'static str,
        subject: &str,
        body: &B,
    ) -> Result<SearchResponse<T>, ExaError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let subject = snippet(subject);
        let started = Instant::now();
        tracing::info!(target: "provider.exa", endpoint, subject = %subject, "exa.request.start");

        let opts = RequestOpts {
            auth: Some(self.auth.clone()),
            ..Default::default()
        };
        match self
            .http
            .post_json::<B, SearchResponse<T>>(endpoint, body, opts)
            .await
        {
            Ok(resp) => {
                tracing::info!(
                    target: "provider.exa",
                    endpoint,
                    subject = %subject,
                    result_count = resp.results.len(),
                    request_id = resp.request_id.as_deref().unwrap_or("-"),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "exa.request.success"
                );
                Ok(resp)
            }
            Err(source) => {
                tracing::warn!(
                    target: "provider.exa",
                    endpoint,
                    subject = %subject,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %source,
                    "exa.request.error"
                );
                Err(ExaError::Request { endpoint, source })
            }
        }
    }
}

#[async_trait]
impl SearchProvider for ExaClient {
    async fn find_similar(&self, req: &FindSimilarRequest) -> Result<SearchResponse, ExaError> {
        self.post("findSimilar", &req.url, req).await
    }

    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse<SearchHit>, ExaError> {
        self.search_as(req).await
    }

    async fn search_raw(
        &self,
        req: &SearchRequest,
    ) -> Result<SearchResponse<serde_json::Value>, ExaError> {
        self.search_as(req).await
    }
}

fn snippet(s: &str) -> String {
    if s.chars().count() > LOG_SNIPPET_CHARS {
        let mut out: String = s.chars().take(LOG_SNIPPET_CHARS).collect();
        out.push('…');
        out
    } else {
        s.to_string()
    }
}
