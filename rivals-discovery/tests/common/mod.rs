#![allow(dead_code)]

use async_trait::async_trait;
use rivals_exa::{
    ExaError, FindSimilarRequest, SearchHit, SearchProvider, SearchRequest, SearchResponse,
};
use rivals_http::HttpError;
use serde_json::Value;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FindSimilar(FindSimilarRequest),
    Search(SearchRequest),
    SearchRaw(SearchRequest),
}

/// In-memory provider that replays canned results and records every call.
#[derive(Default)]
pub struct ScriptedProvider {
    pub similar: Vec<SearchHit>,
    pub fallback: Vec<SearchHit>,
    pub raw: Vec<Value>,
    pub fail_similar: bool,
    pub fail_search: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<SearchRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn boom(endpoint: &'static str) -> ExaError {
    ExaError::Request {
        endpoint,
        source: HttpError::Network("connection reset".into()),
    }
}

fn respond<T: Clone>(results: &[T]) -> SearchResponse<T> {
    SearchResponse {
        request_id: Some("scripted".into()),
        resolved_search_type: None,
        results: results.to_vec(),
    }
}

#[async_trait]
impl SearchProvider for ScriptedProvider {
    async fn find_similar(&self, req: &FindSimilarRequest) -> Result<SearchResponse, ExaError> {
        self.record(Call::FindSimilar(req.clone()));
        if self.fail_similar {
            return Err(boom("findSimilar"));
        }
        Ok(respond(&self.similar))
    }

    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, ExaError> {
        self.record(Call::Search(req.clone()));
        if self.fail_search {
            return Err(boom("search"));
        }
        Ok(respond(&self.fallback))
    }

    async fn search_raw(&self, req: &SearchRequest) -> Result<SearchResponse<Value>, ExaError> {
        self.record(Call::SearchRaw(req.clone()));
        if self.fail_search {
            return Err(boom("search"));
        }
        Ok(respond(&self.raw))
    }
}

pub fn highlighted(url: &str, title: &str, highlight: &str) -> SearchHit {
    SearchHit {
        title: Some(title.to_string()),
        url: url.to_string(),
        highlights: Some(vec![highlight.to_string()]),
        ..SearchHit::default()
    }
}

pub fn text_only(url: &str, text: &str) -> SearchHit {
    SearchHit {
        url: url.to_string(),
        text: Some(text.to_string()),
        highlights: Some(vec![]),
        ..SearchHit::default()
    }
}
