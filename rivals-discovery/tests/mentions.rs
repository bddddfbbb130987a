mod common;

use common::{Call, ScriptedProvider};
use rivals_config::RivalsConfig;
use rivals_discovery::mentions::DEFAULT_MENTION_DOMAIN;
use rivals_discovery::{MentionQuery, MentionScraper};
use rivals_exa::{LiveCrawl, SearchType};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn requires_a_website_url() {
    let provider = Arc::new(ScriptedProvider::default());
    let scraper = MentionScraper::new(provider.clone());

    for query in [MentionQuery::default(), MentionQuery::new("")] {
        let err = scraper.find_mentions(&query).await.unwrap_err();
        assert_eq!(err.to_string(), "Website URL is required");
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn searches_reddit_live_for_the_literal_url() {
    let provider = Arc::new(ScriptedProvider::default());
    let scraper = MentionScraper::new(provider.clone());
    assert_eq!(scraper.domain(), "reddit.com");

    scraper
        .find_mentions(&MentionQuery::new("acme.test"))
        .await
        .unwrap();

    match &provider.calls()[..] {
        [Call::SearchRaw(req)] => {
            assert_eq!(req.query, "acme.test");
            assert_eq!(req.search_type, Some(SearchType::Keyword));
            assert_eq!(req.contents.livecrawl, Some(LiveCrawl::Always));
            assert_eq!(req.include_domains.as_deref(), Some(&["reddit.com".to_string()][..]));
            assert_eq!(req.include_text.as_deref(), Some(&["acme.test".to_string()][..]));
            assert_eq!(req.exclude_domains, None);
        }
        other => panic!("unexpected calls: {other:?}"),
    }
}

#[tokio::test]
async fn results_pass_through_untouched() {
    let raw = vec![
        json!({
            "title": "Is acme.test any good?",
            "url": "https://www.reddit.com/r/saas/comments/1",
            "publishedDate": null,
            "author": "u1",
            "score": 0.12,
            "unknownField": { "deep": [true, null] }
        }),
        json!({ "url": "https://www.reddit.com/r/saas/comments/2" }),
    ];
    let provider = Arc::new(ScriptedProvider {
        raw: raw.clone(),
        ..Default::default()
    });

    let out = MentionScraper::new(provider)
        .find_mentions(&MentionQuery::new("acme.test"))
        .await
        .unwrap();

    assert_eq!(out, raw);
}

#[test]
fn default_domain_is_the_configured_default() {
    let scraper = MentionScraper::new(Arc::new(ScriptedProvider::default()));
    assert_eq!(scraper.domain(), RivalsConfig::default().mentions.domain);
    assert_eq!(scraper.domain(), DEFAULT_MENTION_DOMAIN);
}

#[tokio::test]
async fn domain_is_configurable() {
    let provider = Arc::new(ScriptedProvider::default());
    MentionScraper::with_domain(provider.clone(), "news.ycombinator.com")
        .find_mentions(&MentionQuery::new("acme.test"))
        .await
        .unwrap();

    match &provider.calls()[..] {
        [Call::SearchRaw(req)] => assert_eq!(
            req.include_domains.as_deref(),
            Some(&["news.ycombinator.com".to_string()][..])
        ),
        other => panic!("unexpected calls: {other:?}"),
    }
}

#[tokio::test]
async fn provider_failure_is_reported() {
    let provider = Arc::new(ScriptedProvider {
        fail_search: true,
        ..Default::default()
    });

    let err = MentionScraper::new(provider)
        .find_mentions(&MentionQuery::new("acme.test"))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to perform search | exa search request failed: network error: connection reset"
    );
}
