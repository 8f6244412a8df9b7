//! Feed fetching, parsing and searching
//!
//! The HTTP source is exercised against a throwaway axum server on the
//! loopback interface.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use enhanced_calc::error::FeedError;
use enhanced_calc::feed::{
    parse_feed, FeedEntry, FeedSearcher, FeedSource, HttpFeedSource, StaticFeedSource,
};
use enhanced_calc::mcp::McpServer;
use enhanced_calc::state::CalculatorState;
use enhanced_calc::mcp::types::JsonRpcRequest;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>University</title>
    <link>https://example.com</link>
    <item>
      <title>Data Lakes &amp; Warehouses</title>
      <link>https://example.com/lakes</link>
      <description><![CDATA[<p>Choosing storage for <b>analytics</b></p>]]></description>
      <pubDate>Wed, 08 Jan 2025 09:00:00 GMT</pubDate>
      <category>Architecture</category>
    </item>
    <item>
      <title>Machine Learning in SQL</title>
      <link>https://example.com/ml-sql</link>
      <content:encoded>Train models where the data lives</content:encoded>
      <pubDate>Tue, 07 Jan 2025 09:00:00 GMT</pubDate>
      <category>AI</category>
      <category>SQL</category>
    </item>
    <item>
      <title>Release Notes</title>
      <link>https://example.com/notes</link>
    </item>
  </channel>
</rss>"#;

const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom</title>
  <entry>
    <title>Only Self Link</title>
    <link rel="self" href="https://example.com/self"/>
    <content>Body text</content>
    <published>2025-03-01T00:00:00Z</published>
  </entry>
  <entry>
    <title>Plain Link</title>
    <link href="https://example.com/plain"/>
    <summary>Short</summary>
    <updated>2025-03-02T00:00:00Z</updated>
  </entry>
</feed>"#;

/// Source that always fails, to check error propagation
struct BrokenSource;

#[async_trait]
impl FeedSource for BrokenSource {
    async fn fetch(&self) -> Result<Vec<FeedEntry>, FeedError> {
        Err(FeedError::Network("connection refused".to_string()))
    }

    fn location(&self) -> &str {
        "broken://feed"
    }
}

async fn spawn_feed_server() -> SocketAddr {
    let app = Router::new()
        .route("/rss", get(|| async { RSS }))
        .route("/html", get(|| async { "<html><body>not a feed</body></html>" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[test]
fn test_parse_rss_fields() {
    let entries = parse_feed(RSS).unwrap();
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].title, "Data Lakes & Warehouses");
    assert_eq!(entries[0].link, "https://example.com/lakes");
    assert!(entries[0].description.contains("analytics"));
    assert_eq!(entries[0].published, "Wed, 08 Jan 2025 09:00:00 GMT");
    assert_eq!(entries[0].categories, vec!["Architecture".to_string()]);

    assert_eq!(entries[1].description, "Train models where the data lives");
    assert_eq!(entries[1].categories, vec!["AI".to_string(), "SQL".to_string()]);

    assert!(entries[2].description.is_empty());
    assert!(entries[2].published.is_empty());
}

#[test]
fn test_parse_atom_link_fallbacks() {
    let entries = parse_feed(ATOM).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].link, "https://example.com/self");
    assert_eq!(entries[0].description, "Body text");
    assert_eq!(entries[0].published, "2025-03-01T00:00:00Z");
    assert_eq!(entries[1].link, "https://example.com/plain");
    assert_eq!(entries[1].published, "2025-03-02T00:00:00Z");
}

#[tokio::test]
async fn test_searcher_over_parsed_document() {
    let source = StaticFeedSource::from_document(RSS).unwrap();
    let searcher = FeedSearcher::new(Arc::new(source));

    let hits = searcher.search("warehouses", 3).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "https://example.com/lakes");

    let latest = searcher.latest(10).await.unwrap();
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0].title, "Data Lakes & Warehouses");

    let by_category = searcher.by_category("sql", 5).await.unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].title, "Machine Learning in SQL");
}

#[tokio::test]
async fn test_http_source_fetches_and_parses() {
    let addr = spawn_feed_server().await;
    let url = format!("http://{}/rss", addr);
    let source = HttpFeedSource::with_timeout(url.clone(), Duration::from_secs(5)).unwrap();

    assert_eq!(source.location(), url);
    let entries = source.fetch().await.unwrap();
    assert_eq!(entries.len(), 3);
}

#[tokio::test]
async fn test_http_source_reports_status() {
    let addr = spawn_feed_server().await;
    let source = HttpFeedSource::new(format!("http://{}/missing", addr)).unwrap();

    match source.fetch().await {
        Err(FeedError::Http { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/missing"));
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_source_rejects_non_feed() {
    let addr = spawn_feed_server().await;
    let source = HttpFeedSource::new(format!("http://{}/html", addr)).unwrap();

    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FeedError::InvalidFeed(_)));
}

#[tokio::test]
async fn test_feed_failure_surfaces_as_tool_error() {
    let server = McpServer::with_components(
        Arc::new(CalculatorState::new()),
        FeedSearcher::new(Arc::new(BrokenSource)),
        None,
    );

    let request = JsonRpcRequest::new(
        "tools/call",
        Some(json!({ "name": "search_feed", "arguments": { "query": "sql" } })),
        Some(json!(7)),
    );
    let response = server.handle_request(request).await.unwrap();
    let result = response.result.unwrap();

    assert_eq!(result["isError"], json!(true));
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("connection refused"));
}
