//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and test
//! fetch, assembly, search seeding and export end-to-end.

use blog_harvest::config::{FetcherConfig, SearchConfig};
use blog_harvest::crawler::{
    BatchOutcome, Coordinator, CoordinatorOptions, CrawlItem, DocumentFetcher, FetchError,
    HttpFetcher,
};
use blog_harvest::listing::{ListingEntry, NaverSearchClient};
use blog_harvest::output::{CsvSink, BOM};
use blog_harvest::state::ItemState;
use blog_harvest::PostIdentifier;
use chrono::{Local, TimeZone};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POST_ONE: &str = r##"
<html><body>
  <div class="blog_date">2024. 5. 2. 9:15</div>
  <div class="se-main-container">
    <p>Morning at the harbour</p>
    <img id="img_0" src="a.jpg"><img id="img_1" src="b.jpg"><img id="img_2" src="c.jpg">
    <img class="se-sticker-image" src="s.png">
  </div>
  <div class="tag_wrap"><a>#busan</a><a>#sea</a></div>
  <a class="btn_comment"><span class="sp ico">댓글</span><em>12</em></a>
  <span class="u_cnt _count">31</span>
</body></html>
"##;

const POST_TWO: &str = r##"
<html><body>
  <div class="post-view">Legacy layout body</div>
  <span class="se_publishDate">2019. 1. 1.</span>
</body></html>
"##;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn options(timeout: Duration) -> CoordinatorOptions {
    CoordinatorOptions {
        max_concurrency: 2,
        delay: None,
        fetch_timeout: timeout,
    }
}

fn http_fetcher() -> Arc<dyn DocumentFetcher> {
    Arc::new(HttpFetcher::new(&FetcherConfig::default()).expect("Failed to build HTTP client"))
}

fn item(base: &str, post: &str) -> CrawlItem {
    CrawlItem::new(PostIdentifier::parse(&format!("{}{}", base, post)).expect("Invalid test URL"))
}

#[tokio::test]
async fn test_batch_over_http_isolates_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/harbour/1"))
        .respond_with(html(POST_ONE))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/legacy/2"))
        .respond_with(html(POST_TWO))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deleted/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(http_fetcher(), options(Duration::from_secs(5)));
    let result = coordinator
        .run(vec![
            item(&base_url, "/harbour/1"),
            item(&base_url, "/legacy/2"),
            item(&base_url, "/deleted/3"),
        ])
        .await;

    assert_eq!(result.requested(), 3);
    assert_eq!(result.succeeded(), 2);
    assert_eq!(result.failed(), 1);
    assert_eq!(result.outcome(), BatchOutcome::Partial);

    let failure = &result.failures()[0];
    assert!(failure.identifier.ends_with("/deleted/3"));
    assert_eq!(failure.cause, "HTTP 404");
    assert_eq!(failure.failed_during, Some(ItemState::Fetching));

    let harbour = result
        .records()
        .iter()
        .find(|r| r.identifier.as_str().ends_with("/harbour/1"))
        .expect("harbour post missing");
    assert_eq!(harbour.body, "Morning at the harbour");
    assert_eq!(harbour.publish_date, "2024. 5. 2. 9:15");
    assert_eq!(harbour.hashtag_count, 2);
    assert_eq!(harbour.image_count, 3);
    assert_eq!(harbour.sticker_count, 1);
    assert_eq!(harbour.comment_count, 12);
    assert_eq!(harbour.like_count, 31);
    assert_eq!(harbour.map_count, 0);

    let legacy = result
        .records()
        .iter()
        .find(|r| r.identifier.as_str().ends_with("/legacy/2"))
        .expect("legacy post missing");
    assert_eq!(legacy.body, "Legacy layout body");
    assert_eq!(legacy.publish_date, "2019. 1. 1.");
    assert_eq!(legacy.comment_count, 0);
    assert!(!legacy.presence.comments);
}

#[tokio::test]
async fn test_content_type_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"html\"}"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&FetcherConfig::default()).expect("Failed to build HTTP client");
    let id = PostIdentifier::parse(&format!("{}/json/1", mock_server.uri())).unwrap();

    let error = fetcher.fetch(&id).await.expect_err("non-HTML body accepted");

    assert!(matches!(error, FetchError::ContentMismatch { .. }));
    assert_eq!(error.identifier(), id.as_str());
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/slow/1"))
        .respond_with(html(POST_ONE).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fast/2"))
        .respond_with(html(POST_TWO))
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(http_fetcher(), options(Duration::from_millis(300)));
    let result = coordinator
        .run(vec![item(&base_url, "/slow/1"), item(&base_url, "/fast/2")])
        .await;

    assert_eq!(result.succeeded(), 1);
    assert_eq!(result.failed(), 1);
    assert!(result.failures()[0].identifier.ends_with("/slow/1"));
    assert!(result.failures()[0].cause.starts_with("timed out"));
}

#[tokio::test]
async fn test_unreachable_server_is_exhaustion() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    drop(mock_server);

    let coordinator = Coordinator::new(http_fetcher(), options(Duration::from_secs(5)));
    let result = coordinator.run(vec![item(&base_url, "/gone/1")]).await;

    assert_eq!(result.outcome(), BatchOutcome::Exhausted);
    assert_eq!(result.succeeded(), 0);
}

#[tokio::test]
async fn test_search_seeds_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search/blog"))
        .and(query_param("query", "busan cafe"))
        .and(query_param("display", "2"))
        .and(header("X-Naver-Client-Id", "test-id"))
        .and(header("X-Naver-Client-Secret", "test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total": 57,
            "items": [
                {"title": "<b>Busan</b> cafe", "link": "https://blog.naver.com/a/1", "postdate": "20240502"},
                {"title": "Harbour view", "link": "https://blog.naver.com/b/2", "postdate": "20240430"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let config = SearchConfig {
        endpoint: format!("{}/v1/search/blog", mock_server.uri()),
        client_id: Some("test-id".to_string()),
        client_secret: Some("test-secret".to_string()),
        ..SearchConfig::default()
    };
    let client = NaverSearchClient::new(reqwest::Client::new(), &config).unwrap();

    let entries = client.search("busan cafe", 2).await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].link, "https://blog.naver.com/a/1");
    assert_eq!(entries[0].title.as_deref(), Some("<b>Busan</b> cafe"));
    assert_eq!(entries[1].post_date.as_deref(), Some("20240430"));

    let item = CrawlItem::from_listing(entries[0].clone()).unwrap();
    assert_eq!(item.identifier.as_str(), "https://m.blog.naver.com/a/1");
}

#[tokio::test]
async fn test_search_failure_yields_empty_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search/blog"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let config = SearchConfig {
        endpoint: format!("{}/v1/search/blog", mock_server.uri()),
        client_id: Some("bad".to_string()),
        client_secret: Some("bad".to_string()),
        ..SearchConfig::default()
    };
    let client = NaverSearchClient::new(reqwest::Client::new(), &config).unwrap();

    assert!(client.search("anything", 5).await.is_empty());
    assert!(client.try_search("anything", 5).await.is_err());
}

#[tokio::test]
async fn test_crawl_and_export_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/harbour/1"))
        .respond_with(html(POST_ONE))
        .mount(&mock_server)
        .await;

    let link = format!("{}/harbour/1", base_url);
    let listing = ListingEntry {
        link: link.clone(),
        title: Some("<b>Harbour</b> walk".to_string()),
        post_date: Some("20240502".to_string()),
    };

    let coordinator = Coordinator::new(http_fetcher(), options(Duration::from_secs(5)));
    let result = coordinator
        .run(vec![CrawlItem::from_listing(listing).unwrap()])
        .await;
    assert_eq!(result.outcome(), BatchOutcome::Complete);

    let dir = TempDir::new().unwrap();
    let crawl_time = Local.with_ymd_and_hms(2024, 5, 3, 8, 0, 0).unwrap();
    let path = CsvSink::new(dir.path())
        .write_at(result.records(), crawl_time)
        .unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "blog_content_20240503_080000.csv"
    );

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(BOM));

    let mut reader = csv::Reader::from_reader(&bytes[BOM.len()..]);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(&row[0], link.as_str());
    assert_eq!(&row[1], "Morning at the harbour");
    assert_eq!(&row[3], "2");
    assert_eq!(&row[4], "3");
    assert_eq!(&row[6], "12");
    assert_eq!(&row[7], "31");
    assert_eq!(&row[9], "Harbour walk");
    assert_eq!(&row[10], "20240502");
    assert_eq!(&row[11], "2024-05-03 08:00:00");
}
