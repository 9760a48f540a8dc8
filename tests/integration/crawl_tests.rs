//! Integration tests for the crawler
//!
//! Deterministic end-to-end runs use stub fetchers; the HTTP path is
//! exercised against wiremock servers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_spider::config::Config;
use sumi_spider::crawler::{crawl, Coordinator, FetchResult, Fetcher, HttpFetcher};
use sumi_spider::output::{DiagnosticSink, ErrorLog, MemorySink};
use sumi_spider::{CrawlError, CrawlPhase, CrawlState, SpiderError, StopReason};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves fixed pages and records every fetched address
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn with_page(mut self, address: &str, body: &str) -> Self {
        self.pages.insert(address.to_string(), body.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, address: &str) -> FetchResult {
        self.calls.lock().unwrap().push(address.to_string());
        match self.pages.get(address) {
            Some(body) => FetchResult::page(address, body.clone()),
            None => FetchResult::NetworkError {
                error: "Connection refused".to_string(),
            },
        }
    }
}

const ROOT: &str = "https://root.example";

fn root_body() -> String {
    r#"<html><body>
        <a href="https://root.example/a">A</a>
        <a href="https://root.example/b">B</a>
        <a href="ftp://root.example/c">C</a>
    </body></html>"#
        .to_string()
}

fn root_site() -> StubFetcher {
    StubFetcher::default()
        .with_page(ROOT, &root_body())
        .with_page("https://root.example/a", "<p>leaf</p>")
        .with_page("https://root.example/b", "<p>leaf</p>")
}

#[tokio::test]
async fn test_depth_one_fetches_only_the_seed() {
    let fetcher = Arc::new(root_site());
    let sink = Arc::new(MemorySink::new());
    let mut coordinator = Coordinator::new(ROOT, 1, 4, fetcher.clone(), sink.clone());

    let summary = coordinator
        .run_until(std::future::pending())
        .await
        .expect("crawl failed");

    // Children sit at depth 1 == bound, so they are reached but never fetched
    assert_eq!(fetcher.calls(), vec![ROOT.to_string()]);
    assert_eq!(summary.stop_reason, StopReason::DepthBoundReached);
    assert_eq!(summary.totals.items_enqueued, 2);
    assert_eq!(
        sink.errors(),
        vec![CrawlError::MalformedCandidate {
            candidate: "ftp://root.example/c".to_string()
        }]
    );
    assert_eq!(coordinator.phase(), CrawlPhase::Stopped);
    assert!(coordinator.frontier().is_empty());
}

#[tokio::test]
async fn test_depth_two_fetches_both_children_then_exhausts() {
    let fetcher = Arc::new(root_site());
    let sink = Arc::new(MemorySink::new());
    let mut coordinator = Coordinator::new(ROOT, 2, 4, fetcher.clone(), sink.clone());

    let summary = coordinator
        .run_until(std::future::pending())
        .await
        .expect("crawl failed");

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], ROOT);
    let depth_one: Vec<_> = calls[1..].to_vec();
    assert!(depth_one.contains(&"https://root.example/a".to_string()));
    assert!(depth_one.contains(&"https://root.example/b".to_string()));

    assert_eq!(summary.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(summary.totals.pages_fetched, 3);
    assert_eq!(summary.totals.malformed_candidates, 1);
    assert_eq!(summary.items_discarded, 0);
    assert_eq!(sink.errors().len(), 1);
    assert_eq!(coordinator.phase(), CrawlPhase::Stopped);
}

#[tokio::test]
async fn test_zero_depth_performs_no_fetch() {
    let fetcher = Arc::new(root_site());
    let mut coordinator =
        Coordinator::new(ROOT, 0, 4, fetcher.clone(), Arc::new(MemorySink::new()));

    let summary = coordinator.run_until(std::future::pending()).await.unwrap();

    assert!(fetcher.calls().is_empty());
    assert_eq!(summary.stop_reason, StopReason::DepthBoundReached);
}

#[tokio::test]
async fn test_cycles_are_refetched_up_to_the_bound() {
    // a <-> b: without deduplication each level refetches the other page
    let fetcher = Arc::new(
        StubFetcher::default()
            .with_page("https://a.example/", r#"<a href="https://b.example/">b</a>"#)
            .with_page("https://b.example/", r#"<a href="https://a.example/">a</a>"#),
    );
    let mut coordinator = Coordinator::new(
        "https://a.example/",
        4,
        2,
        fetcher.clone(),
        Arc::new(MemorySink::new()),
    );

    coordinator.run_until(std::future::pending()).await.unwrap();

    assert_eq!(
        fetcher.calls(),
        vec![
            "https://a.example/".to_string(),
            "https://b.example/".to_string(),
            "https://a.example/".to_string(),
            "https://b.example/".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_fetch_failures_are_reported_not_fatal() {
    let fetcher = Arc::new(
        StubFetcher::default()
            .with_page(
                ROOT,
                r#"<a href="https://down.example/">down</a><a href="https://root.example/a">a</a>"#,
            )
            .with_page("https://root.example/a", ""),
    );
    let sink = Arc::new(MemorySink::new());
    let mut coordinator = Coordinator::new(ROOT, 3, 2, fetcher.clone(), sink.clone());

    let summary = coordinator.run_until(std::future::pending()).await.unwrap();

    assert_eq!(summary.totals.pages_fetched, 2);
    assert_eq!(summary.totals.fetch_failures, 1);
    assert_eq!(
        sink.errors(),
        vec![CrawlError::FetchFailure {
            address: "https://down.example/".to_string(),
            reason: "Connection refused".to_string(),
        }]
    );
    assert_eq!(summary.stop_reason, StopReason::FrontierExhausted);
}

/// Slow fan-out site: every page links to five deeper pages
struct SlowFanOut {
    state: Mutex<Option<Arc<CrawlState>>>,
    fetched_after_stop: Mutex<u32>,
}

#[async_trait]
impl Fetcher for SlowFanOut {
    async fn fetch(&self, address: &str) -> FetchResult {
        let stopped = self
            .state
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|state| state.is_stopped());
        if stopped {
            *self.fetched_after_stop.lock().unwrap() += 1;
        }
        tokio::time::sleep(Duration::from_millis(30)).await;
        let body: String = (0..5)
            .map(|i| format!(r#"<a href="{}/{}">{}</a>"#, address, i, i))
            .collect();
        FetchResult::page(address, body)
    }
}

#[tokio::test]
async fn test_interrupt_drains_and_stops_all_workers() {
    let fetcher = Arc::new(SlowFanOut {
        state: Mutex::new(None),
        fetched_after_stop: Mutex::new(0),
    });
    let mut coordinator = Coordinator::new(
        ROOT,
        50,
        4,
        fetcher.clone(),
        Arc::new(MemorySink::new()),
    );
    *fetcher.state.lock().unwrap() = Some(coordinator.state());

    let shutdown = tokio::time::sleep(Duration::from_millis(150));
    let summary = tokio::time::timeout(Duration::from_secs(5), coordinator.run_until(shutdown))
        .await
        .expect("coordinator deadlocked during shutdown")
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::Interrupted);
    assert!(summary.totals.pages_fetched > 0);
    assert!(summary.items_discarded > 0);
    assert_eq!(*fetcher.fetched_after_stop.lock().unwrap(), 0);
    assert_eq!(coordinator.phase(), CrawlPhase::Stopped);
    assert!(coordinator.frontier().is_empty());
}

#[tokio::test]
async fn test_no_fetch_starts_after_depth_stop() {
    let fetcher = Arc::new(SlowFanOut {
        state: Mutex::new(None),
        fetched_after_stop: Mutex::new(0),
    });
    let mut coordinator = Coordinator::new(
        ROOT,
        2,
        4,
        fetcher.clone(),
        Arc::new(MemorySink::new()),
    );
    *fetcher.state.lock().unwrap() = Some(coordinator.state());

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        coordinator.run_until(std::future::pending()),
    )
    .await
    .expect("coordinator deadlocked")
    .unwrap();

    assert_eq!(summary.stop_reason, StopReason::DepthBoundReached);
    assert_eq!(*fetcher.fetched_after_stop.lock().unwrap(), 0);
    // Seed plus at most the five depth-1 pages
    assert!(summary.totals.pages_fetched >= 1 && summary.totals.pages_fetched <= 6);
}

#[tokio::test]
async fn test_http_crawl_against_mock_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body>
            <a href="{base}/page1">Page 1</a>
            <a href="{base}/missing">Missing</a>
            <a href="/relative">Relative</a>
            </body></html>"#,
            base = base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!(
                r#"<a href="{}/deeper">Too deep</a>"#,
                base_url
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("error_log.txt");
    let config = Config::default();
    let fetcher = HttpFetcher::new(&config.user_agent, &config.crawler).unwrap();
    let sink: Arc<dyn DiagnosticSink> = Arc::new(ErrorLog::open(&log_path).unwrap());

    let mut coordinator =
        Coordinator::new(format!("{}/", base_url), 2, 4, Arc::new(fetcher), sink);
    let summary = coordinator.run_until(std::future::pending()).await.unwrap();

    assert_eq!(summary.stop_reason, StopReason::DepthBoundReached);
    assert_eq!(summary.totals.pages_fetched, 2);
    assert_eq!(summary.totals.fetch_failures, 1);
    assert_eq!(summary.totals.malformed_candidates, 1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Invalid URL format: /relative"));
    assert!(log.contains(&format!("Fetch failed for {}/missing: HTTP 404", base_url)));
    assert_eq!(log.lines().count(), 2);
}

#[tokio::test]
async fn test_negative_depth_performs_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = crawl(&Config::default(), &format!("{}/", mock_server.uri()), -1).await;
    assert!(matches!(result, Err(SpiderError::NegativeDepth(-1))));
}

#[tokio::test]
async fn test_invalid_seed_performs_no_requests() {
    let result = crawl(&Config::default(), "ftp://root.example/", 2).await;
    assert!(matches!(result, Err(SpiderError::InvalidSeed { .. })));
}
