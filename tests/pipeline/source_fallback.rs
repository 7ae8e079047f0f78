use serde_json::json;
use slopwatch::core::source::ListingSource;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::harness::{TWO_CANDIDATE_PAGE, fetcher_for};

#[tokio::test]
async fn api_array_wins_over_html() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "title": "API task", "type": "RFQ"},
            {"title": "no id, dropped"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_CANDIDATE_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let tasks = fetcher_for(&server.uri()).fetch_listings().await;

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "7");
    assert_eq!(tasks[0].title, "API task");
    assert_eq!(tasks[0].link, format!("{}/tasks/7", server.uri()));
    assert_eq!(tasks[0].category.as_deref(), Some("RFQ"));
    server.verify().await;
}

#[tokio::test]
async fn later_candidate_is_tried_when_earlier_ones_fail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "abc", "name": "From tasks.json", "url": "https://elsewhere.example/x"}
        ])))
        .mount(&server)
        .await;

    let tasks = fetcher_for(&server.uri()).fetch_listings().await;

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "From tasks.json");
    assert_eq!(tasks[0].link, "https://elsewhere.example/x");
}

#[tokio::test]
async fn html_is_scraped_when_no_api_answers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_CANDIDATE_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = fetcher_for(&server.uri()).fetch_listings().await;

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "/t/1");
    assert_eq!(tasks[0].title, "Fix bug");
    assert_eq!(tasks[0].description.as_deref(), Some("Crash on startup"));
    assert_eq!(tasks[0].link, format!("{}/t/1", server.uri()));
    server.verify().await;
}

#[tokio::test]
async fn empty_api_array_counts_as_an_answer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_CANDIDATE_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let tasks = fetcher_for(&server.uri()).fetch_listings().await;

    assert!(tasks.is_empty());
    server.verify().await;
}

#[tokio::test]
async fn failing_page_yields_no_tasks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tasks = fetcher_for(&server.uri()).fetch_listings().await;

    assert!(tasks.is_empty());
}

#[tokio::test]
async fn transient_page_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_CANDIDATE_PAGE))
        .mount(&server)
        .await;

    let mut config = crate::harness::source_config(&server.uri());
    config.retries = 2;
    let extractor = slopwatch::core::TaskExtractor::new(&Default::default()).expect("selectors");
    let fetcher = slopwatch::core::TaskFetcher::new(config, extractor).expect("client");

    let html = fetcher.fetch_page().await.expect("second attempt succeeds");
    assert!(html.contains("Fix bug"));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = crate::harness::source_config(&server.uri());
    config.retries = 3;
    let extractor = slopwatch::core::TaskExtractor::new(&Default::default()).expect("selectors");
    let fetcher = slopwatch::core::TaskFetcher::new(config, extractor).expect("client");

    assert!(fetcher.fetch_page().await.is_err());
    server.verify().await;
}
