use std::sync::Arc;

use slopwatch::core::poller::PollOutcome;
use slopwatch::core::source::ListingSource;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::harness::{
    RecordingNotifier, StaticSource, TWO_CANDIDATE_PAGE, fast_options, fetcher_for, ids, rig, task,
};

async fn serve_two_candidate_page() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_CANDIDATE_PAGE))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn empty_cache_announces_the_single_valid_task_and_rewrites_the_file() {
    let server = serve_two_candidate_page().await;
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("task_cache.json");

    let source: Arc<dyn ListingSource> = Arc::new(fetcher_for(&server.uri()));
    let rig = rig(source, RecordingNotifier::default(), &cache, fast_options()).await;

    let PollOutcome::Completed(report) = rig.poller.poll_once().await else {
        panic!("poll should not be busy");
    };

    assert_eq!(report.fetched, 1);
    assert_eq!(report.notified, 1);
    assert!(report.persisted);
    assert_eq!(rig.notifier.sent_ids(), vec!["/t/1"]);
    assert_eq!(ids(&rig.poller.seen().await), vec!["/t/1"]);

    let written = std::fs::read_to_string(&cache).expect("cache file written");
    assert_eq!(written, r#"["/t/1"]"#);
}

#[tokio::test]
async fn seen_task_is_not_announced_again_and_file_is_untouched() {
    let server = serve_two_candidate_page().await;
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("task_cache.json");
    // Distinct formatting from what the store writes, so a rewrite would show.
    std::fs::write(&cache, "[ \"/t/1\" ]\n").expect("seed cache");

    let source: Arc<dyn ListingSource> = Arc::new(fetcher_for(&server.uri()));
    let rig = rig(source, RecordingNotifier::default(), &cache, fast_options()).await;

    let outcome = rig.poller.poll_once().await;

    assert_eq!(outcome.notified(), 0);
    assert!(rig.notifier.sent_ids().is_empty());
    assert_eq!(ids(&rig.poller.seen().await), vec!["/t/1"]);
    let on_disk = std::fs::read_to_string(&cache).expect("cache file");
    assert_eq!(on_disk, "[ \"/t/1\" ]\n");
}

#[tokio::test]
async fn second_cycle_over_unchanged_listings_is_silent() {
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("cache.json");
    let source = Arc::new(StaticSource::new(vec![task("/t/1"), task("/t/2"), task("/t/3")]));

    let rig = rig(
        Arc::clone(&source) as Arc<dyn ListingSource>,
        RecordingNotifier::default(),
        &cache,
        fast_options(),
    )
    .await;

    assert_eq!(rig.poller.poll_once().await.notified(), 3);
    assert_eq!(rig.poller.poll_once().await.notified(), 0);
    assert_eq!(source.fetches(), 2);
    assert_eq!(rig.notifier.sent_ids(), vec!["/t/1", "/t/2", "/t/3"]);
}

#[tokio::test]
async fn restart_reloads_the_cache_from_disk() {
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("cache.json");
    let listings = vec![task("/t/1"), task("/t/2")];

    let first = rig(
        Arc::new(StaticSource::new(listings.clone())),
        RecordingNotifier::default(),
        &cache,
        fast_options(),
    )
    .await;
    assert_eq!(first.poller.poll_once().await.notified(), 2);
    drop(first);

    let mut grown = listings;
    grown.insert(0, task("/t/3"));
    let second = rig(
        Arc::new(StaticSource::new(grown)),
        RecordingNotifier::default(),
        &cache,
        fast_options(),
    )
    .await;

    assert_eq!(second.poller.poll_once().await.notified(), 1);
    assert_eq!(second.notifier.sent_ids(), vec!["/t/3"]);
    assert_eq!(
        ids(&second.poller.seen().await),
        vec!["/t/1", "/t/2", "/t/3"]
    );
}

#[tokio::test]
async fn wrapped_listing_announces_each_item_under_its_own_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<main class="task-list"><h1>Open Tasks</h1>
               <div class="task-item"><h3>Fix bug</h3><a href="/t/1">Open</a></div>
               <div class="task-item"><h3>Add tests</h3><a href="/t/2">Open</a></div>
               </main>"#,
        ))
        .mount(&server)
        .await;
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("task_cache.json");

    let fetcher = fetcher_for(&server.uri());
    let listed = fetcher.fetch_listings().await;
    let titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Fix bug", "Add tests"]);

    let rig = rig(Arc::new(fetcher), RecordingNotifier::default(), &cache, fast_options()).await;
    assert_eq!(rig.poller.poll_once().await.notified(), 2);
    assert_eq!(rig.notifier.sent_ids(), vec!["/t/1", "/t/2"]);
}
