use std::sync::Arc;

use slopwatch::config::FilterConfig;
use slopwatch::core::poller::{PollOutcome, PollerOptions, TaskFilter};
use tempfile::TempDir;

use crate::harness::{RecordingNotifier, StaticSource, fast_options, ids, rig, task};

fn listings() -> Arc<StaticSource> {
    Arc::new(StaticSource::new(vec![task("/t/1"), task("/t/2"), task("/t/3")]))
}

#[tokio::test]
async fn only_delivered_tasks_are_marked_seen_by_default() {
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("cache.json");
    let rig = rig(
        listings(),
        RecordingNotifier::failing(&["/t/2"]),
        &cache,
        fast_options(),
    )
    .await;

    let PollOutcome::Completed(report) = rig.poller.poll_once().await else {
        panic!("poll should not be busy");
    };

    assert_eq!(report.new, 3);
    assert_eq!(report.notified, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(ids(&rig.poller.seen().await), vec!["/t/1", "/t/3"]);

    // The failed task is offered again on the next cycle.
    let PollOutcome::Completed(retry) = rig.poller.poll_once().await else {
        panic!("poll should not be busy");
    };
    assert_eq!(retry.new, 1);
    assert_eq!(retry.failed, 1);
}

#[tokio::test]
async fn mark_seen_on_failure_records_every_attempt() {
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("cache.json");
    let options = PollerOptions {
        mark_seen_on_failure: true,
        ..fast_options()
    };
    let rig = rig(listings(), RecordingNotifier::failing(&["/t/2"]), &cache, options).await;

    let PollOutcome::Completed(report) = rig.poller.poll_once().await else {
        panic!("poll should not be busy");
    };

    assert_eq!(report.notified, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(ids(&rig.poller.seen().await), vec!["/t/1", "/t/2", "/t/3"]);
    assert_eq!(rig.poller.poll_once().await.notified(), 0);

    let on_disk: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&cache).expect("cache")).expect("json");
    assert_eq!(on_disk, vec!["/t/1", "/t/2", "/t/3"]);
}

#[tokio::test]
async fn all_deliveries_failing_leaves_the_file_alone() {
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("cache.json");
    let rig = rig(
        listings(),
        RecordingNotifier::failing(&["/t/1", "/t/2", "/t/3"]),
        &cache,
        fast_options(),
    )
    .await;

    let PollOutcome::Completed(report) = rig.poller.poll_once().await else {
        panic!("poll should not be busy");
    };

    assert_eq!(report.failed, 3);
    assert!(!report.persisted);
    assert!(!cache.exists());
}

#[tokio::test]
async fn filtered_tasks_are_neither_announced_nor_marked_seen() {
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("cache.json");

    let mut wanted = task("/t/1");
    wanted.title = "Rust indexer".into();
    let mut other = task("/t/2");
    other.title = "Logo design".into();

    let options = PollerOptions {
        filter: TaskFilter::from_config(&FilterConfig {
            include_keywords: vec!["rust".into()],
            ..FilterConfig::default()
        }),
        ..fast_options()
    };
    let rig = rig(
        Arc::new(StaticSource::new(vec![wanted, other])),
        RecordingNotifier::default(),
        &cache,
        options,
    )
    .await;

    let PollOutcome::Completed(report) = rig.poller.poll_once().await else {
        panic!("poll should not be busy");
    };

    assert_eq!(report.new, 1);
    assert_eq!(report.filtered, 1);
    assert_eq!(rig.notifier.sent_ids(), vec!["/t/1"]);
    assert_eq!(ids(&rig.poller.seen().await), vec!["/t/1"]);
}
