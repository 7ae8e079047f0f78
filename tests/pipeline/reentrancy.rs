use std::sync::Arc;

use slopwatch::core::poller::PollOutcome;
use tempfile::TempDir;
use tokio::time::Duration;

use crate::harness::{RecordingNotifier, StaticSource, fast_options, rig, task};

#[tokio::test(start_paused = true)]
async fn overlapping_trigger_is_reported_busy() {
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("cache.json");
    let rig = rig(
        Arc::new(StaticSource::new(vec![task("/t/1")])),
        RecordingNotifier::slow(Duration::from_secs(5)),
        &cache,
        fast_options(),
    )
    .await;

    let running = {
        let poller = Arc::clone(&rig.poller);
        tokio::spawn(async move { poller.poll_once().await })
    };
    // Let the spawned cycle take the guard and park in the notifier.
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(rig.poller.poll_once().await, PollOutcome::Busy);

    let first = running.await.expect("cycle task");
    assert_eq!(first.notified(), 1);
    assert_eq!(rig.notifier.sent_ids(), vec!["/t/1"]);

    // Guard is released once the cycle completes.
    assert!(matches!(
        rig.poller.poll_once().await,
        PollOutcome::Completed(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn deliveries_are_spaced_by_the_notify_interval() {
    let dir = TempDir::new().expect("tempdir");
    let cache = dir.path().join("cache.json");
    let mut options = fast_options();
    options.notify_interval = Duration::from_secs(1);
    let rig = rig(
        Arc::new(StaticSource::new(vec![task("/t/1"), task("/t/2"), task("/t/3")])),
        RecordingNotifier::default(),
        &cache,
        options,
    )
    .await;

    let start = tokio::time::Instant::now();
    assert_eq!(rig.poller.poll_once().await.notified(), 3);

    assert!(start.elapsed() >= Duration::from_secs(2));
}
