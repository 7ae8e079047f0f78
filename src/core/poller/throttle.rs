use tokio::time::{Duration, Instant};

/// Spaces out consecutive deliveries by at least `interval`.
///
/// Lives as long as the poller, so spacing also holds across back-to-back
/// poll cycles.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Wait until the next delivery slot, then claim it.
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}
