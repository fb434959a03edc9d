//! Minimal spacing between consecutive Jira requests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a minimum interval between request starts. A zero interval disables pacing.
#[derive(Clone, Debug)]
pub struct RequestPacer {
    interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits until the interval since the previous request has elapsed, then stamps the new one.
    pub async fn wait_turn(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut guard = self.last_request.lock().await;
        if let Some(last) = *guard {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                let pause = self.interval - elapsed;
                tracing::trace!(pause_ms = pause.as_millis() as u64, "pacing jira request");
                sleep(pause).await;
            }
        }
        *guard = Some(Instant::now());
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
