//! Pacing between calls to the generation service.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Gate awaited before every generation call.
pub trait RateLimiter: Send + Sync {
    /// Resolve once the next call may be made.
    fn acquire(&self) -> impl Future<Output = ()> + Send;
}

/// Enforces a minimum interval between consecutive acquisitions.
///
/// The first acquisition passes immediately. A zero interval never waits.
#[derive(Debug)]
pub struct FixedIntervalGate {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl FixedIntervalGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// A gate that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl RateLimiter for FixedIntervalGate {
    async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if !self.interval.is_zero() {
            if let Some(prev) = *last {
                let ready_at = prev + self.interval;
                let now = Instant::now();
                if ready_at > now {
                    debug!(wait_ms = (ready_at - now).as_millis() as u64, "pacing generation call");
                    tokio::time::sleep_until(ready_at).await;
                }
            }
        }
        *last = Some(Instant::now());
    }
}
