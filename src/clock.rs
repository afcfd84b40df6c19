//! Clock abstraction so cache expiry and the sync settle pause can be
//! driven by tests.

use async_trait::async_trait;
#[cfg(test)]
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant};

#[async_trait]
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

#[derive(Clone, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Advances only when told to. `sleep` is a no-op that records the
/// requested duration.
#[cfg(test)]
#[derive(Clone)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
    slept: Arc<Mutex<Vec<Duration>>>,
}

#[cfg(test)]
impl MockClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
            slept: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.current.lock().unwrap() += duration;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}
