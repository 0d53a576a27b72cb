//! Time source used by the batch verifier

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Source of time and delays for scheduling decisions
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_sleep_advances_now() {
        let clock = TokioClock;
        let start = clock.now();
        clock.sleep(Duration::from_millis(500)).await;
        assert!(clock.now() - start >= Duration::from_millis(500));
    }
}
