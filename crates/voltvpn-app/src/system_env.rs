//! Production [`Environment`] backed by the system clock.
//!
//! `tokio::time::Instant` for time and `tokio::time::sleep` for delays. Under a
//! paused tokio clock (`start_paused`) the sleeps auto-advance, which is what
//! the poller cadence tests rely on.

use std::time::Duration;

use voltvpn_core::Environment;

/// System time and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleep_advances_now() {
        let env = SystemEnv::new();

        let start = env.now();
        env.sleep(Duration::from_secs(5)).await;

        assert!(env.now() - start >= Duration::from_secs(5));
    }
}
