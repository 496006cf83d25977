//! Environment abstraction for deterministic testing.
//!
//! Decouples controller logic from the system clock. Production uses real
//! time and tokio timers; tests drive a paused tokio clock or a virtual
//! instant type.

use std::time::Duration;

/// Abstract environment providing time and async sleeping.
///
/// Implementations MUST guarantee that `now()` never goes backwards.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `tokio::time::Instant`, simulation
    /// environments may use virtual time.
    type Instant: Copy
        + Ord
        + Send
        + Sync
        + std::fmt::Debug
        + std::ops::Sub<Output = Duration>
        + 'static;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only used by driver code such as the status poller, never by the pure
    /// state machines.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
