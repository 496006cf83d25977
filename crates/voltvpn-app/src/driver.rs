//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from the terminal. Each
//! frontend implements it to provide input and rendering, while the generic
//! [`crate::Runtime`] handles all orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use crate::{Dashboard, DashboardEvent};

/// Abstracts user I/O for the runtime.
///
/// # Implementations
///
/// - **TUI**: crossterm events, ratatui rendering
/// - **Simulation**: scripted events, recorded renders
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type of the dashboard this driver renders.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next input event.
    ///
    /// Returns `None` when input was consumed without producing an event.
    /// Must be cancel-safe: the runtime drops the future whenever another
    /// source wakes first.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<DashboardEvent<Self::Instant>>, Self::Error>> + Send;

    /// Render the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, dashboard: &Dashboard<Self::Instant>) -> Result<(), Self::Error>;

    /// Restore the platform and release resources.
    fn stop(&mut self);
}
