//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`voltvpn_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Input comes from a script. `Wait` steps sleep on the tokio clock, so under
//! `start_paused` they let every spawned lifecycle call and poller tick
//! settle before the next key. When the script runs out the driver presses
//! `q`.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::Instant;
use voltvpn_app::{Dashboard, DashboardEvent, Driver, KeyInput};
use voltvpn_core::LifecyclePhase;

use crate::invariants::{InvariantRegistry, Observation, SystemSnapshot};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// One scripted input step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimInput {
    /// Press a key.
    Key(KeyInput),
    /// Resize the terminal.
    Resize(u16, u16),
    /// Let simulated time pass.
    Wait(Duration),
}

/// What the dashboard showed at one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Store revision rendered.
    pub revision: u64,
    /// Connection flag rendered.
    pub connected: bool,
    /// Current server rendered.
    pub current_server_id: Option<String>,
    /// Lifecycle phase rendered.
    pub phase: LifecyclePhase,
    /// Visible notification messages.
    pub notifications: Vec<String>,
    /// Selected server.
    pub selected: Option<String>,
    /// Status was stale.
    pub stale: bool,
}

impl RenderedFrame {
    fn capture(dashboard: &Dashboard<Instant>) -> Self {
        let snapshot = dashboard.snapshot();
        Self {
            revision: snapshot.revision,
            connected: snapshot.connection.connected,
            current_server_id: snapshot.connection.current_server_id.clone(),
            phase: dashboard.phase().clone(),
            notifications: dashboard.notifications().iter().map(|n| n.message.clone()).collect(),
            selected: dashboard.selected_server().map(|s| s.id.clone()),
            stale: snapshot.freshness.is_stale(),
        }
    }
}

/// Shared record of everything rendered.
#[derive(Debug, Clone, Default)]
pub struct SimRecorder {
    frames: Arc<Mutex<Vec<RenderedFrame>>>,
}

impl SimRecorder {
    fn lock(&self) -> MutexGuard<'_, Vec<RenderedFrame>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All frames, in render order.
    pub fn frames(&self) -> Vec<RenderedFrame> {
        self.lock().clone()
    }

    /// Most recent frame.
    pub fn last(&self) -> Option<RenderedFrame> {
        self.lock().last().cloned()
    }

    /// True if any frame showed `message`.
    pub fn saw_notification(&self, message: &str) -> bool {
        self.lock().iter().any(|frame| frame.notifications.iter().any(|m| m == message))
    }
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`voltvpn_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
pub struct SimDriver {
    script: VecDeque<SimInput>,
    /// Deadline of a `Wait` interrupted by another event source.
    waiting_until: Option<Instant>,
    recorder: SimRecorder,
    invariants: Option<InvariantRegistry>,
    history: SystemSnapshot,
}

impl SimDriver {
    /// Create a driver that plays `script`, then quits.
    pub fn new(script: impl IntoIterator<Item = SimInput>) -> Self {
        Self {
            script: script.into_iter().collect(),
            waiting_until: None,
            recorder: SimRecorder::default(),
            invariants: None,
            history: SystemSnapshot::empty(),
        }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Handle to the rendered frames. Stays valid after the runtime consumed
    /// the driver.
    pub fn recorder(&self) -> SimRecorder {
        self.recorder.clone()
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<DashboardEvent<Instant>>, Self::Error> {
        loop {
            if let Some(deadline) = self.waiting_until {
                tokio::time::sleep_until(deadline).await;
                self.waiting_until = None;
                return Ok(None);
            }

            match self.script.pop_front() {
                Some(SimInput::Wait(duration)) => self.waiting_until = Some(Instant::now() + duration),
                Some(SimInput::Key(key)) => return Ok(Some(DashboardEvent::Key(key))),
                Some(SimInput::Resize(cols, rows)) => {
                    return Ok(Some(DashboardEvent::Resize(cols, rows)));
                },
                None => return Ok(Some(DashboardEvent::Key(KeyInput::Char('q')))),
            }
        }
    }

    fn render(&mut self, dashboard: &Dashboard<Instant>) -> Result<(), Self::Error> {
        let snapshot = dashboard.snapshot();
        self.history.record(Observation::from_store(snapshot));

        if let Some(registry) = &self.invariants {
            registry.check_all(&self.history).map_err(|violations| {
                let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
                SimDriverError(messages.join("; "))
            })?;
        }

        self.recorder.lock().push(RenderedFrame::capture(dashboard));
        Ok(())
    }

    fn stop(&mut self) {
        tracing::debug!(frames = self.recorder.lock().len(), "simulation driver stopped");
    }
}
