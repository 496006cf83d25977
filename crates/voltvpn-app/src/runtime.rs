//! Generic runtime for dashboard orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`Dashboard`]: view model
//! - [`Widget`]: store, controller and poller
//! - [`Driver`]: platform-specific I/O
//!
//! Lifecycle calls are spawned so the loop keeps rendering while they are in
//! flight; their outcomes reach the dashboard through the store, the phase
//! channel and the notification feed like any other change.

use std::{fmt::Display, future::Future, time::Duration};

use tokio::sync::{
    broadcast::{self, error::RecvError},
    watch,
};
use voltvpn_client::VpnApi;
use voltvpn_core::{Environment, LifecyclePhase};

use crate::{
    Controller, Dashboard, DashboardAction, DashboardEvent, Driver, Notification, StoreSnapshot,
    Widget,
};

/// Cadence of [`DashboardEvent::Tick`], which expires notifications.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Widget-side event sources the loop waits on.
struct Feeds<I> {
    store: watch::Receiver<StoreSnapshot<I>>,
    phase: watch::Receiver<LifecyclePhase>,
    notifications: broadcast::Receiver<Notification<I>>,
}

/// Generic runtime that orchestrates Dashboard, Widget, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `A`: Remote VPN service
/// - `E`: Environment for time
pub struct Runtime<D, A, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    dashboard: Dashboard<E::Instant>,
    widget: Widget<A, E>,
}

impl<D, A, E> Runtime<D, A, E>
where
    D: Driver<Instant = E::Instant>,
    A: VpnApi,
    E: Environment,
{
    /// Create a runtime around a widget that has not been started yet.
    pub fn new(driver: D, widget: Widget<A, E>) -> Self {
        let config = widget.config();
        let dashboard = Dashboard::new(config.api_url.clone(), config.notification_ttl);
        Self { driver, dashboard, widget }
    }

    /// Run until the dashboard asks to quit.
    ///
    /// Starts the widget, then loops over driver input, store writes, phase
    /// changes, notifications and ticks. On exit the poller is shut down and
    /// the driver stopped; lifecycle calls still in flight run to completion
    /// in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let mut feeds = Feeds {
            store: self.widget.subscribe(),
            phase: self.widget.subscribe_phase(),
            notifications: self.widget.notifications(),
        };

        let result = self.event_loop(&mut feeds).await;

        self.widget.shutdown().await;
        self.driver.stop();
        result
    }

    async fn event_loop(&mut self, feeds: &mut Feeds<E::Instant>) -> Result<(), D::Error> {
        self.driver.render(&self.dashboard)?;
        self.widget.start().await;

        let env = self.widget.env().clone();
        let tick = env.sleep(TICK_INTERVAL);
        tokio::pin!(tick);
        let mut notifications_open = true;

        loop {
            let event = tokio::select! {
                input = self.driver.poll_event() => match input? {
                    Some(event) => event,
                    None => continue,
                },
                Ok(()) = feeds.store.changed() => {
                    DashboardEvent::StoreChanged(feeds.store.borrow_and_update().clone())
                },
                Ok(()) = feeds.phase.changed() => {
                    DashboardEvent::PhaseChanged(feeds.phase.borrow_and_update().clone())
                },
                received = feeds.notifications.recv(), if notifications_open => match received {
                    Ok(notification) => DashboardEvent::Notified(notification),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification feed lagged");
                        continue;
                    },
                    Err(RecvError::Closed) => {
                        notifications_open = false;
                        continue;
                    },
                },
                () = &mut tick => {
                    tick.set(env.sleep(TICK_INTERVAL));
                    DashboardEvent::Tick(env.now())
                },
            };

            if self.dispatch(event)? {
                return Ok(());
            }
        }
    }

    /// Feed one event to the dashboard and execute its actions.
    ///
    /// Returns `true` if should quit.
    fn dispatch(&mut self, event: DashboardEvent<E::Instant>) -> Result<bool, D::Error> {
        for action in self.dashboard.handle(event) {
            match action {
                DashboardAction::Render => self.driver.render(&self.dashboard)?,
                DashboardAction::Quit => return Ok(true),
                DashboardAction::Connect { server_id } => {
                    self.spawn("connect", move |c| async move { c.connect(&server_id).await });
                },
                DashboardAction::QuickConnect => {
                    self.spawn("quick connect", |c| async move { c.quick_connect().await });
                },
                DashboardAction::Disconnect => {
                    self.spawn("disconnect", |c| async move { c.disconnect().await });
                },
                DashboardAction::Refresh => {
                    self.spawn("refresh", |c| async move { c.refresh().await });
                },
                DashboardAction::ReloadServers => {
                    self.spawn("reload servers", |c| async move { c.reload_servers().await });
                },
            }
        }
        Ok(false)
    }

    /// Run a controller call on its own task.
    ///
    /// Errors were already surfaced as notifications or staleness, so they
    /// are only logged here.
    fn spawn<F, Fut, Err>(&self, operation: &'static str, call: F)
    where
        F: FnOnce(Controller<A, E>) -> Fut,
        Fut: Future<Output = Result<(), Err>> + Send + 'static,
        Err: Display + Send + 'static,
    {
        let task = call(self.widget.controller().clone());
        tokio::spawn(async move {
            match task.await {
                Ok(()) => tracing::debug!(operation, "completed"),
                Err(e) => tracing::debug!(operation, error = %e, "finished with error"),
            }
        });
    }

    /// The dashboard view model.
    pub fn dashboard(&self) -> &Dashboard<E::Instant> {
        &self.dashboard
    }

    /// The widget driven by this runtime.
    pub fn widget(&self) -> &Widget<A, E> {
        &self.widget
    }
}
