//! Periodic status refresh.
//!
//! The poller is a spawned task that fetches `/api/status` immediately and
//! then once per interval, writing each result into the [`Store`]. A failed
//! fetch marks the store stale and keeps the last status. The task ends as
//! soon as its [`PollerHandle`] is stopped, dropped, or shut down, including
//! while a fetch is in flight.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use voltvpn_client::VpnApi;
use voltvpn_core::{Environment, TransportError};

use crate::Store;

/// Fetch the status once and write the outcome into the store.
///
/// Shared by the poller and the controller's post-settlement refresh.
pub(crate) async fn refresh_status<A, E>(
    api: &A,
    env: &E,
    store: &Store<E::Instant>,
) -> Result<(), TransportError>
where
    A: VpnApi,
    E: Environment,
{
    match api.fetch_status().await {
        Ok(state) => {
            tracing::debug!(connected = state.connected, "status refreshed");
            store.replace(state, env.now());
            Ok(())
        },
        Err(e) => {
            tracing::warn!(error = %e, "status refresh failed, keeping last snapshot");
            store.mark_stale(env.now(), e.clone());
            Err(e)
        },
    }
}

/// Handle to a running poller.
///
/// Dropping the handle stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop the poller without waiting for it.
    ///
    /// No store write happens after the task observes the stop, which is at
    /// its next await point.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop the poller and wait until the task has exited.
    ///
    /// No store write from this poller happens after this returns.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "status poller task failed");
        }
    }

    /// True until stopped or finished.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Status poller task.
pub(crate) struct Poller<A, E: Environment> {
    api: Arc<A>,
    env: E,
    store: Store<E::Instant>,
    interval: Duration,
}

impl<A, E> Poller<A, E>
where
    A: VpnApi,
    E: Environment,
{
    pub(crate) fn new(api: Arc<A>, env: E, store: Store<E::Instant>, interval: Duration) -> Self {
        Self { api, env, store, interval }
    }

    /// Spawn onto the current tokio runtime.
    pub(crate) fn spawn(self) -> PollerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(self.run(token));
        PollerHandle { cancel, task: Some(task) }
    }

    async fn run(self, cancel: CancellationToken) {
        tracing::debug!(interval = ?self.interval, "status poller started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = refresh_status(&*self.api, &self.env, &self.store) => {},
            }
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = self.env.sleep(self.interval) => {},
            }
        }

        tracing::debug!("status poller stopped");
    }
}
