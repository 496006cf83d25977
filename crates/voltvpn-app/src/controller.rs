//! Connection lifecycle controller.
//!
//! Drives connect/disconnect intents against the remote service through the
//! sans-IO [`Lifecycle`] machine:
//!
//! 1. `begin_*` under the lifecycle lock (rejects with `OperationInProgress`
//!    before any network call)
//! 2. the remote call, with the lock released
//! 3. `settle`, which returns the phase to `Idle`
//! 4. the returned actions in order: one status refresh, then one
//!    notification
//!
//! Steps 2-4 run on a spawned task that the caller only awaits. Dropping the
//! caller's future detaches the task; the operation still settles.
//!
//! The lifecycle lock is a `std::sync::Mutex` and is never held across an
//! await.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{broadcast, watch};
use voltvpn_client::{ApiError, ConnectAck, VpnApi};
use voltvpn_core::{
    Environment, Lifecycle, LifecycleAction, LifecycleError, LifecyclePhase, Notice, Settlement,
    TransportError, select_least_loaded,
};

use crate::{Notification, Store, notification::Notifier, poller::refresh_status};

/// Lifecycle controller.
///
/// Cheap to clone; clones share the store, the guard and the notification
/// feed, so concurrent calls from different clones are still single-flight.
pub struct Controller<A, E: Environment> {
    api: Arc<A>,
    env: E,
    store: Store<E::Instant>,
    notifier: Notifier<E::Instant>,
    lifecycle: Arc<Mutex<Lifecycle>>,
    phase: Arc<watch::Sender<LifecyclePhase>>,
}

impl<A, E: Environment> Clone for Controller<A, E> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            env: self.env.clone(),
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            lifecycle: Arc::clone(&self.lifecycle),
            phase: Arc::clone(&self.phase),
        }
    }
}

impl<A, E> Controller<A, E>
where
    A: VpnApi,
    E: Environment,
{
    pub(crate) fn new(
        api: Arc<A>,
        env: E,
        store: Store<E::Instant>,
        notifier: Notifier<E::Instant>,
    ) -> Self {
        let (phase, _) = watch::channel(LifecyclePhase::Idle);
        Self {
            api,
            env,
            store,
            notifier,
            lifecycle: Arc::new(Mutex::new(Lifecycle::new())),
            phase: Arc::new(phase),
        }
    }

    /// Connect to `server_id`.
    ///
    /// Resolves after the post-settlement refresh and notification.
    ///
    /// # Errors
    ///
    /// - `LifecycleError::OperationInProgress` if another operation is in
    ///   flight (no remote call, no notification)
    /// - `LifecycleError::Rejected` if the service answered `success: false`
    /// - `LifecycleError::Transport` if the call failed in transport
    pub async fn connect(&self, server_id: &str) -> Result<(), LifecycleError> {
        self.begin(|lifecycle| lifecycle.begin_connect(server_id))?;
        tracing::info!(server_id, "connecting");

        let controller = self.clone();
        let server_id = server_id.to_owned();
        self.run_to_settlement(async move { controller.finish_connect(&server_id).await }).await
    }

    /// Disconnect the current tunnel.
    ///
    /// # Errors
    ///
    /// Same classification as [`Controller::connect`].
    pub async fn disconnect(&self) -> Result<(), LifecycleError> {
        self.begin(Lifecycle::begin_disconnect)?;
        tracing::info!("disconnecting");

        let controller = self.clone();
        self.run_to_settlement(async move { controller.finish_disconnect().await }).await
    }

    /// Connect to the least loaded server of the last fetched list.
    ///
    /// # Errors
    ///
    /// - `LifecycleError::NoServersAvailable` for an empty list, with an
    ///   error notification
    /// - otherwise as [`Controller::connect`]
    pub async fn quick_connect(&self) -> Result<(), LifecycleError> {
        let target =
            self.store.read(|snapshot| select_least_loaded(&snapshot.servers).map(|s| s.id.clone()));

        let Some(server_id) = target else {
            tracing::info!("quick connect requested with an empty server list");
            self.notifier.emit(Notice::no_servers(), self.env.now());
            return Err(LifecycleError::NoServersAvailable);
        };

        tracing::debug!(server_id, "quick connect selected server");
        self.connect(&server_id).await
    }

    /// Fetch the status once, outside the poll cadence.
    ///
    /// # Errors
    ///
    /// Returns the transport failure after marking the store stale.
    pub async fn refresh(&self) -> Result<(), TransportError> {
        refresh_status(&*self.api, &self.env, &self.store).await
    }

    /// Fetch the server list and replace the stored one.
    ///
    /// # Errors
    ///
    /// Returns the transport failure; the previous list is kept.
    pub async fn reload_servers(&self) -> Result<(), TransportError> {
        match self.api.fetch_servers().await {
            Ok(servers) => {
                tracing::debug!(count = servers.len(), "server list loaded");
                self.store.replace_servers(servers);
                Ok(())
            },
            Err(e) => {
                tracing::warn!(error = %e, "server list fetch failed, keeping previous list");
                Err(e)
            },
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.phase.borrow().clone()
    }

    /// Receiver that wakes on every phase change.
    pub fn subscribe_phase(&self) -> watch::Receiver<LifecyclePhase> {
        self.phase.subscribe()
    }

    /// Notification feed.
    pub fn notifications(&self) -> broadcast::Receiver<Notification<E::Instant>> {
        self.notifier.subscribe()
    }

    /// Shared store.
    pub fn store(&self) -> &Store<E::Instant> {
        &self.store
    }

    pub(crate) fn api(&self) -> &Arc<A> {
        &self.api
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(
        &self,
        start: impl FnOnce(&mut Lifecycle) -> Result<(), LifecycleError>,
    ) -> Result<(), LifecycleError> {
        let mut lifecycle = self.lock();
        if let Err(e) = start(&mut lifecycle) {
            tracing::debug!(error = %e, "lifecycle request ignored");
            return Err(e);
        }
        self.phase.send_replace(lifecycle.phase().clone());
        Ok(())
    }

    async fn finish_connect(&self, server_id: &str) -> Result<(), LifecycleError> {
        let result = self.api.connect(server_id).await;
        let settlement = match &result {
            Ok(ack) => Settlement::Accepted { server_name: self.display_name(ack, server_id) },
            Err(ApiError::Rejected { message }) => Settlement::Rejected { message: message.clone() },
            Err(ApiError::Transport(e)) => {
                tracing::warn!(server_id, error = %e, "connect failed");
                Settlement::TransportFailed
            },
        };

        self.settle(settlement).await;
        result.map(|_| ()).map_err(LifecycleError::from)
    }

    async fn finish_disconnect(&self) -> Result<(), LifecycleError> {
        let result = self.api.disconnect().await;
        let settlement = match &result {
            Ok(_) => Settlement::Accepted { server_name: None },
            Err(ApiError::Rejected { message }) => Settlement::Rejected { message: message.clone() },
            Err(ApiError::Transport(e)) => {
                tracing::warn!(error = %e, "disconnect failed");
                Settlement::TransportFailed
            },
        };

        self.settle(settlement).await;
        result.map(|_| ()).map_err(LifecycleError::from)
    }

    /// Await an operation spawned after a successful `begin`.
    ///
    /// A task that dies before settling (panic, runtime shutdown) is settled
    /// here as a transport failure, so the guard never stays busy.
    async fn run_to_settlement(
        &self,
        operation: impl Future<Output = Result<(), LifecycleError>> + Send + 'static,
    ) -> Result<(), LifecycleError> {
        match tokio::spawn(operation).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "lifecycle task ended without settling");
                self.settle(Settlement::TransportFailed).await;
                Err(LifecycleError::Transport(TransportError::unreachable(e.to_string())))
            },
        }
    }

    async fn settle(&self, settlement: Settlement) {
        let actions = {
            let mut lifecycle = self.lock();
            let actions = lifecycle.settle(settlement);
            self.phase.send_replace(lifecycle.phase().clone());
            actions
        };

        let actions = match actions {
            Ok(actions) => actions,
            Err(e) => {
                tracing::warn!(error = %e, "settlement without an operation in flight");
                return;
            },
        };

        for action in actions {
            match action {
                LifecycleAction::RefreshStatus => {
                    // Failure already recorded as staleness.
                    let _ = self.refresh().await;
                },
                LifecycleAction::Notify(notice) => self.notifier.emit(notice, self.env.now()),
            }
        }
    }

    /// Name for the success message: the reply's, else the list's.
    fn display_name(&self, ack: &ConnectAck, server_id: &str) -> Option<String> {
        ack.server
            .as_ref()
            .filter(|server| server.name != server.id)
            .map(|server| server.name.clone())
            .or_else(|| {
                self.store.read(|snapshot| snapshot.server(server_id).map(|s| s.name.clone()))
            })
    }
}

#[cfg(test)]
mod tests {
    use voltvpn_client::DisconnectAck;
    use voltvpn_core::{ConnectionState, ServerDescriptor};

    use super::*;
    use crate::SystemEnv;

    /// Minimal service: accepts everything, reports a fixed status.
    struct AcceptAll;

    impl VpnApi for AcceptAll {
        async fn fetch_status(&self) -> Result<ConnectionState, TransportError> {
            Ok(ConnectionState::default())
        }

        async fn fetch_servers(&self) -> Result<Vec<ServerDescriptor>, TransportError> {
            Ok(vec![ServerDescriptor::new("uk", "United Kingdom")])
        }

        async fn connect(&self, _server_id: &str) -> Result<ConnectAck, ApiError> {
            Ok(ConnectAck { message: String::new(), server: None })
        }

        async fn disconnect(&self) -> Result<DisconnectAck, ApiError> {
            Ok(DisconnectAck { message: String::new() })
        }
    }

    fn controller() -> Controller<AcceptAll, SystemEnv> {
        Controller::new(Arc::new(AcceptAll), SystemEnv, Store::new(), Notifier::new())
    }

    #[tokio::test]
    async fn success_name_falls_back_to_list() {
        let controller = controller();
        controller.reload_servers().await.unwrap();
        let mut notes = controller.notifications();

        controller.connect("uk").await.unwrap();

        assert_eq!(notes.recv().await.unwrap().message, "Connected to United Kingdom");
        assert!(controller.phase().is_idle());
    }

    #[tokio::test]
    async fn phase_is_published() {
        let controller = controller();
        let mut phases = controller.subscribe_phase();

        controller.disconnect().await.unwrap();

        // Disconnecting then Idle; the receiver holds the latest.
        assert!(phases.has_changed().unwrap());
        assert_eq!(*phases.borrow_and_update(), LifecyclePhase::Idle);
    }

    #[tokio::test]
    async fn quick_connect_on_empty_list_notifies() {
        let controller = controller();
        let mut notes = controller.notifications();

        let err = controller.quick_connect().await.unwrap_err();

        assert_eq!(err, LifecycleError::NoServersAvailable);
        assert_eq!(notes.recv().await.unwrap().message, "No VPN servers available");
    }

    #[tokio::test]
    async fn settlement_refreshes_before_notifying() {
        let controller = controller();
        let mut store = controller.store().subscribe();
        let mut notes = controller.notifications();

        controller.disconnect().await.unwrap();

        assert!(store.has_changed().unwrap());
        assert!(!store.borrow_and_update().is_empty());
        assert_eq!(notes.recv().await.unwrap().message, "VPN disconnected");
    }
}
