//! Widget instance.
//!
//! A [`Widget`] owns everything one dashboard needs: the store, the
//! controller, and the poller handle. Hosts construct as many as they like;
//! there is no global instance.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use voltvpn_client::VpnApi;
use voltvpn_core::{Environment, LifecycleError, LifecyclePhase, TransportError};

use crate::{
    ConfigError, Controller, Notification, PollerHandle, Store, StoreSnapshot, WidgetConfig,
    notification::Notifier, poller::Poller,
};

/// One dashboard's controller, store and poller.
pub struct Widget<A, E: Environment> {
    config: WidgetConfig,
    env: E,
    controller: Controller<A, E>,
    poller: Option<PollerHandle>,
}

impl<A, E> Widget<A, E>
where
    A: VpnApi,
    E: Environment,
{
    /// Create a widget. Nothing runs until [`Widget::start`].
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found.
    pub fn new(api: A, env: E, config: WidgetConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let controller = Controller::new(Arc::new(api), env.clone(), Store::new(), Notifier::new());
        Ok(Self { config, env, controller, poller: None })
    }

    /// Load the server list, then start polling (or fetch the status once
    /// when `auto_refresh` is off).
    ///
    /// Failures are recorded in the store and logged; the widget keeps
    /// running with whatever it has.
    pub async fn start(&mut self) {
        let _ = self.controller.reload_servers().await;

        if self.config.auto_refresh {
            self.poller = Some(self.start_polling());
        } else {
            let _ = self.controller.refresh().await;
        }
    }

    /// Spawn a status poller at the configured cadence.
    ///
    /// The first fetch happens immediately. The caller owns the handle;
    /// dropping it stops the poller.
    pub fn start_polling(&self) -> PollerHandle {
        Poller::new(
            Arc::clone(self.controller.api()),
            self.env.clone(),
            self.controller.store().clone(),
            self.config.poll_interval,
        )
        .spawn()
    }

    /// Stop the poller started by [`Widget::start`] and wait for it.
    pub async fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.shutdown().await;
        }
    }

    /// True while the poller started by [`Widget::start`] runs.
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PollerHandle::is_running)
    }

    /// See [`Controller::connect`].
    ///
    /// # Errors
    ///
    /// See [`Controller::connect`].
    pub async fn connect(&self, server_id: &str) -> Result<(), LifecycleError> {
        self.controller.connect(server_id).await
    }

    /// See [`Controller::disconnect`].
    ///
    /// # Errors
    ///
    /// See [`Controller::disconnect`].
    pub async fn disconnect(&self) -> Result<(), LifecycleError> {
        self.controller.disconnect().await
    }

    /// See [`Controller::quick_connect`].
    ///
    /// # Errors
    ///
    /// See [`Controller::quick_connect`].
    pub async fn quick_connect(&self) -> Result<(), LifecycleError> {
        self.controller.quick_connect().await
    }

    /// See [`Controller::refresh`].
    ///
    /// # Errors
    ///
    /// See [`Controller::refresh`].
    pub async fn refresh(&self) -> Result<(), TransportError> {
        self.controller.refresh().await
    }

    /// See [`Controller::reload_servers`].
    ///
    /// # Errors
    ///
    /// See [`Controller::reload_servers`].
    pub async fn reload_servers(&self) -> Result<(), TransportError> {
        self.controller.reload_servers().await
    }

    /// Current store snapshot.
    pub fn snapshot(&self) -> StoreSnapshot<E::Instant> {
        self.controller.store().get()
    }

    /// Receiver that wakes on every store write.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot<E::Instant>> {
        self.controller.store().subscribe()
    }

    /// Notification feed.
    pub fn notifications(&self) -> broadcast::Receiver<Notification<E::Instant>> {
        self.controller.notifications()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.controller.phase()
    }

    /// Receiver that wakes on every phase change.
    pub fn subscribe_phase(&self) -> watch::Receiver<LifecyclePhase> {
        self.controller.subscribe_phase()
    }

    /// Controller handle, for spawning lifecycle calls.
    pub fn controller(&self) -> &Controller<A, E> {
        &self.controller
    }

    /// Environment the widget runs in.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Configuration the widget was built with.
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }
}
