//! In-process simulated VPN service.
//!
//! `SimVpnApi` implements [`VpnApi`] against an in-memory model of the
//! service: it accepts and rejects connect/disconnect the way the real
//! service does, and lets tests inject outages, rejections, latency and
//! gates that hold a lifecycle call in flight.
//!
//! Clones share state, so a test keeps one clone for scripting and
//! inspection while the widget owns another.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::sync::watch;
use voltvpn_client::{ApiError, ConnectAck, DisconnectAck, VpnApi};
use voltvpn_core::{ConnectionState, Percent, ServerDescriptor, TransportError};

/// Public IP the simulated host has without a tunnel.
pub const ORIGINAL_IP: &str = "203.0.113.7";

/// Number of calls the service has received, per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `GET /api/status`.
    pub status: usize,
    /// `GET /api/servers`.
    pub servers: usize,
    /// `POST /api/connect/:id`.
    pub connect: usize,
    /// `POST /api/disconnect`.
    pub disconnect: usize,
}

#[derive(Debug)]
struct SimState {
    servers: Vec<ServerDescriptor>,
    connection: ConnectionState,
    reachable: bool,
    failing_status: usize,
    failing_servers: usize,
    connect_rejection: Option<String>,
    disconnect_rejection: Option<String>,
    latency: Duration,
    calls: CallCounts,
}

/// Simulated VPN service.
#[derive(Debug, Clone)]
pub struct SimVpnApi {
    state: Arc<Mutex<SimState>>,
    /// Open while `true`; lifecycle calls wait for it.
    gate: Arc<watch::Sender<bool>>,
    /// Lifecycle calls currently parked at the gate.
    parked: Arc<watch::Sender<usize>>,
}

impl Default for SimVpnApi {
    fn default() -> Self {
        Self::new()
    }
}

impl SimVpnApi {
    /// Service with the six stock servers, disconnected.
    pub fn new() -> Self {
        Self::with_servers(default_servers())
    }

    /// Service with the given server list, disconnected.
    pub fn with_servers(servers: Vec<ServerDescriptor>) -> Self {
        let state = SimState {
            servers,
            connection: ConnectionState::disconnected(ORIGINAL_IP),
            reachable: true,
            failing_status: 0,
            failing_servers: 0,
            connect_rejection: None,
            disconnect_rejection: None,
            latency: Duration::ZERO,
            calls: CallCounts::default(),
        };
        let (gate, _) = watch::channel(true);
        let (parked, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(state)),
            gate: Arc::new(gate),
            parked: Arc::new(parked),
        }
    }

    /// Service with servers `a`, `b`, ... at the given loads.
    pub fn with_loads(loads: &[f64]) -> Self {
        let servers = loads
            .iter()
            .zip('a'..='z')
            .map(|(load, id)| {
                let id = id.to_string();
                ServerDescriptor::new(id.clone(), id).with_load(*load)
            })
            .collect();
        Self::with_servers(servers)
    }

    /// Delay every call by `latency` (tokio time).
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state().latency = latency;
        self
    }

    /// Make every call fail in transport, or restore service.
    pub fn set_reachable(&self, reachable: bool) {
        self.state().reachable = reachable;
    }

    /// Fail the next `count` status fetches.
    pub fn fail_status(&self, count: usize) {
        self.state().failing_status = count;
    }

    /// Fail the next `count` server-list fetches.
    pub fn fail_servers(&self, count: usize) {
        self.state().failing_servers = count;
    }

    /// Reject the next connect with `message`.
    pub fn reject_next_connect(&self, message: impl Into<String>) {
        self.state().connect_rejection = Some(message.into());
    }

    /// Reject the next disconnect with `message`.
    pub fn reject_next_disconnect(&self, message: impl Into<String>) {
        self.state().disconnect_rejection = Some(message.into());
    }

    /// Replace the server list the service reports.
    pub fn set_servers(&self, servers: Vec<ServerDescriptor>) {
        self.state().servers = servers;
    }

    /// Force the service-side connection state.
    pub fn set_connection(&self, connection: ConnectionState) {
        self.state().connection = connection;
    }

    /// Hold connect/disconnect calls in flight until [`SimVpnApi::release`].
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held calls proceed.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Wait until `count` lifecycle calls are parked at a held gate.
    pub async fn wait_parked(&self, count: usize) {
        let mut parked = self.parked.subscribe();
        let _ = parked.wait_for(|n| *n >= count).await;
    }

    /// Calls received so far.
    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    /// Service-side connection state.
    pub fn connection(&self) -> ConnectionState {
        self.state().connection.clone()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        let latency = self.state().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    async fn pass_gate(&self) {
        let mut gate = self.gate.subscribe();
        if *gate.borrow_and_update() {
            return;
        }
        self.parked.send_modify(|n| *n += 1);
        let _ = gate.wait_for(|open| *open).await;
        self.parked.send_modify(|n| *n -= 1);
    }
}

impl VpnApi for SimVpnApi {
    async fn fetch_status(&self) -> Result<ConnectionState, TransportError> {
        self.state().calls.status += 1;
        self.delay().await;

        let mut state = self.state();
        if !state.reachable {
            return Err(TransportError::unreachable("simulated outage"));
        }
        if state.failing_status > 0 {
            state.failing_status -= 1;
            return Err(TransportError::status(503, "simulated status failure"));
        }
        Ok(state.connection.clone())
    }

    async fn fetch_servers(&self) -> Result<Vec<ServerDescriptor>, TransportError> {
        self.state().calls.servers += 1;
        self.delay().await;

        let mut state = self.state();
        if !state.reachable {
            return Err(TransportError::unreachable("simulated outage"));
        }
        if state.failing_servers > 0 {
            state.failing_servers -= 1;
            return Err(TransportError::status(503, "simulated server-list failure"));
        }
        Ok(state.servers.clone())
    }

    async fn connect(&self, server_id: &str) -> Result<ConnectAck, ApiError> {
        self.state().calls.connect += 1;
        self.pass_gate().await;
        self.delay().await;

        let mut state = self.state();
        if !state.reachable {
            return Err(TransportError::unreachable("simulated outage").into());
        }
        if let Some(message) = state.connect_rejection.take() {
            return Err(ApiError::Rejected { message });
        }
        if state.connection.connected {
            return Err(ApiError::Rejected {
                message: "Already connected. Disconnect first.".into(),
            });
        }
        let Some(index) = state.servers.iter().position(|s| s.id == server_id) else {
            return Err(ApiError::Rejected { message: format!("Server {server_id} not available") });
        };

        let server = state.servers[index].clone();
        state.connection = ConnectionState {
            connected: true,
            current_server_id: Some(server.id.clone()),
            current_ip: Some(format!("10.8.0.{}", index + 2)),
            original_ip: Some(ORIGINAL_IP.into()),
            ip_changed: true,
        };
        Ok(ConnectAck { message: format!("Connected to {}", server.name), server: Some(server) })
    }

    async fn disconnect(&self) -> Result<DisconnectAck, ApiError> {
        self.state().calls.disconnect += 1;
        self.pass_gate().await;
        self.delay().await;

        let mut state = self.state();
        if !state.reachable {
            return Err(TransportError::unreachable("simulated outage").into());
        }
        if let Some(message) = state.disconnect_rejection.take() {
            return Err(ApiError::Rejected { message });
        }
        if !state.connection.connected {
            return Err(ApiError::Rejected { message: "Not connected".into() });
        }

        state.connection = ConnectionState::disconnected(ORIGINAL_IP);
        Ok(DisconnectAck { message: format!("Disconnected successfully. IP: {ORIGINAL_IP}") })
    }
}

/// The six stock servers.
pub fn default_servers() -> Vec<ServerDescriptor> {
    let stock = [
        ("us-east", "USA East Coast", "New York, USA", "🇺🇸", "12ms", 23.0, 1247, 99.9),
        ("us-west", "USA West Coast", "Los Angeles, USA", "🇺🇸", "8ms", 31.0, 892, 99.8),
        ("uk", "United Kingdom", "London, UK", "🇬🇧", "15ms", 18.0, 1456, 99.9),
        ("de", "Germany", "Frankfurt, Germany", "🇩🇪", "10ms", 27.0, 1123, 99.7),
        ("nl", "Netherlands", "Amsterdam, Netherlands", "🇳🇱", "12ms", 15.0, 967, 99.9),
        ("jp", "Japan", "Tokyo, Japan", "🇯🇵", "25ms", 22.0, 743, 99.6),
    ];

    stock
        .into_iter()
        .map(|(id, name, location, flag, ping, load, users, uptime)| ServerDescriptor {
            flag: Some(flag.into()),
            ping: Some(ping.into()),
            speed: Some("1 Gbps".into()),
            users: Some(users),
            uptime: Percent::new(uptime),
            ..ServerDescriptor::new(id, name).with_location(location).with_load(load)
        })
        .collect()
}
