//! Dashboard data model.
//!
//! [`ServerDescriptor`] describes one VPN endpoint offered by the remote
//! service; [`ConnectionState`] is the last status the service reported.
//! Both are replaced wholesale on every successful fetch and never patched
//! field by field.

use std::fmt;

/// A percentage value parsed from the service (`"23%"`, `"23"`, `23.5`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(f64);

impl Percent {
    /// Wrap a raw percentage. Non-finite values are rejected.
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    /// Parse the textual forms used by the service.
    ///
    /// Accepts an optional trailing `%` and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        number.parse::<f64>().ok().and_then(Self::new)
    }

    /// Raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 { write!(f, "{:.0}%", self.0) } else { write!(f, "{}%", self.0) }
    }
}

/// One VPN server as advertised by `/api/servers`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerDescriptor {
    /// Stable key used in `/api/connect/:id`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// City / country text.
    pub location: String,
    /// Flag glyph, if the service supplies one.
    pub flag: Option<String>,
    /// Advertised latency, e.g. `"12ms"`.
    pub ping: Option<String>,
    /// Current load. `None` if missing or unparseable.
    pub load: Option<Percent>,
    /// Advertised bandwidth, e.g. `"1 Gbps"`.
    pub speed: Option<String>,
    /// Connected user count.
    pub users: Option<u64>,
    /// Availability over the service's reporting window.
    pub uptime: Option<Percent>,
}

impl ServerDescriptor {
    /// Minimal descriptor with only id and name set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: String::new(),
            flag: None,
            ping: None,
            load: None,
            speed: None,
            users: None,
            uptime: None,
        }
    }

    /// Builder-style load setter.
    #[must_use]
    pub fn with_load(mut self, load: f64) -> Self {
        self.load = Percent::new(load);
        self
    }

    /// Builder-style location setter.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Load used for ranking; unknown load ranks after every known load.
    fn rank(&self) -> f64 {
        self.load.map_or(f64::INFINITY, Percent::value)
    }
}

/// Pick the server with the lowest load.
///
/// Ties go to the earliest entry in list order. Servers whose load is unknown
/// are only chosen when no server has a known load. `None` for an empty list.
pub fn select_least_loaded(servers: &[ServerDescriptor]) -> Option<&ServerDescriptor> {
    // `min_by` keeps the first of equal elements.
    servers.iter().min_by(|a, b| a.rank().total_cmp(&b.rank()))
}

/// Last connection status reported by `/api/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// Whether the tunnel is up.
    pub connected: bool,
    /// Server the tunnel terminates at. `None` when disconnected.
    pub current_server_id: Option<String>,
    /// Public IP as seen by the service right now.
    pub current_ip: Option<String>,
    /// Public IP before the tunnel was established.
    pub original_ip: Option<String>,
    /// Whether the public IP differs from the original.
    pub ip_changed: bool,
}

impl ConnectionState {
    /// Disconnected state exposing the given public IP.
    pub fn disconnected(ip: impl Into<String>) -> Self {
        let ip = ip.into();
        Self {
            connected: false,
            current_server_id: None,
            current_ip: Some(ip.clone()),
            original_ip: Some(ip),
            ip_changed: false,
        }
    }

    /// Advisory check: `connected` implies a server id present in `servers`.
    ///
    /// The remote service is authoritative, so a violation is logged by the
    /// store and never corrected locally.
    pub fn is_consistent_with(&self, servers: &[ServerDescriptor]) -> bool {
        if !self.connected {
            return true;
        }
        self.current_server_id
            .as_deref()
            .is_some_and(|id| servers.iter().any(|server| server.id == id))
    }

    /// Descriptor of the current server, if known.
    pub fn current_server<'a>(
        &self,
        servers: &'a [ServerDescriptor],
    ) -> Option<&'a ServerDescriptor> {
        let id = self.current_server_id.as_deref()?;
        servers.iter().find(|server| server.id == id)
    }
}
