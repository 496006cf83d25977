//! Application layer for the VoltVPN dashboard
//!
//! Keeps a local view of the VPN connection consistent with the remote
//! service and drives connect/disconnect intents through it. The same code
//! runs under the terminal frontend and under deterministic simulation.
//!
//! # Components
//!
//! - [`Store`]: connection state store (watch channel of [`StoreSnapshot`]s)
//! - [`PollerHandle`]: cancelable periodic status refresh
//! - [`Controller`]: single-flight connect/disconnect/quick-connect
//! - [`Widget`]: one dashboard instance owning the above
//! - [`Dashboard`]: pure view model (events in, actions out)
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod config;
mod controller;
mod dashboard;
mod driver;
mod event;
mod input;
mod notification;
mod poller;
mod runtime;
mod store;
mod system_env;
mod widget;

pub use action::DashboardAction;
pub use config::{
    ConfigError, DEFAULT_NOTIFICATION_TTL, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
    MAX_POLL_INTERVAL, MIN_POLL_INTERVAL, WidgetConfig,
};
pub use controller::Controller;
pub use dashboard::Dashboard;
pub use driver::Driver;
pub use event::DashboardEvent;
pub use input::KeyInput;
pub use notification::Notification;
pub use poller::PollerHandle;
pub use runtime::Runtime;
pub use store::{Freshness, Store, StoreSnapshot};
pub use system_env::SystemEnv;
pub use widget::Widget;
