//! Terminal UI for VoltVPN
//!
//! A thin shell over [`voltvpn_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`voltvpn_app::Runtime`].
//!
//! This crate only handles terminal rendering, logging setup and choosing
//! the service backend.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod logging;
pub mod runtime;
pub mod terminal;
pub mod ui;

pub use runtime::{Backend, LaunchError, run};
pub use terminal::{TerminalDriver, TerminalError};
pub use voltvpn_app::{Dashboard, DashboardAction, DashboardEvent, Driver, KeyInput, Runtime};
