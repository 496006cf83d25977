//! Dashboard intents.
//!
//! Instructions produced by the [`crate::Dashboard`] for the runtime to
//! execute.

/// Actions produced by the Dashboard state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to a server.
    Connect {
        /// Server to connect to.
        server_id: String,
    },

    /// Connect to the least loaded server.
    QuickConnect,

    /// Disconnect the current tunnel.
    Disconnect,

    /// Fetch the status now.
    Refresh,

    /// Fetch the server list now.
    ReloadServers,
}
