//! Logging facilities for Horizon Casement.
//!
//! Horizon Casement uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in your
//! application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_casement::events=trace")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Native window lifecycle and state changes.
    pub const WINDOW: &str = "horizon_casement::window";
    /// Native event translation and queueing.
    pub const EVENTS: &str = "horizon_casement::events";
    /// Cursor synthesis.
    pub const CURSOR: &str = "horizon_casement::cursor";
    /// Window-manager protocol messages.
    pub const PROTOCOL: &str = "horizon_casement::protocol";
    /// Window registry.
    pub const REGISTRY: &str = "horizon_casement::registry";
    /// Display server connection.
    pub const DISPLAY: &str = "horizon_casement::display";
}
