//! Logging facilities for Horizon Panels.
//!
//! Everything is reported through the `tracing` crate. The library never
//! installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_panels_core::task=debug")
//!         .init();
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_panels_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_panels_core::signal";
    /// UI-thread dispatch target.
    pub const DISPATCH: &str = "horizon_panels_core::dispatch";
    /// Worker pool target.
    pub const POOL: &str = "horizon_panels_core::pool";
    /// Task runner target.
    pub const TASK: &str = "horizon_panels_core::task";
    /// Busy-state target.
    pub const BUSY: &str = "horizon_panels_core::busy";
    /// View binder target.
    pub const BINDER: &str = "horizon_panels_core::binder";
}

/// A guard that records how long an operation ran.
///
/// Enters an `info` span on creation and leaves it when dropped, so the span
/// covers everything logged from the operation body.
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_panels_core::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_without_subscriber() {
        let _span = PerfSpan::new("test_operation");
    }
}
