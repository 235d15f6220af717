//! Logging facilities for Horizon Select.
//!
//! Horizon Select uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_select=debug")
//!         .init();
//! }
//! ```
//!
//! Planning steps and signal emission log at `trace`, commits and structural
//! membership changes at `debug`, rejected configuration at `warn`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_select_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_select_core::signal";
    /// Diff/commit/notify engine target.
    pub const ENGINE: &str = "horizon_select::engine";
    /// Membership registry target.
    pub const MEMBERSHIP: &str = "horizon_select::membership";
    /// Label registry target.
    pub const LABEL: &str = "horizon_select::label";
    /// Performance spans target.
    pub const PERF: &str = "horizon_select::perf";
}

/// A performance tracing span guard.
///
/// The span is entered on creation and exited when the guard is dropped, so a
/// subscriber with span timing enabled reports the duration of the operation.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::trace_span!(target: "horizon_select::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let _span = PerfSpan::new("test_operation");
        tracing::trace!(target: targets::PERF, "inside span");
    }

    #[test]
    fn test_targets_share_crate_prefix() {
        for target in [targets::ENGINE, targets::MEMBERSHIP, targets::LABEL, targets::PERF] {
            assert!(target.starts_with("horizon_select::"));
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }
}
