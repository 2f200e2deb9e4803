//! Reporting of non-fatal routing errors.

use crate::error::RouterError;

/// Receives errors the router recovers from while serving.
///
/// Only structural mismatches are reported today: a route whose pattern produced a
/// different number of groups than it declares captures. The route is skipped and the
/// scan continues, so nothing reaches the client beyond an eventual 404.
///
/// Any `Fn(&RouterError) + Send + Sync` closure is an `ErrorLog`.
pub trait ErrorLog: Send + Sync {
    /// Records one recovered error.
    fn report(&self, error: &RouterError);
}

impl<F> ErrorLog for F
where
    F: Fn(&RouterError) + Send + Sync,
{
    fn report(&self, error: &RouterError) {
        self(error);
    }
}

/// Default sink: forwards reports to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ErrorLog for TracingLog {
    fn report(&self, error: &RouterError) {
        tracing::warn!(%error, "skipping route");
    }
}
