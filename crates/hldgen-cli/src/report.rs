use hldgen_core::Reporter;

/// Forwards generator reports to the `tracing` subscriber.
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }
}
