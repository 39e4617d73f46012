use std::time::Duration;
use tracing::{info, warn};

/// Metadata for one completed call to an external collaborator.
#[derive(Debug, Clone)]
pub struct ApiCallEvent {
    /// e.g. "Google Vision API (REST)".
    pub provider: &'static str,
    pub operation: &'static str,
    pub duration: Duration,
    /// Short human-readable result summary, e.g. counts.
    pub detail: String,
    pub error: Option<String>,
}

/// Injected observer for external calls, so the pipeline's logic stays
/// testable without a network. The default forwards to `tracing`.
pub trait CallObserver: Send + Sync {
    fn api_call(&self, event: &ApiCallEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn api_call(&self, event: &ApiCallEvent) {
        let ms = event.duration.as_millis();
        match &event.error {
            None => info!(
                "📡 {} {}: {} ({ms}ms)",
                event.provider, event.operation, event.detail
            ),
            Some(error) => warn!(
                "📡 {} {} failed: {error} ({ms}ms)",
                event.provider, event.operation
            ),
        }
    }
}

/// Observer that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl CallObserver for NullObserver {
    fn api_call(&self, _event: &ApiCallEvent) {}
}
