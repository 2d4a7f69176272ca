//! Default event sink: structured log lines for every refresh outcome.

use rates_types::{EventSink, RateEvent};
use tracing::{debug, error, info, warn};

/// Logs refresh outcomes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: RateEvent) {
        match event {
            RateEvent::RefreshCompleted { source, rates } => {
                info!(%source, rates, "Exchange rate cache refreshed");
            }
            RateEvent::SourceFailed { source, reason } => {
                warn!(%source, %reason, "Rate source unavailable, trying next source");
            }
            RateEvent::PersistFailed { reason } => {
                error!(%reason, "Failed to persist exchange rates");
            }
            RateEvent::RefreshSkipped => {
                debug!("Refresh already in progress, skipping");
            }
        }
    }
}
