use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::HeartbeatConfig;
use crate::error::Result;
use crate::store::{liveness_key, SharedStore, ALIVE};

/// Keeps this worker's liveness marker fresh in the shared store.
///
/// Each tick writes `worker:<url> = alive` with a TTL. The coordinator treats
/// an expired marker as a dead worker, so the loop never writes a final
/// marker on shutdown; expiry does the rest.
pub struct LivenessHeartbeat {
    store: Arc<dyn SharedStore>,
    key: String,
    interval: Duration,
    ttl: Duration,
}

impl LivenessHeartbeat {
    pub fn new(store: Arc<dyn SharedStore>, worker_url: &str, config: &HeartbeatConfig) -> Self {
        Self {
            store,
            key: liveness_key(worker_url),
            interval: config.interval,
            ttl: config.ttl,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write the liveness marker once.
    pub async fn beat(&self) -> Result<()> {
        self.store
            .set_with_expiry(&self.key, ALIVE, self.ttl)
            .await
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// The first marker is written immediately. A failed write is logged and
    /// retried on the next tick; the TTL covers the gap.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            key = %self.key,
            interval_ms = self.interval.as_millis() as u64,
            ttl_secs = self.ttl.as_secs(),
            "Starting heartbeat"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!(key = %self.key, "Heartbeat stopped");
                    break;
                }
                _ = interval.tick() => {}
            }

            match self.beat().await {
                Ok(()) => tracing::debug!(key = %self.key, "Heartbeat sent"),
                Err(e) => tracing::warn!(key = %self.key, error = %e, "Heartbeat write failed"),
            }
        }
    }
}
