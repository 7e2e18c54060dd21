use std::sync::Arc;

use crate::error::Result;
use crate::store::{SharedStore, JOB_RESULTS_KEY};
use crate::worker::job::JobResult;

/// Pushes terminal job results onto the shared result list.
///
/// Reporting is best-effort: failures are logged and swallowed so a store
/// outage never takes a dispatch (or the process) down with it.
#[derive(Clone)]
pub struct ResultReporter {
    store: Arc<dyn SharedStore>,
}

impl ResultReporter {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    pub async fn report(&self, result: JobResult) {
        match self.push(&result).await {
            Ok(()) => {
                tracing::debug!(
                    job_id = %result.job_id,
                    status = %result.status,
                    "Job result reported"
                );
            }
            Err(e) => {
                tracing::error!(
                    job_id = %result.job_id,
                    status = %result.status,
                    error = %e,
                    "Failed to report job result, result dropped"
                );
            }
        }
    }

    async fn push(&self, result: &JobResult) -> Result<()> {
        let payload = serde_json::to_string(result)?;
        self.store.push(JOB_RESULTS_KEY, &payload).await
    }
}
