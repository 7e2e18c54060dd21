use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::ProfileError;

/// Bounded pool for CPU-bound work.
///
/// Tasks run on tokio's blocking threads, never on the async workers that
/// serve requests and drive the heartbeat. At most `size` tasks run at once;
/// the rest wait for a permit.
#[derive(Debug, Clone)]
pub struct CpuPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl CpuPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of idle slots.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `task` on the pool and wait for its output.
    pub async fn run<F, T>(&self, task: F) -> Result<T, ProfileError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ProfileError::Pool(e.to_string()))?;

        // The permit moves into the closure so the slot stays taken until the
        // thread finishes, even if the caller stops waiting.
        let output = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            task()
        })
        .await?;

        Ok(output)
    }
}
