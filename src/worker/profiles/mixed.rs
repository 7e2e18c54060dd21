use std::sync::Arc;

use async_trait::async_trait;

use super::{CpuIntensive, IoIntensive, WorkProfile, MIXED_WORKLOAD};
use crate::error::ProfileError;

/// CPU work followed by I/O work.
pub struct MixedWorkload {
    cpu: Arc<CpuIntensive>,
    io: Arc<IoIntensive>,
}

impl MixedWorkload {
    pub fn new(cpu: Arc<CpuIntensive>, io: Arc<IoIntensive>) -> Self {
        Self { cpu, io }
    }
}

#[async_trait]
impl WorkProfile for MixedWorkload {
    fn name(&self) -> &str {
        MIXED_WORKLOAD
    }

    async fn run(&self) -> Result<String, ProfileError> {
        let cpu = self.cpu.run().await?;
        let io = self.io.run().await?;
        Ok(format!("Mixed work: CPU work: {} | IO work: {}", cpu, io))
    }
}
