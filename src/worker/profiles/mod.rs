//! Named workloads a job can run.
//!
//! A job's `name` selects a profile from the [`ProfileRegistry`]. Unknown
//! names, including `"default"`, fall through to the registry's default
//! profile (variable duration in the standard set).

pub mod cpu;
pub mod io;
pub mod mixed;
pub mod network;
pub mod variable;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProfileConfig;
use crate::error::ProfileError;
use crate::worker::pool::CpuPool;

pub use cpu::CpuIntensive;
pub use io::IoIntensive;
pub use mixed::MixedWorkload;
pub use network::NetworkTask;
pub use variable::VariableDuration;

pub const CPU_INTENSIVE: &str = "cpu_intensive";
pub const IO_INTENSIVE: &str = "io_intensive";
pub const MIXED_WORKLOAD: &str = "mixed_workload";
pub const NETWORK_TASK: &str = "network_task";
pub const VARIABLE_DURATION: &str = "variable_duration";

/// A unit of work execution.
#[async_trait]
pub trait WorkProfile: Send + Sync {
    fn name(&self) -> &str;

    /// Execute the workload and describe what was done.
    async fn run(&self) -> Result<String, ProfileError>;
}

/// Maps job names to profiles, with a designated default.
#[derive(Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Arc<dyn WorkProfile>>,
    default: Arc<dyn WorkProfile>,
}

impl ProfileRegistry {
    pub fn new(default: Arc<dyn WorkProfile>) -> Self {
        Self {
            profiles: HashMap::new(),
            default,
        }
    }

    /// Register `profile` under `name`, replacing any previous entry.
    pub fn register(mut self, name: impl Into<String>, profile: Arc<dyn WorkProfile>) -> Self {
        self.profiles.insert(name.into(), profile);
        self
    }

    /// The profile for `name`, or the default when no entry matches exactly.
    pub fn select(&self, name: &str) -> Arc<dyn WorkProfile> {
        self.profiles
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The four named reference workloads plus the variable-duration default.
    pub fn standard(config: &ProfileConfig, pool: CpuPool, http: reqwest::Client) -> Self {
        let cpu = Arc::new(CpuIntensive::new(
            pool,
            config.cpu_hash_range.clone(),
            config.cpu_input_repeat,
        ));
        let io = Arc::new(IoIntensive::new(
            config.io_dir.clone(),
            config.io_line_range.clone(),
        ));
        let mixed = Arc::new(MixedWorkload::new(cpu.clone(), io.clone()));
        let network = Arc::new(NetworkTask::new(
            http,
            config.network_endpoint.clone(),
            config.network_fanout_range.clone(),
            config.network_delay_range.clone(),
            config.network_timeout,
        ));
        let variable = Arc::new(VariableDuration::new(config.duration_bands.clone()));

        Self::new(variable)
            .register(CPU_INTENSIVE, cpu)
            .register(IO_INTENSIVE, io)
            .register(MIXED_WORKLOAD, mixed)
            .register(NETWORK_TASK, network)
    }
}
