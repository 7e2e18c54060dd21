use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, WorkerError};

/// Retry policy for joining the coordinator at startup.
///
/// The retry interval is constant; attempts do not back off.
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Maximum number of registration attempts before starting unregistered
    pub max_attempts: u32,
    /// Delay between failed attempts
    pub retry_delay: Duration,
    /// Timeout applied to each registration request
    pub request_timeout: Duration,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Liveness marker cadence.
///
/// `ttl` must exceed `interval` so a single missed tick does not expire the marker.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    pub interval: Duration,
    pub ttl: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            ttl: Duration::from_secs(30),
        }
    }
}

/// A named range the variable-duration profile sleeps within.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationBand {
    pub name: String,
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DurationBand {
    pub fn new(name: impl Into<String>, min_secs: f64, max_secs: f64) -> Self {
        Self {
            name: name.into(),
            min_secs,
            max_secs,
        }
    }
}

/// Knobs for the simulated workloads.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    /// Size of the dedicated pool for CPU-bound work
    pub cpu_pool_size: usize,
    /// Number of hashes computed per CPU job
    pub cpu_hash_range: RangeInclusive<u64>,
    /// How many times the synthetic hash input is repeated
    pub cpu_input_repeat: usize,
    /// Number of lines written per I/O job
    pub io_line_range: RangeInclusive<u64>,
    /// Directory holding the I/O profile's scratch files
    pub io_dir: PathBuf,
    /// Base URL hit by the network profile; a delay segment is appended
    pub network_endpoint: String,
    /// Number of concurrent sub-requests per network job
    pub network_fanout_range: RangeInclusive<u32>,
    /// Delay segment appended to each sub-request URL
    pub network_delay_range: RangeInclusive<u32>,
    /// Per sub-request timeout
    pub network_timeout: Duration,
    /// Bands the variable-duration profile chooses from
    pub duration_bands: Vec<DurationBand>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            cpu_pool_size: 2,
            cpu_hash_range: 5000..=15000,
            cpu_input_repeat: 10000,
            io_line_range: 1000..=9999,
            io_dir: std::env::temp_dir(),
            network_endpoint: "https://httpbin.org/delay".to_string(),
            network_fanout_range: 1..=5,
            network_delay_range: 1..=5,
            network_timeout: Duration::from_secs(30),
            duration_bands: vec![
                DurationBand::new("fast", 0.1, 1.0),
                DurationBand::new("medium", 1.0, 10.0),
                DurationBand::new("slow", 10.0, 50.0),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Address this worker advertises to the coordinator; also its identity
    pub worker_url: String,
    pub listen_addr: SocketAddr,
    pub coordinator_url: String,
    pub registration: RegistrationConfig,
    pub heartbeat: HeartbeatConfig,
    pub profiles: ProfileConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_url: "http://127.0.0.1:8000".to_string(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            coordinator_url: "http://127.0.0.1:8080".to_string(),
            registration: RegistrationConfig::default(),
            heartbeat: HeartbeatConfig::default(),
            profiles: ProfileConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn new(worker_url: impl Into<String>, coordinator_url: impl Into<String>) -> Self {
        Self {
            worker_url: worker_url.into(),
            coordinator_url: coordinator_url.into(),
            ..Default::default()
        }
    }

    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    pub fn with_registration(mut self, registration: RegistrationConfig) -> Self {
        self.registration = registration;
        self
    }

    pub fn with_heartbeat(mut self, heartbeat: HeartbeatConfig) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    pub fn with_profiles(mut self, profiles: ProfileConfig) -> Self {
        self.profiles = profiles;
        self
    }

    /// Reject configurations the worker cannot run correctly with.
    pub fn validate(&self) -> Result<()> {
        if self.worker_url.trim().is_empty() {
            return Err(WorkerError::InvalidConfig("worker URL is empty".into()));
        }
        if self.heartbeat.interval.is_zero() {
            return Err(WorkerError::InvalidConfig(
                "heartbeat interval must be non-zero".into(),
            ));
        }
        if self.heartbeat.ttl <= self.heartbeat.interval {
            return Err(WorkerError::InvalidConfig(format!(
                "heartbeat TTL ({:?}) must exceed the heartbeat interval ({:?})",
                self.heartbeat.ttl, self.heartbeat.interval
            )));
        }
        if self.heartbeat.ttl.as_secs() == 0 {
            return Err(WorkerError::InvalidConfig(
                "heartbeat TTL must be at least one second".into(),
            ));
        }

        let p = &self.profiles;
        if p.cpu_pool_size == 0 {
            return Err(WorkerError::InvalidConfig(
                "CPU pool size must be at least 1".into(),
            ));
        }
        if p.cpu_hash_range.is_empty()
            || p.io_line_range.is_empty()
            || p.network_fanout_range.is_empty()
            || p.network_delay_range.is_empty()
        {
            return Err(WorkerError::InvalidConfig(
                "profile ranges must not be inverted".into(),
            ));
        }
        if p.duration_bands.is_empty() {
            return Err(WorkerError::InvalidConfig(
                "at least one duration band is required".into(),
            ));
        }
        if let Some(band) = p
            .duration_bands
            .iter()
            .find(|b| b.min_secs < 0.0 || b.min_secs > b.max_secs)
        {
            return Err(WorkerError::InvalidConfig(format!(
                "duration band '{}' has an invalid range",
                band.name
            )));
        }

        Ok(())
    }
}
