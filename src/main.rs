use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use fleet_worker::config::{HeartbeatConfig, ProfileConfig, RegistrationConfig, WorkerConfig};
use fleet_worker::node::WorkerNode;
use fleet_worker::shutdown::install_shutdown_handler;
use fleet_worker::store::{MemoryStore, RedisStore, SharedStore};

#[derive(Parser, Debug)]
#[command(name = "fleet-worker")]
#[command(version)]
#[command(about = "Worker node for a distributed job-processing fleet")]
struct Args {
    /// Address this worker advertises to the coordinator
    #[arg(long, env = "WORKER_URL")]
    worker_url: String,

    /// Base URL of the coordinator
    #[arg(long, env = "COORDINATOR_URL")]
    coordinator_url: String,

    /// Shared store connection address
    #[arg(long, env = "REDIS_ADDR", default_value = "redis://127.0.0.1:6379")]
    redis_addr: String,

    /// Shared store backend
    #[arg(long, env = "WORKER_STORE", default_value = "redis")]
    store: StoreKind,

    /// Address the HTTP API listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    listen_addr: SocketAddr,

    /// Registration attempts before starting unregistered
    #[arg(long, default_value = "10")]
    max_registration_attempts: u32,

    /// Delay between registration attempts, in milliseconds
    #[arg(long, default_value = "3000")]
    registration_retry_ms: u64,

    /// Interval between liveness marker writes, in milliseconds
    #[arg(long, default_value = "10000")]
    heartbeat_interval_ms: u64,

    /// Liveness marker time to live, in seconds
    #[arg(long, default_value = "30")]
    heartbeat_ttl_secs: u64,

    /// Threads reserved for CPU-bound profiles
    #[arg(long, default_value = "2")]
    cpu_pool_size: usize,

    /// Endpoint hit by the network_task profile
    #[arg(long, env = "NETWORK_TASK_ENDPOINT", default_value = "https://httpbin.org/delay")]
    network_endpoint: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreKind {
    Redis,
    /// In-process store; liveness and results are not visible to a coordinator
    Memory,
}

impl Args {
    fn into_config(self) -> WorkerConfig {
        let registration = RegistrationConfig {
            max_attempts: self.max_registration_attempts,
            retry_delay: Duration::from_millis(self.registration_retry_ms),
            ..RegistrationConfig::default()
        };
        let heartbeat = HeartbeatConfig {
            interval: Duration::from_millis(self.heartbeat_interval_ms),
            ttl: Duration::from_secs(self.heartbeat_ttl_secs),
        };
        let profiles = ProfileConfig {
            cpu_pool_size: self.cpu_pool_size,
            network_endpoint: self.network_endpoint,
            ..ProfileConfig::default()
        };

        WorkerConfig::new(self.worker_url, self.coordinator_url)
            .with_listen_addr(self.listen_addr)
            .with_registration(registration)
            .with_heartbeat(heartbeat)
            .with_profiles(profiles)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store_kind = args.store;
    let redis_addr = args.redis_addr.clone();
    let config = args.into_config();
    config.validate()?;

    let store: Arc<dyn SharedStore> = match store_kind {
        StoreKind::Redis => Arc::new(RedisStore::connect(&redis_addr).await?),
        StoreKind::Memory => {
            tracing::warn!(
                "Using in-memory store; the coordinator will not see heartbeats or results"
            );
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!(
        worker_url = %config.worker_url,
        coordinator_url = %config.coordinator_url,
        listen_addr = %config.listen_addr,
        store = ?store_kind,
        "Starting fleet worker"
    );

    let shutdown = install_shutdown_handler();
    let node = WorkerNode::new(config, store)?;
    node.run(shutdown).await?;

    Ok(())
}
