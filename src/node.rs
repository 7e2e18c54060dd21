use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::error::Result;
use crate::http::{self, AppState};
use crate::registration::{RegistrationClient, RegistrationState};
use crate::store::SharedStore;
use crate::worker::{CpuPool, JobDispatcher, LivenessHeartbeat, ProfileRegistry, ResultReporter};

/// Worker process: wires the shared clients into every component and owns
/// their lifecycle.
pub struct WorkerNode {
    config: WorkerConfig,
    store: Arc<dyn SharedStore>,
    http: reqwest::Client,
    profiles: Option<ProfileRegistry>,
}

impl WorkerNode {
    pub fn new(config: WorkerConfig, store: Arc<dyn SharedStore>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            config,
            store,
            http,
            profiles: None,
        })
    }

    /// Replace the standard profile set.
    pub fn with_profiles(mut self, profiles: ProfileRegistry) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Bind the configured listen address and run.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        self.run_with_listener(listener, shutdown).await
    }

    /// Run the worker on an already bound listener.
    ///
    /// Startup order is fixed:
    /// 1. Register with the coordinator (bounded retries, never fatal)
    /// 2. Start the liveness heartbeat
    /// 3. Serve `/run_job` until `shutdown` is cancelled
    ///
    /// On shutdown the server drains and the heartbeat stops without a final write.
    pub async fn run_with_listener(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<()> {
        tracing::info!(
            worker_url = %self.config.worker_url,
            coordinator_url = %self.config.coordinator_url,
            "Worker starting up"
        );

        let registration = self.register(&shutdown).await;
        if shutdown.is_cancelled() {
            tracing::info!("Shutdown requested during registration");
            return Ok(());
        }

        let heartbeat = LivenessHeartbeat::new(
            self.store.clone(),
            &self.config.worker_url,
            &self.config.heartbeat,
        );
        let heartbeat_token = shutdown.child_token();
        let heartbeat_stop = heartbeat_token.clone();
        let heartbeat_handle = tokio::spawn(async move {
            heartbeat.run(heartbeat_token).await;
        });

        let profiles = match self.profiles {
            Some(profiles) => profiles,
            None => ProfileRegistry::standard(
                &self.config.profiles,
                CpuPool::new(self.config.profiles.cpu_pool_size),
                self.http.clone(),
            ),
        };
        let dispatcher = JobDispatcher::new(
            self.config.worker_url.clone(),
            profiles,
            ResultReporter::new(self.store.clone()),
        );
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            store: self.store.clone(),
            registration,
        };

        let served = http::serve(listener, state, shutdown).await;

        // Stop the heartbeat even when the server exited on its own
        heartbeat_stop.cancel();
        if let Err(e) = heartbeat_handle.await {
            tracing::warn!(error = %e, "Heartbeat task ended abnormally");
        }

        tracing::info!("Worker stopped");
        served.map_err(Into::into)
    }

    async fn register(&self, shutdown: &CancellationToken) -> RegistrationState {
        let client = RegistrationClient::new(
            self.http.clone(),
            &self.config.coordinator_url,
            self.config.worker_url.clone(),
            self.config.registration.clone(),
        );

        tokio::select! {
            state = client.register() => state,
            _ = shutdown.cancelled() => RegistrationState::default(),
        }
    }
}
