use serde::Serialize;

use crate::config::RegistrationConfig;
use crate::error::{Result, WorkerError};

/// Outcome of the startup registration phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationState {
    pub attempts: u32,
    pub succeeded: bool,
}

#[derive(Serialize)]
struct RegisterWorkerRequest<'a> {
    worker_url: &'a str,
}

/// Announces this worker to the coordinator.
pub struct RegistrationClient {
    http: reqwest::Client,
    endpoint: String,
    worker_url: String,
    config: RegistrationConfig,
}

impl RegistrationClient {
    pub fn new(
        http: reqwest::Client,
        coordinator_url: &str,
        worker_url: impl Into<String>,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            http,
            endpoint: format!("{}/register_worker", coordinator_url.trim_end_matches('/')),
            worker_url: worker_url.into(),
            config,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Single registration request. Only a 2xx response counts as success.
    async fn attempt(&self) -> Result<reqwest::StatusCode> {
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.config.request_timeout)
            .json(&RegisterWorkerRequest {
                worker_url: &self.worker_url,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(WorkerError::Registration(format!(
                "coordinator returned {}",
                status
            )))
        }
    }

    /// Register with the coordinator, retrying at a fixed interval.
    ///
    /// Gives up after `max_attempts` failures. Failure is not fatal: the
    /// caller is expected to keep serving in degraded mode.
    pub async fn register(&self) -> RegistrationState {
        let mut state = RegistrationState::default();
        let max_attempts = self.config.max_attempts;

        while state.attempts < max_attempts {
            state.attempts += 1;
            tracing::info!(
                attempt = state.attempts,
                max_attempts,
                endpoint = %self.endpoint,
                "Attempting to register with coordinator"
            );

            match self.attempt().await {
                Ok(status) => {
                    tracing::info!(
                        attempt = state.attempts,
                        status = %status,
                        worker_url = %self.worker_url,
                        "Registered with coordinator"
                    );
                    state.succeeded = true;
                    return state;
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = state.attempts,
                        error = %e,
                        "Registration attempt failed"
                    );
                    if state.attempts < max_attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        tracing::warn!(
            attempts = state.attempts,
            "Max registration attempts reached, starting without registration"
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = RegistrationClient::new(
            reqwest::Client::new(),
            "http://coordinator:8080/",
            "http://worker:8000",
            RegistrationConfig::default(),
        );
        assert_eq!(client.endpoint(), "http://coordinator:8080/register_worker");
    }

    #[tokio::test]
    async fn zero_attempts_never_registers() {
        let client = RegistrationClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            "http://worker:8000",
            RegistrationConfig {
                max_attempts: 0,
                ..Default::default()
            },
        );
        let state = client.register().await;
        assert_eq!(state, RegistrationState::default());
    }
}
