use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::task::JoinSet;

use super::{WorkProfile, NETWORK_TASK};
use crate::error::ProfileError;

/// Fans out a random number of concurrent GET requests.
///
/// Individual request failures count against the success ratio but do not
/// fail the profile.
pub struct NetworkTask {
    http: reqwest::Client,
    endpoint: String,
    fanout_range: RangeInclusive<u32>,
    delay_range: RangeInclusive<u32>,
    timeout: Duration,
}

impl NetworkTask {
    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        fanout_range: RangeInclusive<u32>,
        delay_range: RangeInclusive<u32>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint,
            fanout_range,
            delay_range,
            timeout,
        }
    }

    fn request_urls(&self) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let fanout = rng.gen_range(self.fanout_range.clone());
        let base = self.endpoint.trim_end_matches('/');
        (0..fanout)
            .map(|_| format!("{}/{}", base, rng.gen_range(self.delay_range.clone())))
            .collect()
    }
}

#[async_trait]
impl WorkProfile for NetworkTask {
    fn name(&self) -> &str {
        NETWORK_TASK
    }

    async fn run(&self) -> Result<String, ProfileError> {
        let urls = self.request_urls();
        let total = urls.len();

        let mut requests = JoinSet::new();
        for url in urls {
            let request = self.http.get(&url).timeout(self.timeout);
            requests.spawn(async move {
                request
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map(|_| ())
            });
        }

        let mut successful = 0;
        while let Some(outcome) = requests.join_next().await {
            match outcome {
                Ok(Ok(())) => successful += 1,
                Ok(Err(e)) => tracing::debug!(error = %e, "Network sub-request failed"),
                Err(e) => {
                    // The fan-out itself broke; report rather than raise
                    requests.abort_all();
                    return Ok(format!("Network task failed: {}", e));
                }
            }
        }

        Ok(format!(
            "Network task: {}/{} requests successful",
            successful, total
        ))
    }
}
