use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{WorkProfile, VARIABLE_DURATION};
use crate::config::DurationBand;
use crate::error::ProfileError;

/// Sleeps for a duration drawn from a randomly chosen band.
pub struct VariableDuration {
    bands: Vec<DurationBand>,
}

impl VariableDuration {
    pub fn new(bands: Vec<DurationBand>) -> Self {
        Self { bands }
    }

    fn pick(&self) -> Option<(&DurationBand, f64)> {
        let mut rng = rand::thread_rng();
        let band = self.bands.choose(&mut rng)?;
        let secs = if band.min_secs < band.max_secs {
            rng.gen_range(band.min_secs..band.max_secs)
        } else {
            band.min_secs
        };
        Some((band, secs))
    }
}

#[async_trait]
impl WorkProfile for VariableDuration {
    fn name(&self) -> &str {
        VARIABLE_DURATION
    }

    async fn run(&self) -> Result<String, ProfileError> {
        let (band, secs) = self
            .pick()
            .ok_or_else(|| ProfileError::Failed("no duration bands configured".to_string()))?;
        let duration = Duration::try_from_secs_f64(secs)
            .map_err(|e| ProfileError::Failed(format!("invalid duration {}: {}", secs, e)))?;

        tokio::time::sleep(duration).await;

        Ok(format!("{} task completed in {:.2}s", band.name, secs))
    }
}
