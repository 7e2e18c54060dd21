use std::ops::RangeInclusive;

use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};

use super::{WorkProfile, CPU_INTENSIVE};
use crate::error::ProfileError;
use crate::worker::pool::CpuPool;

const INPUT_SEED: &str = "simulate_cpu_work";

/// Hashes synthetic input a random number of times on the CPU pool.
pub struct CpuIntensive {
    pool: CpuPool,
    hash_range: RangeInclusive<u64>,
    input_repeat: usize,
}

impl CpuIntensive {
    pub fn new(pool: CpuPool, hash_range: RangeInclusive<u64>, input_repeat: usize) -> Self {
        Self {
            pool,
            hash_range,
            input_repeat,
        }
    }
}

/// Compute `count` independent SHA-256 digests, returning how many were done.
pub fn compute_hashes(count: u64, input_repeat: usize) -> u64 {
    let data = INPUT_SEED.repeat(input_repeat);
    for i in 0..count {
        let digest = Sha256::digest(format!("{}_{}", data, i).as_bytes());
        std::hint::black_box(digest);
    }
    count
}

#[async_trait]
impl WorkProfile for CpuIntensive {
    fn name(&self) -> &str {
        CPU_INTENSIVE
    }

    async fn run(&self) -> Result<String, ProfileError> {
        let count = rand::thread_rng().gen_range(self.hash_range.clone());
        let input_repeat = self.input_repeat;

        let computed = self
            .pool
            .run(move || compute_hashes(count, input_repeat))
            .await?;

        Ok(format!("Computed {} hashes", computed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_hashes_counts_every_digest() {
        assert_eq!(compute_hashes(0, 1), 0);
        assert_eq!(compute_hashes(25, 2), 25);
    }

    #[tokio::test]
    async fn reports_hash_count_within_range() {
        let profile = CpuIntensive::new(CpuPool::new(1), 10..=20, 4);
        let description = profile.run().await.unwrap();

        let count: u64 = description
            .strip_prefix("Computed ")
            .and_then(|rest| rest.strip_suffix(" hashes"))
            .and_then(|n| n.parse().ok())
            .expect("description should carry the hash count");
        assert!((10..=20).contains(&count));
    }

    #[tokio::test]
    async fn fixed_range_is_exact() {
        let profile = CpuIntensive::new(CpuPool::new(1), 7..=7, 1);
        assert_eq!(profile.run().await.unwrap(), "Computed 7 hashes");
    }
}
