use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::Rng;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use uuid::Uuid;

use super::{WorkProfile, IO_INTENSIVE};
use crate::error::ProfileError;

/// Writes a scratch file line by line, reads it back, then removes it.
pub struct IoIntensive {
    dir: PathBuf,
    line_range: RangeInclusive<u64>,
}

impl IoIntensive {
    pub fn new(dir: PathBuf, line_range: RangeInclusive<u64>) -> Self {
        Self { dir, line_range }
    }

    /// Per-invocation file name so concurrent jobs never share a file.
    fn scratch_path(&self) -> PathBuf {
        self.dir.join(format!("worker_job_{}.txt", Uuid::new_v4()))
    }
}

async fn write_lines(path: &Path, lines: u64) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path).await?);
    for i in 0..lines {
        writer
            .write_all(format!("Line {}: Placeholder data for I/O work simulation\n", i).as_bytes())
            .await?;
    }
    writer.flush().await
}

async fn count_lines(path: &Path) -> std::io::Result<u64> {
    let mut lines = BufReader::new(File::open(path).await?).lines();
    let mut count = 0;
    while lines.next_line().await?.is_some() {
        count += 1;
    }
    Ok(count)
}

#[async_trait]
impl WorkProfile for IoIntensive {
    fn name(&self) -> &str {
        IO_INTENSIVE
    }

    async fn run(&self) -> Result<String, ProfileError> {
        let lines = rand::thread_rng().gen_range(self.line_range.clone());
        let path = self.scratch_path();

        let outcome = async {
            write_lines(&path, lines).await?;
            count_lines(&path).await
        }
        .await;

        // Removal runs whatever the outcome; a missing file just means the
        // write never got that far.
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch file");
            }
        }

        let count = outcome?;
        Ok(format!(
            "Processed {} lines from file: {}",
            count,
            path.display()
        ))
    }
}
