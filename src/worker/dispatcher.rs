use std::time::Instant;

use crate::error::ProfileError;
use crate::worker::job::{JobRequest, JobResponse, JobResult, INVALID_JOB_CONTENT};
use crate::worker::profiles::ProfileRegistry;
use crate::worker::reporter::ResultReporter;

/// Runs one job request through validation, profile execution and reporting.
///
/// Every call reports exactly one terminal [`JobResult`] before returning,
/// and always returns a structured [`JobResponse`], whatever the profile does.
/// Steps run strictly in order: validate, execute, build result, report.
pub struct JobDispatcher {
    worker_id: String,
    profiles: ProfileRegistry,
    reporter: ResultReporter,
}

impl JobDispatcher {
    pub fn new(
        worker_id: impl Into<String>,
        profiles: ProfileRegistry,
        reporter: ResultReporter,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            profiles,
            reporter,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn reporter(&self) -> &ResultReporter {
        &self.reporter
    }

    pub async fn handle(&self, request: JobRequest) -> JobResponse {
        let JobRequest { job_id, name, .. } = &request;
        tracing::info!(job_id = %job_id, job_name = %name, "Received job");

        if request.is_invalid() {
            tracing::warn!(job_id = %job_id, "Rejected job with invalid content");
            let result = JobResult::failed(
                job_id.as_str(),
                self.worker_id.as_str(),
                INVALID_JOB_CONTENT,
            );
            self.reporter.report(result).await;
            return JobResponse::failed(INVALID_JOB_CONTENT);
        }

        let profile = self.profiles.select(name);
        let started = Instant::now();

        // The profile runs in its own task so a panic is contained and
        // reported like any other failure.
        let outcome = match tokio::spawn(async move { profile.run().await }).await {
            Ok(outcome) => outcome,
            Err(e) => Err(ProfileError::from(e)),
        };
        let processing_time = started.elapsed().as_secs_f64();

        match outcome {
            Ok(description) => {
                tracing::info!(
                    job_id = %job_id,
                    job_name = %name,
                    processing_time,
                    "Job completed"
                );
                let summary = format!(
                    "Job {} processed successfully | result_data: {}",
                    job_id, description
                );
                self.reporter
                    .report(JobResult::completed(
                        job_id.as_str(),
                        self.worker_id.as_str(),
                        summary,
                        processing_time,
                    ))
                    .await;
                JobResponse::completed(format!("Job {} completed", job_id))
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    job_id = %job_id,
                    job_name = %name,
                    error = %message,
                    "Job failed"
                );
                let result =
                    JobResult::failed(job_id.as_str(), self.worker_id.as_str(), message.clone());
                self.reporter.report(result).await;
                JobResponse::failed(message)
            }
        }
    }
}
