use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Marker in a payload that makes the validator reject a job.
pub const INVALID_JOB_MARKER: &str = "invalid_job";

/// Error text recorded when the validator rejects a job.
pub const INVALID_JOB_CONTENT: &str = "Invalid job content";

/// Profile name used when a request does not name one.
pub const DEFAULT_JOB_NAME: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

fn default_job_name() -> String {
    DEFAULT_JOB_NAME.to_string()
}

/// Render a JSON scalar as text; `null` becomes `None`.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Job ids are passed through as-is; numbers are kept in their JSON form.
fn lenient_job_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// An explicit `null` name selects the default profile.
fn lenient_job_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?).unwrap_or_else(default_job_name))
}

/// Inbound job-execution request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(default, deserialize_with = "lenient_job_id")]
    pub job_id: String,
    /// Profile selector
    #[serde(default = "default_job_name", deserialize_with = "lenient_job_name")]
    pub name: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl JobRequest {
    pub fn new(job_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            name: name.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Content-based validation.
    ///
    /// The coordinator ships payloads as strings, other clients as JSON
    /// objects, so the marker is looked for as an object key, a substring,
    /// or an array element. A missing payload is valid.
    pub fn is_invalid(&self) -> bool {
        match &self.payload {
            Some(Value::Object(map)) => map.contains_key(INVALID_JOB_MARKER),
            Some(Value::String(s)) => s.contains(INVALID_JOB_MARKER),
            Some(Value::Array(items)) => items
                .iter()
                .any(|item| item.as_str() == Some(INVALID_JOB_MARKER)),
            _ => false,
        }
    }
}

/// Terminal outcome of one dispatch, pushed to the result sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time spent in the profile, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(rename = "worker_url")]
    pub worker_id: String,
    pub finished_at: DateTime<Utc>,
}

impl JobResult {
    pub fn completed(
        job_id: impl Into<String>,
        worker_id: impl Into<String>,
        result: String,
        processing_time: f64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Completed,
            result: Some(result),
            error: None,
            processing_time: Some(processing_time),
            worker_id: worker_id.into(),
            finished_at: Utc::now(),
        }
    }

    pub fn failed(
        job_id: impl Into<String>,
        worker_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Failed,
            result: None,
            error: Some(error.into()),
            processing_time: None,
            worker_id: worker_id.into(),
            finished_at: Utc::now(),
        }
    }
}

/// Synchronous response to a `/run_job` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResponse {
    pub status: JobStatus,
    pub message: String,
}

impl JobResponse {
    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Completed,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            message: message.into(),
        }
    }
}
