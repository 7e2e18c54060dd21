use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Store error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Registration rejected: {0}")]
    Registration(String),
}

pub type Result<T> = std::result::Result<T, WorkerError>;

/// Failure raised by a work profile.
///
/// The dispatcher records the `Display` text of this error as the `error`
/// field of the failed job result.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("CPU pool unavailable: {0}")]
    Pool(String),

    #[error("Profile panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(String),
}

impl From<tokio::task::JoinError> for ProfileError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            ProfileError::Panicked(message)
        } else {
            ProfileError::Pool("task was cancelled".to_string())
        }
    }
}
