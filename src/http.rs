use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::registration::RegistrationState;
use crate::store::{liveness_key, SharedStore};
use crate::worker::{JobDispatcher, JobRequest, JobResponse, JobResult};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<JobDispatcher>,
    pub store: Arc<dyn SharedStore>,
    pub registration: RegistrationState,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    worker_url: String,
    registered: bool,
    registration_attempts: u32,
    alive: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/run_job", post(run_job_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the worker API on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(addr = %addr, "Starting worker HTTP server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

/// Always answers 200; job-level failures are carried in the body.
async fn run_job_handler(
    State(state): State<AppState>,
    Json(request): Json<JobRequest>,
) -> Json<JobResponse> {
    let dispatcher = state.dispatcher.clone();
    let job_id = request.job_id.clone();

    // Detached so a client hanging up cannot cancel a dispatch mid-flight
    let dispatch = tokio::spawn(async move { dispatcher.handle(request).await });

    match dispatch.await {
        Ok(response) => Json(response),
        Err(e) => {
            let message = format!("Job dispatch aborted: {}", e);
            tracing::error!(job_id = %job_id, error = %e, "Job dispatch aborted");
            let dispatcher = &state.dispatcher;
            dispatcher
                .reporter()
                .report(JobResult::failed(
                    job_id,
                    dispatcher.worker_id(),
                    message.as_str(),
                ))
                .await;
            Json(JobResponse::failed(message))
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let worker_url = state.dispatcher.worker_id().to_string();
    let alive = match state.store.get(&liveness_key(&worker_url)).await {
        Ok(marker) => marker.is_some(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read liveness marker");
            false
        }
    };

    Json(HealthResponse {
        status: "ok",
        worker_url,
        registered: state.registration.succeeded,
        registration_attempts: state.registration.attempts,
        alive,
    })
}
