
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_worker::error::Result;
use fleet_worker::http::{router, AppState};
use fleet_worker::registration::RegistrationState;
use fleet_worker::store::{liveness_key, MemoryStore, SharedStore};
use fleet_worker::worker::{JobDispatcher, JobStatus, ResultReporter};
use test_harness::{dispatcher, reported_results, spy_registry, SpyProfile, WORKER_URL};

/// Store whose first list push panics; later calls go to the inner store.
struct PanicOnFirstPush {
    inner: Arc<MemoryStore>,
    tripped: AtomicBool,
}

#[async_trait]
impl SharedStore for PanicOnFirstPush {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.inner.set_with_expiry(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn push(&self, list: &str, value: &str) -> Result<()> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            panic!("result sink exploded");
        }
        self.inner.push(list, value).await
    }
}

fn test_app(
    store: Arc<MemoryStore>,
    spy: Arc<SpyProfile>,
    registration: RegistrationState,
) -> Router {
    let state = AppState {
        dispatcher: Arc::new(dispatcher(store.clone(), spy_registry(spy))),
        store,
        registration,
    };
    router(state)
}

async fn post_job(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/run_job")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_health(app: Router) -> Value {
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_run_job_completed() {
    let store = Arc::new(MemoryStore::new());
    let spy = Arc::new(SpyProfile::default());
    let app = test_app(store.clone(), spy.clone(), RegistrationState::default());

    let (status, body) = post_job(
        app,
        json!({"job_id": "j1", "name": "io_intensive", "payload": {}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["message"].as_str().unwrap().contains("j1"));

    let results = reported_results(&store).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status.to_string(), "completed");
}

#[tokio::test]
async fn test_run_job_invalid_content_returns_200() {
    let store = Arc::new(MemoryStore::new());
    let spy = Arc::new(SpyProfile::default());
    let app = test_app(store.clone(), spy.clone(), RegistrationState::default());

    let (status, body) =
        post_job(app, json!({"job_id": "j2", "payload": {"invalid_job": true}})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "failed", "message": "Invalid job content"}));
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_run_job_profile_failure_returns_200() {
    let store = Arc::new(MemoryStore::new());
    let spy = Arc::new(SpyProfile::default());
    let app = test_app(store.clone(), spy, RegistrationState::default());

    let (status, body) = post_job(
        app.clone(),
        json!({"job_id": "j3", "name": "panicking", "payload": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert!(body["message"].as_str().unwrap().contains("profile exploded"));

    // Still serving afterwards
    let (status, body) = post_job(app, json!({"job_id": "j4"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let results = reported_results(&store).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status.to_string(), "failed");
    assert_eq!(results[1].status.to_string(), "completed");
}

#[tokio::test]
async fn test_run_job_rejects_non_json_body() {
    let store = Arc::new(MemoryStore::new());
    let spy = Arc::new(SpyProfile::default());
    let app = test_app(store.clone(), spy.clone(), RegistrationState::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/run_job")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(spy.calls(), 0);
    assert!(reported_results(&store).await.is_empty());
}

#[tokio::test]
async fn test_health_reports_registration_and_liveness() {
    let store = Arc::new(MemoryStore::new());
    let spy = Arc::new(SpyProfile::default());
    let registration = RegistrationState {
        attempts: 3,
        succeeded: true,
    };

    let body = get_health(test_app(store.clone(), spy.clone(), registration)).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["worker_url"], WORKER_URL);
    assert_eq!(body["registered"], true);
    assert_eq!(body["registration_attempts"], 3);
    assert_eq!(body["alive"], false);

    store
        .set_with_expiry(&liveness_key(WORKER_URL), "alive", Duration::from_secs(30))
        .await
        .unwrap();
    let body = get_health(test_app(store, spy, registration)).await;
    assert_eq!(body["alive"], true);
}

#[tokio::test]
async fn test_run_job_null_name_uses_default_profile() {
    let store = Arc::new(MemoryStore::new());
    let spy = Arc::new(SpyProfile::default());
    let app = test_app(store.clone(), spy.clone(), RegistrationState::default());

    let (status, body) =
        post_job(app, json!({"job_id": "a", "name": null, "payload": {}})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(spy.calls(), 1);

    let results = reported_results(&store).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].job_id, "a");
}

#[tokio::test]
async fn test_run_job_accepts_numeric_and_null_job_ids() {
    let store = Arc::new(MemoryStore::new());
    let spy = Arc::new(SpyProfile::default());
    let app = test_app(store.clone(), spy.clone(), RegistrationState::default());

    let (status, body) = post_job(app.clone(), json!({"job_id": 42, "payload": {}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Job 42 completed");

    let (status, body) = post_job(app, json!({"job_id": null, "payload": {}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let results = reported_results(&store).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].job_id, "42");
    assert_eq!(results[1].job_id, "");
}

#[tokio::test]
async fn test_aborted_dispatch_still_reports_failure() {
    let store = Arc::new(MemoryStore::new());
    let sink: Arc<dyn SharedStore> = Arc::new(PanicOnFirstPush {
        inner: store.clone(),
        tripped: AtomicBool::new(false),
    });
    let spy = Arc::new(SpyProfile::default());
    let dispatcher = JobDispatcher::new(
        WORKER_URL,
        spy_registry(spy.clone()),
        ResultReporter::new(sink),
    );
    let app = router(AppState {
        dispatcher: Arc::new(dispatcher),
        store: store.clone(),
        registration: RegistrationState::default(),
    });

    let (status, body) = post_job(app, json!({"job_id": "boom", "payload": {}})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert!(body["message"].as_str().unwrap().contains("Job dispatch aborted"));
    assert_eq!(spy.calls(), 1);

    let results = reported_results(&store).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].job_id, "boom");
    assert_eq!(results[0].status, JobStatus::Failed);
    assert_eq!(results[0].worker_id, WORKER_URL);
}
