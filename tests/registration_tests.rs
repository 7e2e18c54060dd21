
use std::time::{Duration, Instant};

use axum::http::StatusCode;

use fleet_worker::config::RegistrationConfig;
use fleet_worker::registration::RegistrationClient;
use test_harness::{unreachable_url, MockCoordinator, WORKER_URL};

fn fast_registration(max_attempts: u32) -> RegistrationConfig {
    RegistrationConfig {
        max_attempts,
        retry_delay: Duration::from_millis(10),
        request_timeout: Duration::from_secs(2),
    }
}

fn client(coordinator_url: &str, config: RegistrationConfig) -> RegistrationClient {
    RegistrationClient::new(reqwest::Client::new(), coordinator_url, WORKER_URL, config)
}

#[tokio::test]
async fn test_registers_on_first_attempt() {
    let coordinator = MockCoordinator::accepting().await;

    let state = client(&coordinator.url(), fast_registration(10)).register().await;

    assert!(state.succeeded);
    assert_eq!(state.attempts, 1);
    assert_eq!(coordinator.calls(), 1);
    assert_eq!(coordinator.registered(), vec![WORKER_URL.to_string()]);
}

#[tokio::test]
async fn test_retries_until_coordinator_accepts() {
    let coordinator = MockCoordinator::failing_first(3).await;

    let state = client(&coordinator.url(), fast_registration(10)).register().await;

    assert!(state.succeeded);
    assert_eq!(state.attempts, 4);
    assert_eq!(coordinator.calls(), 4);
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let coordinator = MockCoordinator::always_failing(StatusCode::INTERNAL_SERVER_ERROR).await;

    let state = client(&coordinator.url(), fast_registration(10)).register().await;

    assert!(!state.succeeded);
    assert_eq!(state.attempts, 10);
    assert_eq!(coordinator.calls(), 10);
}

#[tokio::test]
async fn test_non_success_status_is_not_registration() {
    let coordinator = MockCoordinator::always_failing(StatusCode::NOT_FOUND).await;

    let state = client(&coordinator.url(), fast_registration(2)).register().await;

    assert!(!state.succeeded);
    assert_eq!(coordinator.calls(), 2);
}

#[tokio::test]
async fn test_unreachable_coordinator_exhausts_attempts() {
    let state = client(&unreachable_url(), fast_registration(3)).register().await;

    assert!(!state.succeeded);
    assert_eq!(state.attempts, 3);
}

#[tokio::test]
async fn test_retry_interval_is_constant() {
    let coordinator = MockCoordinator::always_failing(StatusCode::SERVICE_UNAVAILABLE).await;
    let config = RegistrationConfig {
        max_attempts: 4,
        retry_delay: Duration::from_millis(100),
        request_timeout: Duration::from_secs(2),
    };

    let start = Instant::now();
    let state = client(&coordinator.url(), config).register().await;
    let elapsed = start.elapsed();

    // Three sleeps between four attempts, none after the last
    assert_eq!(state.attempts, 4);
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(1500));
}
