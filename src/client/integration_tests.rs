//! HTTP client integration tests against mock servers

use super::*;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Mock deployment answering the health endpoint
pub struct MockHealthServer {
    server: MockServer,
}

impl MockHealthServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn url(&self, request_path: &str) -> String {
        format!("{}{}", self.server.uri(), request_path)
    }

    pub async fn mock(&self, request_path: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }
}

#[tokio::test]
async fn test_get_collects_status_headers_and_body() {
    let server = MockHealthServer::new().await;
    server
        .mock(
            "/api/health",
            ResponseTemplate::new(200)
                .insert_header("X-Pockethost-Region", "sjc")
                .insert_header("X-Pockethost-Request-Duration", "14")
                .set_body_string("ok"),
        )
        .await;

    let client = ProbeClient::new(Duration::from_secs(5)).unwrap();
    let response = client.get(&server.url("/api/health")).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert!(response.is_ok());
    assert_eq!(response.body_size, 2);
    assert_eq!(response.region(), Some("sjc"));
    assert_eq!(response.internal_duration_ms(), Some(14));
}

#[tokio::test]
async fn test_error_status_is_not_a_transport_error() {
    let server = MockHealthServer::new().await;
    server.mock("/api/health", ResponseTemplate::new(503)).await;

    let client = ProbeClient::new(Duration::from_secs(5)).unwrap();
    let response = client.get(&server.url("/api/health")).await.unwrap();

    assert_eq!(response.status_code, 503);
    assert!(!response.is_ok());
}

#[tokio::test]
async fn test_duration_covers_server_delay() {
    let server = MockHealthServer::new().await;
    server
        .mock(
            "/api/health",
            ResponseTemplate::new(200).set_delay(Duration::from_millis(120)),
        )
        .await;

    let client = ProbeClient::new(Duration::from_secs(5)).unwrap();
    let response = client.get(&server.url("/api/health")).await.unwrap();

    assert!(response.duration >= Duration::from_millis(120));
}

#[tokio::test]
async fn test_timeout_surfaces_as_error() {
    let server = MockHealthServer::new().await;
    server
        .mock(
            "/api/health",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        )
        .await;

    let client = ProbeClient::new(Duration::from_millis(200)).unwrap();
    let result = client.get(&server.url("/api/health")).await;

    assert!(matches!(result, Err(AppError::Timeout(_))));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = ProbeClient::new(Duration::from_secs(2)).unwrap();
    let result = client.get(&format!("http://127.0.0.1:{}/api/health", port)).await;

    assert!(matches!(result, Err(AppError::Network(_))));
}
