//! Integration tests for the timed HTTP client against mock servers

use inspector_http_client::*;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_reads_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Backend-Server", "Rust-Inspector-8082")
                .set_body_string("<span class=\"port\">8082</span>"),
        )
        .mount(&server)
        .await;

    let client = HttpClient::default_client().unwrap();
    let response = client.get(format!("{}/", server.uri())).send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.header("x-backend-server"), Some("Rust-Inspector-8082"));
    assert!(response.text().unwrap().contains("8082"));
    assert!(response.elapsed() > Duration::ZERO);
}

#[tokio::test]
async fn test_base_url_query_and_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/probe"))
        .and(query_param("run", "7"))
        .and(header("x-probe", "yes"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .default_header("X-Probe", "yes")
        .build();
    let client = HttpClient::new(config).unwrap();

    let response = client.get("/probe").query("run", "7").send().await.unwrap();
    assert_eq!(response.status(), 204);
    assert!(response.bytes().is_empty());
}

#[tokio::test]
async fn test_post_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "received",
            "content_length": 7
        })))
        .mount(&server)
        .await;

    let client = HttpClient::default_client().unwrap();
    let response = client
        .post(server.uri())
        .json(&serde_json::json!({"a": 1}))
        .send()
        .await
        .unwrap();

    let echo: serde_json::Value = response.json().unwrap();
    assert_eq!(echo["status"], "received");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = HttpClient::default_client().unwrap();
    let err = client
        .get(server.uri())
        .timeout(Duration::from_millis(100))
        .send()
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(matches!(err, HttpClientError::Timeout(d) if d == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::default_client().unwrap();
    let err = client.get(format!("http://{}/", addr)).send().await.unwrap_err();
    assert!(err.is_connection());
}

#[tokio::test]
async fn test_error_status_is_still_a_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let client = HttpClient::default_client().unwrap();
    let response = client.get(server.uri()).send().await.unwrap();
    assert_eq!(response.status(), 503);

    assert!(!response.is_success());
    assert_eq!(response.text_lossy(), "down");
}
