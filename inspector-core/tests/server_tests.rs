//! Integration tests for the inspector server over real sockets

use inspector_core::*;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Running {
    addr: SocketAddr,
    console: Arc<Mutex<Vec<u8>>>,
    tracker: ConnectionTracker,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<()>>,
}

impl Running {
    fn port(&self) -> u16 {
        self.addr.port()
    }

    fn console_text(&self) -> String {
        String::from_utf8(self.console.lock().unwrap().clone()).unwrap()
    }

    async fn stop(self) {
        let _ = self.stop.send(());
        self.handle.await.unwrap().unwrap();
    }
}

async fn start(config: ServerConfig) -> Running {
    let (target, console) = ConsoleTarget::memory();
    let server = InspectorServer::bind(
        config
            .host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .console(target),
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();
    let tracker = server.tracker();

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async move {
        let _ = stopped.await;
    }));

    Running {
        addr,
        console,
        tracker,
        stop,
        handle,
    }
}

/// Send raw bytes and read the full response (the server closes after one)
async fn exchange(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

fn split_response(raw: &str) -> (&str, &str) {
    raw.split_once("\r\n\r\n").unwrap()
}

#[tokio::test]
async fn test_head_returns_headers_only() {
    let server = start(ServerConfig::new(0)).await;
    let port = server.port();

    let raw = exchange(server.addr, b"HEAD / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains("Content-Type: text/html; charset=utf-8"));
    assert!(head.contains(&format!("X-Backend-Server: Rust-Inspector-{}", port)));
    assert!(body.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_get_lists_headers_in_receipt_order() {
    let server = start(ServerConfig::new(0)).await;

    let raw = exchange(
        server.addr,
        b"GET /some/where?q=1 HTTP/1.1\r\nHost: lb\r\nX-Zulu: z\r\nX-Alpha: a\r\n\r\n",
    )
    .await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(body.contains(&format!("Port: <span class=\"port\">{}</span>", server.port())));
    let zulu = body.find("<strong>X-Zulu:</strong> z").unwrap();
    let alpha = body.find("<strong>X-Alpha:</strong> a").unwrap();
    assert!(zulu < alpha);

    let console = server.console_text();
    assert!(console.contains("GET REQUEST RECEIVED"));
    assert!(console.contains("PATH: /some/where?q=1"));
    assert!(console.contains("  X-Zulu: z"));

    server.stop().await;
}

#[tokio::test]
async fn test_post_echo_preserves_header_case() {
    let server = start(ServerConfig::new(0)).await;
    let port = server.port();

    let raw = exchange(
        server.addr,
        b"POST /submit HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nX-Request-ID: abc\r\nContent-Length: 8\r\n\r\n{\"a\":1}\n",
    )
    .await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains(&format!("X-Backend-Server: Rust-Inspector-{}", port)));

    let echo: PostEcho = serde_json::from_str(body).unwrap();
    assert_eq!(echo.status, "received");
    assert_eq!(echo.path, "/submit");
    assert_eq!(echo.server_port, port.to_string());
    assert_eq!(echo.content_length, 8);
    assert_eq!(echo.headers["X-Request-ID"], "abc");
    assert_eq!(echo.headers["Content-Type"], "application/json");
    assert_eq!(echo.headers["Host"], "localhost");
    assert_eq!(echo.headers.len(), 4);
    assert!(echo.client_address.starts_with("127.0.0.1:"));

    assert!(server.console_text().contains("BODY: {\"a\":1}"));
    server.stop().await;
}

#[tokio::test]
async fn test_unsupported_method_is_501() {
    let server = start(ServerConfig::new(0)).await;
    let raw = exchange(server.addr, b"PUT / HTTP/1.1\r\nHost: x\r\n\r\n").await;
    assert!(raw.starts_with("HTTP/1.1 501 Not Implemented"));
    assert!(raw.contains("X-Backend-Server: "));
    server.stop().await;
}

#[tokio::test]
async fn test_malformed_request_is_400() {
    let server = start(ServerConfig::new(0)).await;
    let raw = exchange(server.addr, b"NOT A REQUEST\r\n\r\n").await;
    assert!(raw.starts_with("HTTP/1.1 400 Bad Request"));
    assert!(server.console_text().is_empty());
    server.stop().await;
}

#[tokio::test]
async fn test_invalid_content_length_is_400() {
    let server = start(ServerConfig::new(0)).await;
    let raw = exchange(
        server.addr,
        b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n",
    )
    .await;
    assert!(raw.starts_with("HTTP/1.1 400 Bad Request"));
    server.stop().await;
}

#[tokio::test]
async fn test_body_over_limit_is_413() {
    let limits = ReadLimits {
        max_body_bytes: 4,
        ..ReadLimits::default()
    };
    let server = start(ServerConfig::new(0).limits(limits)).await;
    let raw = exchange(
        server.addr,
        b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\n",
    )
    .await;
    assert!(raw.starts_with("HTTP/1.1 413 Payload Too Large"));
    server.stop().await;
}

#[tokio::test]
async fn test_read_timeout_is_408() {
    let server = start(ServerConfig::new(0).read_timeout(Some(Duration::from_millis(100)))).await;
    let raw = exchange(server.addr, b"GET / HTTP/1.1\r\nHost: slow\r\n").await;
    assert!(raw.starts_with("HTTP/1.1 408 Request Timeout"));
    server.stop().await;
}

#[tokio::test]
async fn test_reqwest_client_sees_all_methods_ok() {
    let server = start(ServerConfig::new(0).backend_name("Probe")).await;
    let url = format!("http://{}/anything", server.addr);
    let client = reqwest::Client::new();
    let expected = format!("Probe-{}", server.port());

    let head = client.head(&url).send().await.unwrap();
    assert_eq!(head.status(), 200);
    assert_eq!(head.headers()["x-backend-server"], expected.as_str());

    let get = client.get(&url).send().await.unwrap();
    assert_eq!(get.status(), 200);
    assert_eq!(get.headers()["x-backend-server"], expected.as_str());
    assert!(get.text().await.unwrap().contains("Backend Server"));

    let post = client
        .post(&url)
        .header("Content-Type", "application/json")
        .body("{\"a\":1}\n")
        .send()
        .await
        .unwrap();
    assert_eq!(post.status(), 200);
    assert_eq!(post.headers()["x-backend-server"], expected.as_str());
    let echo: PostEcho = post.json().await.unwrap();
    assert_eq!(echo.content_length, 8);

    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_callers_get_their_own_data() {
    let server = start(ServerConfig::new(0)).await;
    let addr = server.addr;

    let mut tasks = Vec::new();
    for i in 0..25 {
        tasks.push(tokio::spawn(async move {
            let body = format!("caller-{}", i);
            let raw = format!(
                "POST /caller/{} HTTP/1.1\r\nX-Caller: {}\r\nContent-Length: {}\r\n\r\n{}",
                i,
                i,
                body.len(),
                body
            );
            let response = exchange(addr, raw.as_bytes()).await;
            let (_, json) = split_response(&response);
            let echo: PostEcho = serde_json::from_str(json).unwrap();
            (i, echo)
        }));
    }

    for task in tasks {
        let (i, echo) = task.await.unwrap();
        assert_eq!(echo.path, format!("/caller/{}", i));
        assert_eq!(echo.headers["X-Caller"], i.to_string());
        assert_eq!(echo.content_length, format!("caller-{}", i).len());
    }

    server.stop().await;
}

#[tokio::test]
async fn test_stop_drains_and_counts_connections() {
    let server = start(ServerConfig::new(0)).await;
    let tracker = server.tracker.clone();

    exchange(server.addr, b"GET / HTTP/1.1\r\n\r\n").await;
    exchange(server.addr, b"GET / HTTP/1.1\r\n\r\n").await;
    server.stop().await;

    assert_eq!(tracker.served_count(), 2);
    assert_eq!(tracker.active_count(), 0);
}
