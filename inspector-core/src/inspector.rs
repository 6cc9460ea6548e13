// Request inspector: turns an inbound request into its echo response

use crate::render::inspection_page;
use crate::{Console, Error, HttpResponse, InspectedRequest};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tracing::{debug, info};

/// Header identifying which backend instance answered
pub const BACKEND_HEADER: &str = "X-Backend-Server";

/// Default `<impl>` part of the backend identifier
pub const DEFAULT_BACKEND_NAME: &str = "Rust-Inspector";

/// JSON body returned for POST requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostEcho {
    pub status: String,
    pub method: String,
    pub path: String,
    pub server_port: String,
    pub client_address: String,
    pub content_length: usize,
    pub headers: serde_json::Map<String, serde_json::Value>,
}

impl PostEcho {
    pub fn from_request(port: u16, request: &InspectedRequest) -> Self {
        Self {
            status: "received".to_string(),
            method: "POST".to_string(),
            path: request.target.clone(),
            server_port: port.to_string(),
            client_address: request.client_addr.to_string(),
            content_length: request.body.len(),
            headers: request.headers_map(),
        }
    }
}

/// Stateless request handler bound to one port.
///
/// Shared read-only between connection tasks.
#[derive(Debug, Clone)]
pub struct Inspector {
    port: u16,
    backend_name: String,
    console: Console,
}

impl Inspector {
    pub fn new(port: u16, backend_name: impl Into<String>, console: Console) -> Self {
        Self {
            port,
            backend_name: backend_name.into(),
            console,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Value of the `X-Backend-Server` header: `<impl>-<port>`
    pub fn backend_id(&self) -> String {
        format!("{}-{}", self.backend_name, self.port)
    }

    /// Report the request to the console, then build its response
    pub fn handle(&self, request: &InspectedRequest) -> HttpResponse {
        self.console.report(self.port, request);

        info!(
            method = %request.method,
            path = %request.target,
            client = %request.client_addr,
            headers = request.headers.len(),
            body_bytes = request.body.len(),
            "Request inspected"
        );

        let response = match request.method.as_str() {
            "HEAD" => self.head(),
            "GET" => self.get(request),
            "POST" => self.post(request),
            other => {
                debug!(method = %other, "Unsupported method");
                self.error_response(&Error::NotImplemented(format!(
                    "Unsupported method ({})",
                    other
                )))
            }
        };

        self.stamp(response)
    }

    /// Response for a request that could not be read
    pub fn error_response(&self, err: &Error) -> HttpResponse {
        let status = err.status_code();
        let reason = status.canonical_reason().unwrap_or("Error");
        self.stamp(HttpResponse::text(
            status,
            format!("{} {}: {}\n", status.as_u16(), reason, err),
        ))
    }

    fn head(&self) -> HttpResponse {
        HttpResponse::ok()
            .with_header("Content-Type", "text/html; charset=utf-8")
            .headers_only()
    }

    fn get(&self, request: &InspectedRequest) -> HttpResponse {
        HttpResponse::html(inspection_page(self.port, request))
    }

    fn post(&self, request: &InspectedRequest) -> HttpResponse {
        let echo = PostEcho::from_request(self.port, request);
        HttpResponse::ok()
            .with_json_pretty(&echo)
            .unwrap_or_else(|e| {
                HttpResponse::text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            })
    }

    /// Headers every response carries
    fn stamp(&self, response: HttpResponse) -> HttpResponse {
        response
            .with_header(BACKEND_HEADER, self.backend_id())
            .with_header(
                "Server",
                format!("{}/{}", self.backend_name, env!("CARGO_PKG_VERSION")),
            )
            .with_header("Date", httpdate::fmt_http_date(SystemTime::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConsoleTarget;

    fn inspector() -> Inspector {
        Inspector::new(8081, DEFAULT_BACKEND_NAME, Console::new(ConsoleTarget::Discard))
    }

    fn request(method: &str) -> InspectedRequest {
        InspectedRequest::new(method, "/api/v1?x=y", "127.0.0.1:60000".parse().unwrap())
            .with_header("Host", "127.0.0.1:3000")
            .with_header("X-Forwarded-For", "203.0.113.5")
    }

    #[test]
    fn test_backend_id() {
        assert_eq!(inspector().backend_id(), "Rust-Inspector-8081");
        let custom = Inspector::new(9000, "Custom", Console::default());
        assert_eq!(custom.backend_id(), "Custom-9000");
    }

    #[test]
    fn test_head_has_no_body() {
        let res = inspector().handle(&request("HEAD"));
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.head_only);
        assert!(res.body.is_empty());
        assert_eq!(res.header("Content-Type"), Some("text/html; charset=utf-8"));
        assert_eq!(res.header(BACKEND_HEADER), Some("Rust-Inspector-8081"));
    }

    #[test]
    fn test_get_renders_html() {
        let res = inspector().handle(&request("GET"));
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.header("Content-Type"), Some("text/html; charset=utf-8"));
        assert_eq!(res.header(BACKEND_HEADER), Some("Rust-Inspector-8081"));

        let body = String::from_utf8(res.body).unwrap();
        assert!(body.contains("Port: <span class=\"port\">8081</span>"));
        assert!(body.contains("127.0.0.1:60000"));
        assert!(body.contains("<strong>X-Forwarded-For:</strong> 203.0.113.5"));
    }

    #[test]
    fn test_post_echoes_json() {
        let req = request("POST")
            .with_header("Content-Type", "application/json")
            .with_header("Content-Length", "8")
            .with_body(&b"{\"a\":1}\n"[..]);
        let res = inspector().handle(&req);

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        assert_eq!(res.header(BACKEND_HEADER), Some("Rust-Inspector-8081"));

        let echo: PostEcho = serde_json::from_slice(&res.body).unwrap();
        assert_eq!(echo.status, "received");
        assert_eq!(echo.method, "POST");
        assert_eq!(echo.path, "/api/v1?x=y");
        assert_eq!(echo.server_port, "8081");
        assert_eq!(echo.client_address, "127.0.0.1:60000");
        assert_eq!(echo.content_length, 8);
        assert_eq!(echo.headers.len(), 4);
        assert_eq!(echo.headers["Content-Length"], "8");
        assert_eq!(echo.headers["X-Forwarded-For"], "203.0.113.5");
    }

    #[test]
    fn test_unsupported_method() {
        let res = inspector().handle(&request("DELETE"));
        assert_eq!(res.status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(res.header(BACKEND_HEADER), Some("Rust-Inspector-8081"));
    }

    #[test]
    fn test_error_response_status() {
        let res = inspector().error_response(&Error::BadRequest("bad".into()));
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(res.header("Date").is_some());
        assert!(String::from_utf8(res.body).unwrap().starts_with("400 Bad Request"));
    }

    #[test]
    fn test_report_written_before_response() {
        let (target, buffer) = ConsoleTarget::memory();
        let inspector = Inspector::new(8082, DEFAULT_BACKEND_NAME, Console::new(target));
        let _ = inspector.handle(&request("GET"));

        let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(text.contains("SERVER PORT: 8082"));
        assert!(text.contains("PATH: /api/v1?x=y"));
    }
}
