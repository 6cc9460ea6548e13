//! Buffered HTTP response.

use crate::{HttpClientError, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A response whose body has been read in full.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: url::Url,
    elapsed: Duration,
}

impl Response {
    pub(crate) fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: url::Url,
        elapsed: Duration,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            elapsed,
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the final URL, after redirects.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Time from sending the request to the last body byte.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| HttpClientError::Body(e.to_string()))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| HttpClientError::Json(e.to_string()))
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static [u8]) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("x-backend-server", "Rust-Inspector-8081".parse().unwrap());
        Response::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Bytes::from_static(body),
            url::Url::parse("http://127.0.0.1:3000/").unwrap(),
            Duration::from_millis(12),
        )
    }

    #[test]
    fn test_accessors() {
        let resp = response(200, b"{\"server_port\":\"8081\"}");
        assert!(resp.is_success());
        assert_eq!(resp.header("X-Backend-Server"), Some("Rust-Inspector-8081"));
        assert_eq!(resp.elapsed(), Duration::from_millis(12));

        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["server_port"], "8081");
    }

    #[test]
    fn test_text_lossy() {
        let resp = response(200, b"port \xff 8082");
        assert!(resp.text().is_err());
        assert!(resp.text_lossy().contains("8082"));
    }

    #[test]
    fn test_error_status_keeps_body() {
        let resp = response(502, b"bad gateway");
        assert!(!resp.is_success());
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(resp.header("x-backend-server"), Some("Rust-Inspector-8081"));
        assert_eq!(resp.text_lossy(), "bad gateway");
    }
}
