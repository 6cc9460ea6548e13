// Inbound request and outbound response types

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use std::borrow::Cow;
use std::net::SocketAddr;

/// A fully read inbound request, as the peer sent it.
///
/// Header names keep the case they arrived in and the list keeps receipt
/// order, duplicates included.
#[derive(Debug, Clone)]
pub struct InspectedRequest {
    pub method: String,
    /// Request target exactly as sent (path plus any query string)
    pub target: String,
    /// Minor HTTP version: `0` for HTTP/1.0, `1` for HTTP/1.1
    pub version: u8,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub client_addr: SocketAddr,
}

impl InspectedRequest {
    pub fn new(method: impl Into<String>, target: impl Into<String>, client_addr: SocketAddr) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            version: 1,
            headers: Vec::new(),
            body: Bytes::new(),
            client_addr,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Headers as a JSON object: exact-name keys, last value wins, first
    /// position kept.
    pub fn headers_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            map.insert(name.clone(), serde_json::Value::String(value.clone()));
        }
        map
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn body_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn http_version(&self) -> &'static str {
        match self.version {
            0 => "HTTP/1.0",
            _ => "HTTP/1.1",
        }
    }
}

/// HTTP response wrapper
///
/// Every response is written with `Connection: close`; the handler answers
/// one request per connection.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Headers only; no body and no `Content-Length` on the wire
    pub head_only: bool,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            head_only: false,
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Serialize `value` as two-space indented JSON
    pub fn with_json_pretty<T: Serialize>(mut self, value: &T) -> Result<Self, crate::Error> {
        self.body = serde_json::to_vec_pretty(value)
            .map_err(|e| crate::Error::Serialization(e.to_string()))?;
        Ok(self.with_header("Content-Type", "application/json"))
    }

    /// Set a header, replacing any existing value with the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn headers_only(mut self) -> Self {
        self.head_only = true;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Encode as an HTTP/1.1 response ready to be written to the socket
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.body.len());
        let reason = self.status.canonical_reason().unwrap_or("Unknown");
        out.extend_from_slice(format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), reason).as_bytes());

        for (name, value) in &self.headers {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        if !self.head_only {
            out.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }
        out.extend_from_slice(b"Connection: close\r\n\r\n");

        if !self.head_only {
            out.extend_from_slice(&self.body);
        }
        out
    }
}
