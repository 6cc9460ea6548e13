//! HTTP/1.x request reading.
//!
//! Reads one request head with `httparse`, then consumes exactly
//! `Content-Length` body bytes for POST requests. Header names keep their
//! original case and receipt order, which a `HeaderMap` would not.

use crate::{Error, InspectedRequest, Result};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Maximum number of request headers accepted
pub const MAX_HEADERS: usize = 100;

/// Size limits applied while reading a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Upper bound for the request line plus headers
    pub max_head_bytes: usize,
    /// Upper bound for a POST body
    pub max_body_bytes: usize,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_head_bytes: 64 * 1024,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Owned request line and headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version: u8,
    pub headers: Vec<(String, String)>,
}

impl RequestHead {
    /// Declared body length; absent means zero.
    ///
    /// The first `Content-Length` header is authoritative.
    pub fn content_length(&self) -> Result<usize> {
        match self
            .headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        {
            Some((_, value)) => value.trim().parse::<usize>().map_err(|_| {
                Error::BadRequest(format!("Invalid Content-Length: {}", value))
            }),
            None => Ok(0),
        }
    }
}

/// Try to parse a request head from the start of `buf`.
///
/// Returns the head and its length in bytes, or `None` if more input is
/// needed.
pub fn parse_head(buf: &[u8]) -> Result<Option<(RequestHead, usize)>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);

    match req.parse(buf) {
        Ok(httparse::Status::Complete(head_len)) => {
            let method = req
                .method
                .ok_or_else(|| Error::BadRequest("Missing method".to_string()))?;
            let target = req
                .path
                .ok_or_else(|| Error::BadRequest("Missing request target".to_string()))?;

            let headers = req
                .headers
                .iter()
                .take_while(|h| !h.name.is_empty())
                .map(|h| {
                    (
                        h.name.to_string(),
                        String::from_utf8_lossy(h.value).into_owned(),
                    )
                })
                .collect();

            Ok(Some((
                RequestHead {
                    method: method.to_string(),
                    target: target.to_string(),
                    version: req.version.unwrap_or(1),
                    headers,
                },
                head_len,
            )))
        }
        Ok(httparse::Status::Partial) => Ok(None),
        Err(httparse::Error::TooManyHeaders) => Err(Error::RequestHeaderFieldsTooLarge(format!(
            "More than {} headers",
            MAX_HEADERS
        ))),
        Err(e) => Err(Error::BadRequest(e.to_string())),
    }
}

/// Read one request from `reader`.
///
/// Only POST bodies are consumed; other methods are answered without
/// reading one.
pub async fn read_request<R>(
    reader: &mut R,
    client_addr: SocketAddr,
    limits: &ReadLimits,
) -> Result<InspectedRequest>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(4096);

    let (head, head_len) = loop {
        if !buf.is_empty()
            && let Some((head, head_len)) = parse_head(&buf)?
        {
            if head_len > limits.max_head_bytes {
                return Err(Error::RequestHeaderFieldsTooLarge(format!(
                    "Request head exceeds {} bytes",
                    limits.max_head_bytes
                )));
            }
            break (head, head_len);
        }

        if buf.len() >= limits.max_head_bytes {
            return Err(Error::RequestHeaderFieldsTooLarge(format!(
                "Request head exceeds {} bytes",
                limits.max_head_bytes
            )));
        }

        if reader.read_buf(&mut buf).await? == 0 {
            return if buf.is_empty() {
                Err(Error::ConnectionClosed)
            } else {
                Err(Error::BadRequest("Incomplete request head".to_string()))
            };
        }
    };

    let body = if head.method == "POST" {
        let declared = head.content_length()?;
        if declared > limits.max_body_bytes {
            return Err(Error::PayloadTooLarge(format!(
                "Content-Length {} exceeds {} bytes",
                declared, limits.max_body_bytes
            )));
        }
        let leftover = buf.split_off(head_len);
        read_body(reader, leftover, declared).await?
    } else {
        Bytes::new()
    };

    Ok(InspectedRequest {
        method: head.method,
        target: head.target,
        version: head.version,
        headers: head.headers,
        body,
        client_addr,
    })
}

async fn read_body<R>(reader: &mut R, mut body: BytesMut, len: usize) -> Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    if body.len() < len {
        body.reserve(len - body.len());
    }

    while body.len() < len {
        if reader.read_buf(&mut body).await? == 0 {
            return Err(Error::BadRequest(format!(
                "Body ended after {} of {} bytes",
                body.len(),
                len
            )));
        }
    }

    body.truncate(len);
    Ok(body.freeze())
}
