//! Per-request builder.

use crate::{HttpClient, HttpClientError, Response, Result};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// One request, assembled before [`send`](Self::send).
///
/// A bad header or an unserializable JSON body is remembered and reported
/// by `send`, so chained calls stay infallible.
#[must_use = "a request does nothing until `send` is awaited"]
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
    error: Option<HttpClientError>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: String) -> Self {
        Self {
            client,
            method,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            error: None,
        }
    }

    fn fail(mut self, error: HttpClientError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    /// Append a header; repeated names are all sent
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let (name, value) = (name.as_ref(), value.as_ref());
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
                self
            }
            _ => self.fail(HttpClientError::RequestBuild(format!("invalid header {name:?}"))),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the body and mark it `application/json`
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.body = Some(bytes);
                self
            }
            Err(e) => self.fail(HttpClientError::Json(e.to_string())),
        }
    }

    /// Deadline for this request instead of the client's
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn resolve_url(&self) -> Result<Url> {
        let invalid = |e: url::ParseError| HttpClientError::InvalidUrl(format!("{}: {e}", self.url));
        let mut url = match &self.client.config().base_url {
            Some(base) => Url::parse(base).and_then(|base| base.join(&self.url)),
            None => Url::parse(&self.url),
        }
        .map_err(invalid)?;

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }

    /// Send the request and buffer the whole body
    pub async fn send(mut self) -> Result<Response> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        let url = self.resolve_url()?;
        let config = self.client.config();
        let timeout = self.timeout.unwrap_or(config.timeout);

        let mut headers = HeaderMap::with_capacity(config.default_headers.len() + self.headers.len());
        for (name, value) in &config.default_headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, value);
            }
        }
        headers.extend(self.headers);

        let mut request = self
            .client
            .inner()
            .request(self.method, url)
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = self.body {
            request = request.body(body);
        }

        let request = request
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;
        self.client.execute(request, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_appended_to_base_url() {
        let client = HttpClient::new(
            crate::HttpClientConfig::builder()
                .base_url("http://lb.local:3000/api/")
                .build(),
        )
        .unwrap();
        let url = client
            .get("probe?x=1")
            .query("run", "a b")
            .resolve_url()
            .unwrap();
        assert_eq!(url.as_str(), "http://lb.local:3000/api/probe?x=1&run=a+b");
    }

    #[tokio::test]
    async fn test_invalid_header_fails_on_send() {
        let client = HttpClient::default_client().unwrap();
        let err = client
            .get("http://127.0.0.1:9/")
            .header("Bad Header", "x")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpClientError::RequestBuild(msg) if msg.contains("Bad Header")));
    }
}
