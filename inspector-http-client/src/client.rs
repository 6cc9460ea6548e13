//! HTTP client implementation.

use crate::{HttpClientConfig, HttpClientError, RequestBuilder, Response, Result};
use http::Method;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Pooled HTTP client that times every exchange.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .redirect(config.redirect_policy())
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(HttpClientConfig::default())
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, url.into())
    }

    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::POST, url.into())
    }

    pub fn head(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::HEAD, url.into())
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, url.into())
    }

    /// Send `request` and buffer the body; the clock covers both.
    pub(crate) async fn execute(&self, request: reqwest::Request, timeout: Duration) -> Result<Response> {
        let method = request.method().clone();
        let start = Instant::now();

        let response = self
            .inner
            .execute(request)
            .await
            .map_err(|e| HttpClientError::from_transport(e, timeout))?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::from_transport(e, timeout))?;
        let elapsed = start.elapsed();

        debug!(
            %method,
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "HTTP exchange complete"
        );

        Ok(Response::new(status, headers, body, url, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::default_client().unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_client_with_config() {
        let config = HttpClientConfig::builder()
            .timeout(Duration::from_secs(60))
            .base_url("http://127.0.0.1:3000")
            .build();

        let client = HttpClient::new(config).unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(60));
        assert_eq!(
            client.config().base_url.as_deref(),
            Some("http://127.0.0.1:3000")
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_sending() {
        let client = HttpClient::default_client().unwrap();
        let err = client.get("not a url").send().await.unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
    }
}
