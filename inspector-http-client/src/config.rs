//! Client settings.

use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POOL: usize = 32;

/// Settings for [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Relative request URLs are joined onto this.
    pub base_url: Option<String>,
    /// Deadline for a whole exchange, body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Idle connections kept per host; `0` opens a fresh connection for
    /// every request.
    pub pool_max_idle_per_host: usize,
    /// Sent with every request, before per-request headers.
    pub default_headers: Vec<(String, String)>,
    pub user_agent: String,
    /// `0` returns redirects to the caller as-is.
    pub max_redirects: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL,
            default_headers: Vec::new(),
            user_agent: concat!("inspector-http-client/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 0,
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    pub(crate) fn redirect_policy(&self) -> reqwest::redirect::Policy {
        match self.max_redirects {
            0 => reqwest::redirect::Policy::none(),
            n => reqwest::redirect::Policy::limited(n),
        }
    }
}

#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// A balancer that pins a reused connection to one backend skews the
    /// distribution, so probes may want `0` here.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.pool_max_idle_per_host, 32);
        assert!(config.user_agent.starts_with("inspector-http-client/"));
        assert_eq!(config.max_redirects, 0);
    }

    #[test]
    fn test_builder() {
        let config = HttpClientConfig::builder()
            .timeout(Duration::from_millis(250))
            .pool_max_idle_per_host(0)
            .default_header("X-Probe", "1")
            .max_redirects(3)
            .build();

        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.pool_max_idle_per_host, 0);
        assert_eq!(config.default_headers, vec![("X-Probe".into(), "1".into())]);
        assert_eq!(config.max_redirects, 3);
    }
}
