//! Load test configuration

use crate::{ERROR_LABEL, LoadTestError, Result, UNKNOWN_LABEL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Load balancer address probed by default
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000/";

pub const DEFAULT_TOTAL_REQUESTS: u64 = 1000;

pub const DEFAULT_CONCURRENCY: usize = 20;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A backend the report has a row for, recognized by `marker` appearing in
/// a response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendTarget {
    pub label: String,
    pub marker: String,
}

impl BackendTarget {
    pub fn new(label: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            marker: marker.into(),
        }
    }
}

impl FromStr for BackendTarget {
    type Err = LoadTestError;

    /// Parse `LABEL=MARKER`, e.g. `Backend 1=8081`
    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once('=') {
            Some((label, marker)) if !label.trim().is_empty() && !marker.trim().is_empty() => {
                Ok(Self::new(label.trim(), marker.trim()))
            }
            _ => Err(LoadTestError::InvalidTarget(s.to_string())),
        }
    }
}

impl fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.marker)
    }
}

/// The three local inspector instances behind the balancer
pub fn default_backends() -> Vec<BackendTarget> {
    vec![
        BackendTarget::new("Backend 1", "8081"),
        BackendTarget::new("Backend 2", "8082"),
        BackendTarget::new("Backend 3", "8083"),
    ]
}

/// Load test configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTestConfig {
    pub url: String,
    /// Requests issued over the whole run
    pub total_requests: u64,
    /// Worker tasks issuing requests in parallel
    pub concurrency: usize,
    /// Deadline per request, body included
    pub timeout: Duration,
    /// Checked in order; the first match names the backend
    pub backends: Vec<BackendTarget>,
    /// Reuse connections between requests of one worker
    pub keep_alive: bool,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            total_requests: DEFAULT_TOTAL_REQUESTS,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            backends: default_backends(),
            keep_alive: true,
        }
    }
}

impl LoadTestConfig {
    /// Create new load test config
    ///
    /// # Examples
    ///
    /// ```
    /// use inspector_loadtest::LoadTestConfig;
    ///
    /// let config = LoadTestConfig::new("http://127.0.0.1:3000/", 1000);
    /// assert_eq!(config.concurrency, 20);
    /// ```
    pub fn new(url: impl Into<String>, total_requests: u64) -> Self {
        Self {
            url: url.into(),
            total_requests,
            ..Self::default()
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set timeout per request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the backend table
    pub fn with_backends(mut self, backends: Vec<BackendTarget>) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_keep_alive(mut self, enable: bool) -> Self {
        self.keep_alive = enable;
        self
    }

    /// Workers actually spawned: never more than there are requests
    pub fn worker_count(&self) -> usize {
        let total = usize::try_from(self.total_requests).unwrap_or(usize::MAX);
        self.concurrency.min(total)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(LoadTestError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(LoadTestError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        let url = url::Url::parse(&self.url)
            .map_err(|e| LoadTestError::InvalidConfig(format!("url '{}': {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoadTestError::InvalidConfig(format!(
                "url '{}' must use http or https",
                self.url
            )));
        }
        if let Some(target) = self
            .backends
            .iter()
            .find(|t| t.label.is_empty() || t.marker.is_empty())
        {
            return Err(LoadTestError::InvalidTarget(target.to_string()));
        }
        if let Some(target) = self
            .backends
            .iter()
            .find(|t| t.label == UNKNOWN_LABEL || t.label == ERROR_LABEL)
        {
            return Err(LoadTestError::InvalidConfig(format!(
                "backend label '{}' is reserved for unmatched or failed requests",
                target.label
            )));
        }
        Ok(())
    }
}
