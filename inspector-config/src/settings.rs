//! Typed settings for both tools

use crate::{ConfigError, ConfigValidator, Result, Validate};
use inspector_core::logging::{LogConfig, LogFormat, LogLevel, LogOutput};
use inspector_core::{ConsoleTarget, DEFAULT_BACKEND_NAME, DEFAULT_PORT, ReadLimits, ServerConfig};
use inspector_loadtest::{BackendTarget, LoadTestConfig};
use serde::{Deserialize, Deserializer, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Everything the `inspector` binary can be configured with
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub loadtest: LoadTestSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
    pub backend_name: String,
    /// Suppress the per-request console report
    pub quiet: bool,
    /// `0` waits forever
    pub read_timeout_secs: f64,
    pub drain_timeout_secs: f64,
    pub max_head_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        let limits = ReadLimits::default();
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            backend_name: DEFAULT_BACKEND_NAME.to_string(),
            quiet: false,
            read_timeout_secs: 30.0,
            drain_timeout_secs: 5.0,
            max_head_bytes: limits.max_head_bytes,
            max_body_bytes: limits.max_body_bytes,
        }
    }
}

impl ServerSettings {
    /// Fails when a timeout does not fit in a `Duration`
    pub fn server_config(&self) -> Result<ServerConfig> {
        let console = if self.quiet {
            ConsoleTarget::Discard
        } else {
            ConsoleTarget::Stdout
        };
        let read_timeout = ConfigValidator::secs(self.read_timeout_secs, "server.read_timeout_secs")?;
        let drain_timeout = ConfigValidator::secs(self.drain_timeout_secs, "server.drain_timeout_secs")?;

        Ok(ServerConfig::new(self.port)
            .host(self.host)
            .backend_name(self.backend_name.clone())
            .console(console)
            .limits(ReadLimits {
                max_head_bytes: self.max_head_bytes,
                max_body_bytes: self.max_body_bytes,
            })
            .read_timeout((!read_timeout.is_zero()).then_some(read_timeout))
            .drain_timeout(drain_timeout))
    }
}

impl Validate for ServerSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_port(self.port, "server.port")?;
        ConfigValidator::not_empty(&self.backend_name, "server.backend_name")?;
        ConfigValidator::at_least(self.max_head_bytes, 1024, "server.max_head_bytes")?;
        self.server_config().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTestSettings {
    pub url: String,
    pub requests: u64,
    pub concurrency: usize,
    pub timeout_secs: f64,
    pub keep_alive: bool,
    /// A table of `{label, marker}` or an inline `"LABEL=MARKER,..."` string
    #[serde(deserialize_with = "backends_from_table_or_list")]
    pub backends: Vec<BackendTarget>,
}

impl Default for LoadTestSettings {
    fn default() -> Self {
        let defaults = LoadTestConfig::default();
        Self {
            url: defaults.url,
            requests: defaults.total_requests,
            concurrency: defaults.concurrency,
            timeout_secs: defaults.timeout.as_secs_f64(),
            keep_alive: defaults.keep_alive,
            backends: defaults.backends,
        }
    }
}

impl LoadTestSettings {
    /// Fails when the timeout is zero or does not fit in a `Duration`
    pub fn loadtest_config(&self) -> Result<LoadTestConfig> {
        let timeout = ConfigValidator::positive_secs(self.timeout_secs, "loadtest.timeout_secs")?;
        Ok(LoadTestConfig::new(self.url.clone(), self.requests)
            .with_concurrency(self.concurrency)
            .with_timeout(timeout)
            .with_keep_alive(self.keep_alive)
            .with_backends(self.backends.clone()))
    }
}

impl Validate for LoadTestSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_url(&self.url, "loadtest.url")?;
        ConfigValidator::at_least(self.concurrency, 1, "loadtest.concurrency")?;
        for target in &self.backends {
            ConfigValidator::not_empty(&target.label, "loadtest.backends.label")?;
            ConfigValidator::not_empty(&target.marker, "loadtest.backends.marker")?;
        }
        self.loadtest_config()?
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BackendList {
    Table(Vec<BackendTarget>),
    Inline(String),
}

/// Parse `"Backend 1=8081,Backend 2=8082"`
pub fn parse_backend_list(list: &str) -> Result<Vec<BackendTarget>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<BackendTarget>()
                .map_err(|e| ConfigError::ValidationError(format!("loadtest.backends: {}", e)))
        })
        .collect()
}

fn backends_from_table_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<BackendTarget>, D::Error>
where
    D: Deserializer<'de>,
{
    match BackendList::deserialize(deserializer)? {
        BackendList::Table(targets) => Ok(targets),
        BackendList::Inline(list) => parse_backend_list(&list).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
    /// Log to this file instead of STDERR
    pub file: Option<String>,
    /// `EnvFilter` directive, overrides `level`
    pub filter: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default().as_str().to_string(),
            format: "compact".to_string(),
            file: None,
            filter: None,
        }
    }
}

impl LogSettings {
    pub fn log_config(&self) -> Result<LogConfig> {
        let level: LogLevel = self.level.parse().map_err(ConfigError::ValidationError)?;
        let format: LogFormat = self.format.parse().map_err(ConfigError::ValidationError)?;

        let mut config = LogConfig::new().level(level).format(format);
        if let Some(path) = &self.file {
            config = config.output(LogOutput::File(path.clone()));
        }
        if let Some(filter) = &self.filter {
            config = config.with_env_filter(filter.clone());
        }
        Ok(config)
    }
}

impl Validate for LogSettings {
    fn validate(&self) -> Result<()> {
        self.log_config().map(|_| ())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.loadtest.validate()?;
        self.log.validate()
    }
}
