//! Error types for the inspector CLI.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// IO error (console, log file)
    Io(std::io::Error),

    /// Settings could not be loaded or failed validation
    Config(String),

    /// The inspector server failed to bind or run
    Server(String),

    /// The load test could not be set up or run
    LoadTest(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Server(msg) => write!(f, "Server error: {}", msg),
            CliError::LoadTest(msg) => write!(f, "Load test error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<inspector_config::ConfigError> for CliError {
    fn from(e: inspector_config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<inspector_core::Error> for CliError {
    fn from(e: inspector_core::Error) -> Self {
        CliError::Server(e.to_string())
    }
}

impl From<inspector_loadtest::LoadTestError> for CliError {
    fn from(e: inspector_loadtest::LoadTestError) -> Self {
        CliError::LoadTest(e.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(e: toml::ser::Error) -> Self {
        CliError::Config(e.to_string())
    }
}
