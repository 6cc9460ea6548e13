// Configuration validation

use crate::{ConfigError, Result};
use std::time::Duration;
use url::Url;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable field checks
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty or blank
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a number is at least `min`
    pub fn at_least<T: PartialOrd + std::fmt::Display>(value: T, min: T, field: &str) -> Result<()> {
        if value < min {
            return Err(ConfigError::ValidationError(format!(
                "{} must be at least {} (got {})",
                field, min, value
            )));
        }
        Ok(())
    }

    /// Convert a non-negative number of seconds into a `Duration`
    ///
    /// Rejects NaN, infinities, negatives and values too large for `Duration`.
    pub fn secs(value: f64, field: &str) -> Result<Duration> {
        Duration::try_from_secs_f64(value).map_err(|e| {
            ConfigError::ValidationError(format!(
                "{} must be a non-negative number of seconds (got {}): {}",
                field, value, e
            ))
        })
    }

    /// Like [`secs`](Self::secs), but zero is rejected too
    pub fn positive_secs(value: f64, field: &str) -> Result<Duration> {
        let duration = Self::secs(value, field)?;
        if duration.is_zero() {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a positive number of seconds (got {})",
                field, value
            )));
        }
        Ok(duration)
    }

    /// Validate an absolute http(s) URL with a host
    pub fn is_url(value: &str, field: &str) -> Result<()> {
        let url = Url::parse(value).map_err(|e| {
            ConfigError::ValidationError(format!("{} is not a valid URL: {}", field, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an http:// or https:// URL",
                field
            )));
        }
        Ok(())
    }

    /// Validate port number
    pub fn is_port(value: u16, field: &str) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a valid port number",
                field
            )));
        }
        Ok(())
    }
}
