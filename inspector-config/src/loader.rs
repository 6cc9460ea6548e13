// Configuration file loaders

use crate::{ConfigError, EnvLoader, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    /// `KEY=value` lines, keys named like the environment variables
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format of `path`; a bare `.env` file counts as `Env`
    pub fn detect(path: &Path) -> Option<Self> {
        if path.file_name().and_then(|n| n.to_str()) == Some(".env") {
            return Some(FileFormat::Env);
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file loader.
///
/// Every format is parsed into a `serde_json::Value` tree shaped like
/// [`Settings`](crate::Settings): `{"server": {..}, "loadtest": {..}, "log": {..}}`.
pub struct ConfigLoader {
    format: FileFormat,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self {
            format,
            env_prefix: crate::ENV_PREFIX.to_string(),
        }
    }

    /// Prefix stripped from keys of `.env` files
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Auto-detect format from the file name
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::detect(path).ok_or_else(|| {
            ConfigError::load(path.display(), "unsupported format, expected .json, .toml or .env")
        })?;

        Ok(Self::new(format))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::load(path.display(), e))?;

        self.parse_from(&content, &path.display().to_string())
    }

    /// Parse configuration from string
    pub fn parse(&self, content: &str) -> Result<Value> {
        self.parse_from(content, "inline configuration")
    }

    fn parse_from(&self, content: &str, origin: &str) -> Result<Value> {
        let value = match self.format {
            FileFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::parse(origin, e))?
            }
            FileFormat::Toml => {
                let table: toml::Table =
                    toml::from_str(content).map_err(|e| ConfigError::parse(origin, e))?;
                serde_json::to_value(table).map_err(|e| ConfigError::parse(origin, e))?
            }
            FileFormat::Env => self.parse_env(content, origin)?,
        };

        if !value.is_object() {
            return Err(ConfigError::parse(origin, "root must be a table"));
        }
        Ok(value)
    }

    /// Same rules as the auto-loaded `.env`: dotenvy syntax, prefixed keys only
    fn parse_env(&self, content: &str, origin: &str) -> Result<Value> {
        let pairs = dotenvy::from_read_iter(content.as_bytes())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::parse(origin, e))?;

        Ok(EnvLoader::new(Some(self.env_prefix.clone())).tree_from(pairs))
    }
}
