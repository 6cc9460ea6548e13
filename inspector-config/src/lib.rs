// Layered configuration for the request inspector and load tester

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::{
    LoadTestSettings, LogSettings, ServerSettings, Settings, parse_backend_list,
};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Prefix of the environment variables read by default
pub const ENV_PREFIX: &str = "INSPECTOR";

/// Settings tree built up from layers; later layers win key by key
#[derive(Clone)]
pub struct ConfigManager {
    tree: Arc<RwLock<Value>>,
    env_prefix: String,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_prefix(ENV_PREFIX)
    }

    /// Create with a custom environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            tree: Arc::new(RwLock::new(Value::Object(Map::new()))),
            env_prefix: prefix.into(),
        }
    }

    /// Optional file, then `.env`, then the process environment
    pub fn layered(config_file: Option<&Path>) -> Result<Self> {
        let manager = Self::new();
        if let Some(path) = config_file {
            manager.load_file(path)?;
        }
        manager.load_dotenv(None)?;
        manager.load_env();
        Ok(manager)
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Merge `<PREFIX>_*` variables from the process environment
    pub fn load_env(&self) {
        let loader = EnvLoader::new(Some(self.env_prefix.clone()));
        self.merge_value(loader.load_tree());
    }

    /// Merge `<PREFIX>_*` entries of a dotenv file without exporting them.
    ///
    /// With no path, `.env` is searched from the working directory upwards
    /// and a missing file is not an error.
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        let iter = match path {
            Some(path) => dotenvy::from_path_iter(path).map_err(|e| ConfigError::load(path.display(), e))?,
            None => match dotenvy::dotenv_iter() {
                Ok(iter) => iter,
                Err(e) if e.not_found() => return Ok(()),
                Err(e) => return Err(ConfigError::load(".env", e)),
            },
        };
        let origin = path.map_or_else(|| ".env".to_string(), |p| p.display().to_string());

        let pairs = iter
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::parse(origin, e))?;
        debug!(entries = pairs.len(), "Loaded dotenv file");

        let loader = EnvLoader::new(Some(self.env_prefix.clone()));
        self.merge_value(loader.tree_from(pairs));
        Ok(())
    }

    /// Merge a configuration file, format taken from its name
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?.with_env_prefix(self.env_prefix.clone());
        let data = loader.load_file(path)?;
        debug!(path = %path.display(), format = ?loader.format(), "Loaded configuration file");

        self.merge_value(data);
        Ok(())
    }

    /// Deep-merge a tree over the current one
    pub fn merge_value(&self, overlay: Value) {
        merge(&mut *self.tree.write(), overlay);
    }

    /// Set a value at a dotted path such as `server.port`
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| ConfigError::SerializationError {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let overlay = key.rsplit('.').fold(value, |inner, segment| {
            let mut map = Map::new();
            map.insert(segment.to_string(), inner);
            Value::Object(map)
        });
        self.merge_value(overlay);
        Ok(())
    }

    /// Get a value at a dotted path
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let tree = self.tree.read();
        let value = lookup(&tree, key).ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone()).map_err(|e| ConfigError::DeserializationError {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        lookup(&self.tree.read(), key).is_some()
    }

    /// Copy of the merged tree
    pub fn snapshot(&self) -> Value {
        self.tree.read().clone()
    }

    /// Deserialize the merged tree without validating it
    pub fn build<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.snapshot()).map_err(|e| ConfigError::DeserializationError {
            key: "settings".to_string(),
            reason: e.to_string(),
        })
    }

    /// Deserialize the merged tree and validate it
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let validated: T = self.build()?;
        validated.validate()?;
        Ok(validated)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(tree, |node, segment| node.get(segment))
}

fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

impl Settings {
    /// Defaults, optional file, `.env` and `INSPECTOR_*` variables, validated
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        ConfigManager::layered(config_file)?.load_validated()
    }
}
