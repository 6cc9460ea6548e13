// Configuration errors, each naming the key or file at fault

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Nothing is set at this dotted key
    #[error("no setting at '{0}'")]
    KeyNotFound(String),

    /// A file could not be found, read or recognized
    #[error("cannot load {file}: {reason}")]
    LoadError { file: String, reason: String },

    /// A file was read but its content is malformed
    #[error("cannot parse {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A setting has an out-of-range or meaningless value
    #[error("invalid setting: {0}")]
    ValidationError(String),

    /// A value handed to `set` has no JSON representation
    #[error("cannot store '{key}': {reason}")]
    SerializationError { key: String, reason: String },

    /// The value at `key` does not have the requested type
    #[error("'{key}' has the wrong type: {reason}")]
    DeserializationError { key: String, reason: String },
}

impl ConfigError {
    pub(crate) fn load(file: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        ConfigError::LoadError {
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(file: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        ConfigError::ParseError {
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = ConfigError::parse("inspector.toml", "expected `]`");
        assert_eq!(err.to_string(), "cannot parse inspector.toml: expected `]`");

        let err = ConfigError::DeserializationError {
            key: "server.port".to_string(),
            reason: "invalid type".to_string(),
        };
        assert!(err.to_string().starts_with("'server.port'"));

        assert_eq!(
            ConfigError::KeyNotFound("loadtest.url".to_string()).to_string(),
            "no setting at 'loadtest.url'"
        );
    }
}
