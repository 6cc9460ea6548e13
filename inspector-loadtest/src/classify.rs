//! Attributing a response to a backend

use crate::BackendTarget;
use serde::{Serialize, Serializer};
use std::fmt;

/// Label for responses no target matched
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Label for requests that produced no response
pub const ERROR_LABEL: &str = "Error";

/// How one request ended
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Answered by the backend with this label
    Backend(String),
    /// Answered, but by no configured backend
    Unknown,
    /// Transport failure or timeout
    Error,
}

impl Outcome {
    pub fn label(&self) -> &str {
        match self {
            Outcome::Backend(label) => label,
            Outcome::Unknown => UNKNOWN_LABEL,
            Outcome::Error => ERROR_LABEL,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Matches responses against an ordered backend table.
///
/// The `X-Backend-Server` header is consulted first since it names the
/// backend exactly; the body is the fallback for backends that do not send
/// it. Within each source the first target in table order wins.
#[derive(Debug, Clone)]
pub struct BackendClassifier {
    targets: Vec<BackendTarget>,
}

impl BackendClassifier {
    pub fn new(targets: Vec<BackendTarget>) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &[BackendTarget] {
        &self.targets
    }

    pub fn classify(&self, header: Option<&str>, body: &str) -> Outcome {
        header
            .and_then(|value| self.find(value))
            .or_else(|| self.find(body))
            .map(|target| Outcome::Backend(target.label.clone()))
            .unwrap_or(Outcome::Unknown)
    }

    fn find(&self, haystack: &str) -> Option<&BackendTarget> {
        self.targets
            .iter()
            .find(|target| haystack.contains(target.marker.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_backends;

    fn classifier() -> BackendClassifier {
        BackendClassifier::new(default_backends())
    }

    #[test]
    fn test_classify_by_body() {
        let c = classifier();
        assert_eq!(
            c.classify(None, "Port: <span class=\"port\">8082</span>"),
            Outcome::Backend("Backend 2".into())
        );
        assert_eq!(c.classify(None, "nothing here"), Outcome::Unknown);
        assert_eq!(c.classify(None, ""), Outcome::Unknown);
    }

    #[test]
    fn test_body_uses_table_order() {
        // Both markers present: the earlier target wins, as a plain
        // substring scan in table order would decide
        let c = classifier();
        assert_eq!(
            c.classify(None, "8083 then 8081"),
            Outcome::Backend("Backend 1".into())
        );
    }

    #[test]
    fn test_header_takes_precedence() {
        let c = classifier();
        assert_eq!(
            c.classify(Some("Rust-Inspector-8083"), "client 127.0.0.1:8081"),
            Outcome::Backend("Backend 3".into())
        );
        assert_eq!(
            c.classify(Some("nginx"), "port 8082"),
            Outcome::Backend("Backend 2".into())
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Backend("Blue".into()).label(), "Blue");
        assert_eq!(Outcome::Unknown.to_string(), "Unknown");
        assert!(Outcome::Error.is_error());
        assert_eq!(serde_json::to_string(&Outcome::Error).unwrap(), "\"Error\"");
    }
}
