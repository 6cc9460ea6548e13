// Environment variable loading

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::env;

/// Settings sections addressable from flat keys
pub const SECTIONS: [&str; 3] = ["server", "loadtest", "log"];

/// Section that receives keys without a section prefix
pub const DEFAULT_SECTION: &str = "server";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Matching variables keyed by lowercase name with the prefix removed
    pub(crate) fn filter(&self, vars: impl IntoIterator<Item = (String, String)>) -> HashMap<String, String> {
        let mut config = HashMap::new();

        for (key, value) in vars {
            match &self.prefix {
                Some(prefix) => {
                    if let Some(rest) = key
                        .strip_prefix(prefix.as_str())
                        .and_then(|rest| rest.strip_prefix('_'))
                        && !rest.is_empty()
                    {
                        config.insert(rest.to_lowercase(), value);
                    }
                }
                None => {
                    config.insert(key.to_lowercase(), value);
                }
            }
        }

        config
    }

    /// Load matching variables as a settings tree
    pub fn load_tree(&self) -> Value {
        self.tree_from(env::vars())
    }

    /// Settings tree from arbitrary `(NAME, value)` pairs
    pub fn tree_from(&self, vars: impl IntoIterator<Item = (String, String)>) -> Value {
        let flat = self
            .filter(vars)
            .into_iter()
            .map(|(key, value)| (key, coerce(&value)))
            .collect();
        nest_keys(flat)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(crate::ENV_PREFIX.to_string()))
    }
}

/// Interpret a raw string as bool, integer, float or string
pub fn coerce(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Value::from(n);
    }
    if raw.contains('.')
        && let Ok(f) = raw.parse::<f64>()
        && let Some(n) = serde_json::Number::from_f64(f)
    {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

/// Turn flat keys into a sectioned tree.
///
/// `loadtest_url` becomes `loadtest.url`; keys without a known section
/// prefix land in the server section, so `port` becomes `server.port`.
pub fn nest_keys(flat: Map<String, Value>) -> Value {
    let mut root = Map::new();

    for (key, value) in flat {
        let (section, field) = split_section(&key);
        let entry = root
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(fields) = entry {
            fields.insert(field.to_string(), value);
        }
    }

    Value::Object(root)
}

fn split_section(key: &str) -> (&str, &str) {
    for section in SECTIONS {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            && !field.is_empty()
        {
            return (section, field);
        }
    }
    (DEFAULT_SECTION, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_filter_strips_prefix() {
        let loader = EnvLoader::new(Some("INSPECTOR".to_string()));
        let found = loader.filter(vars(&[
            ("INSPECTOR_PORT", "8082"),
            ("INSPECTORX_PORT", "1"),
            ("INSPECTOR_", "empty"),
            ("PATH", "/bin"),
        ]));

        assert_eq!(found.len(), 1);
        assert_eq!(found["port"], "8082");
    }

    #[test]
    fn test_filter_without_prefix_keeps_all() {
        let loader = EnvLoader::new(None);
        let found = loader.filter(vars(&[("A", "1"), ("B", "2")]));
        assert_eq!(found.len(), 2);
        assert_eq!(found["a"], "1");
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("true"), Value::Bool(true));
        assert_eq!(coerce("8081"), Value::from(8081));
        assert_eq!(coerce("2.5"), Value::from(2.5));
        assert_eq!(coerce("127.0.0.1"), Value::from("127.0.0.1"));
        assert_eq!(coerce("Rust-Inspector"), Value::from("Rust-Inspector"));
    }

    #[test]
    fn test_nest_keys() {
        let mut flat = Map::new();
        flat.insert("port".into(), Value::from(8082));
        flat.insert("server_host".into(), Value::from("::1"));
        flat.insert("loadtest_url".into(), Value::from("http://lb/"));
        flat.insert("log_format".into(), Value::from("json"));

        let tree = nest_keys(flat);
        assert_eq!(tree["server"]["port"], 8082);
        assert_eq!(tree["server"]["host"], "::1");
        assert_eq!(tree["loadtest"]["url"], "http://lb/");
        assert_eq!(tree["log"]["format"], "json");
    }

    #[test]
    fn test_tree_from_coerces_and_nests() {
        let loader = EnvLoader::new(Some("INSPECTOR".to_string()));
        let tree = loader.tree_from(vars(&[
            ("INSPECTOR_LOADTEST_CONCURRENCY", "50"),
            ("INSPECTOR_NAME", "Edge"),
            ("LOADTEST_URL", "http://elsewhere/"),
        ]));

        assert_eq!(tree["loadtest"]["concurrency"], 50);
        assert_eq!(tree["server"]["name"], "Edge");
        assert!(tree["loadtest"].get("url").is_none());
    }
}
