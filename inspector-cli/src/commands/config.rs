//! `inspector config`: print the effective settings

use crate::error::CliResult;
use inspector_config::Settings;

pub fn show(settings: &Settings, json: bool) -> CliResult<String> {
    if json {
        serde_json::to_string_pretty(settings)
            .map_err(|e| crate::error::CliError::Config(e.to_string()))
    } else {
        Ok(toml::to_string_pretty(settings)?)
    }
}
