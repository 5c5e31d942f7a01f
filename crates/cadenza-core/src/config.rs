// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration for the yield layer and its ambient services.
//!
//! Settings are plain serde structures. Every field has a default, so a
//! partial (or empty) JSON document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Settings applied to a [`ScaledClock`](crate::clock::ScaledClock).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Rate of game time relative to its source clock.
    pub time_scale: f64,
    /// Whether game time starts frozen.
    pub paused: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            paused: false,
        }
    }
}

/// Settings for log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set (e.g. `"info"` or `"cadenza_yield=trace"`).
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenzaConfig {
    /// Game clock settings.
    pub clock: ClockConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl CadenzaConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source_error: e.to_string(),
        })?;
        log::debug!("Loaded configuration from '{}'", path.display());
        Self::from_json_str(&contents)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.clock.time_scale;
        if !scale.is_finite() || scale < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "clock.time_scale",
                reason: format!("must be a finite, non-negative number (got {scale})"),
            });
        }
        if self.logging.default_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.default_filter",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// An error raised while loading configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io {
        /// The path that failed to load.
        path: String,
        /// The underlying I/O error.
        source_error: String,
    },
    /// The document is not valid JSON for this schema.
    Parse(String),
    /// A field holds a value outside its accepted range.
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source_error } => {
                write!(f, "Failed to read configuration from '{path}': {source_error}")
            }
            ConfigError::Parse(details) => write!(f, "Invalid configuration: {details}"),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CadenzaConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CadenzaConfig::default());
        assert_eq!(config.clock.time_scale, 1.0);
        assert_eq!(config.logging.default_filter, "info");
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = CadenzaConfig::from_json_str(r#"{ "clock": { "paused": true } }"#).unwrap();
        assert!(config.clock.paused);
        assert_eq!(config.clock.time_scale, 1.0);
    }

    #[test]
    fn negative_time_scale_is_rejected() {
        let err = CadenzaConfig::from_json_str(r#"{ "clock": { "time_scale": -1.0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "clock.time_scale",
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = CadenzaConfig::from_json_str("{ clock: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "clock": {{ "time_scale": 0.25 }}, "logging": {{ "default_filter": "debug" }} }}"#
        )
        .unwrap();

        let config = CadenzaConfig::from_path(file.path()).unwrap();
        assert_eq!(config.clock.time_scale, 0.25);
        assert_eq!(config.logging.default_filter, "debug");
    }

    #[test]
    fn invalid_file_is_rejected_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "clock": {{ "time_scale": -4.0 }} }}"#).unwrap();

        let err = CadenzaConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(CadenzaConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = CadenzaConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
