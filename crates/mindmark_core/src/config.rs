//! Injected session configuration.
//!
//! # Responsibility
//! - Load process settings from JSON and environment overrides.
//! - Carry outline-service credentials without embedding them in code.
//!
//! # Invariants
//! - Missing fields fall back to defaults; unknown fields are rejected.
//! - The API key is never serialized and never printed by `Debug`.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_EXPORT_DIR: &str = "MINDMARK_EXPORT_DIR";
pub const ENV_LOG_LEVEL: &str = "MINDMARK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MINDMARK_LOG_DIR";
pub const ENV_API_KEY: &str = "MINDMARK_API_KEY";

pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Remote outline drafting service settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineServiceConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    pub model: String,
    /// Sampling temperature in `[0, 2]`.
    pub temperature: f32,
    /// Bearer credential; usually supplied through `MINDMARK_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for OutlineServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
        }
    }
}

impl Debug for OutlineServiceConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineServiceConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Process-level settings injected into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory receiving exported artifacts.
    pub export_dir: PathBuf,
    pub log_level: String,
    /// Absolute directory for rotating logs; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub outline_service: OutlineServiceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("."),
            log_level: default_log_level().to_string(),
            log_dir: None,
            outline_service: OutlineServiceConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(value)?)
    }

    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Applies `MINDMARK_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_EXPORT_DIR) {
            self.export_dir = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_API_KEY) {
            self.outline_service.api_key = Some(value.trim().to_string());
        }
    }

    /// Checks cross-field invariants before a session starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("export_dir cannot be empty".to_string()));
        }
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be absolute, got `{}`",
                    dir.display()
                )));
            }
        }
        let temperature = self.outline_service.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid(format!(
                "outline_service.temperature must be within [0, 2], got {temperature}"
            )));
        }
        if self.outline_service.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "outline_service.endpoint cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_API_KEY, ENV_EXPORT_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(r#"{"export_dir":"out"}"#).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("out"));
        assert_eq!(config.outline_service.model, "deepseek-chat");
        assert!(config.outline_service.api_key.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = AppConfig::from_json_str(r#"{"exprt_dir":"out"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_replace_values_and_skip_blanks() {
        let env = HashMap::from([
            (ENV_EXPORT_DIR, "/tmp/exports"),
            (ENV_LOG_LEVEL, "  "),
            (ENV_API_KEY, " sk-test "),
        ]);
        let mut config = AppConfig::default();
        let default_level = config.log_level.clone();
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.log_level, default_level);
        assert_eq!(config.outline_service.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn api_key_is_redacted_and_not_serialized() {
        let mut config = AppConfig::default();
        config.outline_service.api_key = Some("sk-secret".to_string());
        assert!(!format!("{config:?}").contains("sk-secret"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.log_dir = Some(PathBuf::from("relative/logs"));
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.outline_service.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.log_level = "chatty".to_string();
        assert!(config.validate().is_err());
    }
}
