//! YAML configuration loader
//!
//! Supports two custom tags:
//! - `!secret key` - Substitute from secrets.yaml in the config directory
//! - `!env_var VAR [default]` - Environment variable substitution

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the secrets file looked up next to the configuration
pub const SECRETS_FILE: &str = "secrets.yaml";

/// YAML loader bound to one configuration directory
pub struct YamlLoader {
    config_dir: PathBuf,
    secrets: HashMap<String, String>,
}

impl YamlLoader {
    /// Create a loader, reading secrets.yaml if present
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let path = config_dir.join(SECRETS_FILE);

        let secrets = if path.exists() {
            let content = read(&path)?;
            let raw: HashMap<String, Value> =
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Yaml {
                    path: path.clone(),
                    source: e,
                })?;
            debug!("Loaded {} secrets from {:?}", raw.len(), path);
            raw.into_iter()
                .map(|(k, v)| (k, scalar_to_string(&v)))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            config_dir,
            secrets,
        })
    }

    /// Load and process a YAML file relative to the config directory
    pub fn load_file(&self, name: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.config_dir.join(name);
        debug!("Loading YAML file: {:?}", path);
        let content = read(&path)?;
        self.load_string(&content, &path)
    }

    /// Load and process YAML from a string
    pub fn load_string(&self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::Yaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;
        self.process_value(value)
    }

    fn process_value(&self, value: Value) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => {
                let tag = tagged.tag.to_string();
                match tag.as_str() {
                    "!secret" => self.process_secret(tagged.value),
                    "!env_var" => process_env_var(tagged.value),
                    _ => Err(ConfigError::InvalidValue {
                        key: tag,
                        reason: "unsupported tag".to_string(),
                    }),
                }
            }
            Value::Mapping(map) => {
                let mut result = serde_yaml::Mapping::new();
                for (k, v) in map {
                    result.insert(self.process_value(k)?, self.process_value(v)?);
                }
                Ok(Value::Mapping(result))
            }
            Value::Sequence(seq) => Ok(Value::Sequence(
                seq.into_iter()
                    .map(|v| self.process_value(v))
                    .collect::<ConfigResult<_>>()?,
            )),
            other => Ok(other),
        }
    }

    fn process_secret(&self, value: Value) -> ConfigResult<Value> {
        let key = value.as_str().ok_or_else(|| ConfigError::InvalidValue {
            key: "!secret".to_string(),
            reason: "secret key must be a string".to_string(),
        })?;

        self.secrets
            .get(key)
            .map(|s| Value::String(s.clone()))
            .ok_or_else(|| ConfigError::MissingSecret(key.to_string()))
    }
}

fn process_env_var(value: Value) -> ConfigResult<Value> {
    let spec = value.as_str().ok_or_else(|| ConfigError::InvalidValue {
        key: "!env_var".to_string(),
        reason: "variable name must be a string".to_string(),
    })?;

    let (var, default) = match spec.split_once(' ') {
        Some((var, default)) => (var, Some(default.trim())),
        None => (spec, None),
    };

    match (std::env::var(var), default) {
        (Ok(v), _) => Ok(Value::String(v)),
        (Err(_), Some(d)) => Ok(Value::String(d.to_string())),
        (Err(_), None) => Err(ConfigError::MissingEnvVar(var.to_string())),
    }
}

fn read(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

/// Load `name` from `config_dir`, applying secrets and env substitution
pub fn load_yaml(config_dir: impl Into<PathBuf>, name: &str) -> ConfigResult<Value> {
    YamlLoader::new(config_dir)?.load_file(name)
}
