//! YAML configuration
//!
//! Loads `configuration.yaml` from a config directory, resolving `!secret`
//! and `!env_var` tags, and parses the `homeassistant:` section.
//! Integrations read their own sections from the returned root value.
//!
//! ```ignore
//! let root = ha_config::load_yaml("/config", "configuration.yaml")?;
//! let core = ha_config::CoreConfig::from_yaml(&root)?;
//! ```

mod core_config;
mod error;
mod loader;

pub use core_config::{section, CoreConfig, UnitSystem, UnitSystemConfig};
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, YamlLoader, SECRETS_FILE};

pub use serde_yaml::Value;
