//! The `homeassistant:` section
//!
//! Only the location name and the unit system are read. The unit system
//! decides which unit the platform reports temperatures in.

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{ConfigError, ConfigResult};

const TEMP_CELSIUS: &str = "°C";
const TEMP_FAHRENHEIT: &str = "°F";

/// A named unit system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn temperature_unit(self) -> &'static str {
        match self {
            UnitSystem::Metric => TEMP_CELSIUS,
            UnitSystem::Imperial => TEMP_FAHRENHEIT,
        }
    }
}

/// `unit_system:` as written, a system name or a mapping of units
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UnitSystemConfig {
    Named(UnitSystem),
    Custom { temperature: String },
}

impl Default for UnitSystemConfig {
    fn default() -> Self {
        UnitSystemConfig::Named(UnitSystem::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub unit_system: UnitSystemConfig,
}

fn default_name() -> String {
    "Home".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            unit_system: UnitSystemConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Parse the `homeassistant:` section, defaults when it is absent or empty
    pub fn from_yaml(root: &Value) -> ConfigResult<Self> {
        match section(root, "homeassistant")? {
            Some(core) if !core.is_null() => {
                serde_yaml::from_value(core.clone()).map_err(|e| ConfigError::InvalidValue {
                    key: "homeassistant".to_string(),
                    reason: e.to_string(),
                })
            }
            _ => Ok(Self::default()),
        }
    }

    /// Unit the platform reports temperatures in
    pub fn temperature_unit(&self) -> String {
        match &self.unit_system {
            UnitSystemConfig::Named(system) => system.temperature_unit().to_string(),
            UnitSystemConfig::Custom { temperature } => temperature.clone(),
        }
    }
}

/// Top-level section `name` of the root mapping
///
/// `Ok(None)` when the section is absent, an error when the root is not a
/// mapping.
pub fn section<'a>(root: &'a Value, name: &str) -> ConfigResult<Option<&'a Value>> {
    let mapping = root.as_mapping().ok_or_else(|| ConfigError::InvalidValue {
        key: "root".to_string(),
        reason: "configuration must be a mapping".to_string(),
    })?;
    Ok(mapping.get(name))
}
