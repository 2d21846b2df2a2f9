//! Configuration of the `aligenie.home_skill` section
//!
//! ```yaml
//! aligenie:
//!   home_skill:
//!     skill_id: !secret aligenie_skill_id
//!     filter:
//!       exclude_domains: [sensor]
//!     entity_config:
//!       light.kitchen:
//!         name: Kitchen
//! ```

use ha_config::{section, ConfigError, ConfigResult, Value};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::constants::{CONF_HOME_SKILL, DOMAIN};
use crate::filter::{EntityFilter, EntityFilterConfig};

/// Per-entity overrides
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EntityConfig {
    /// Name reported to the skill instead of the friendly name
    #[serde(default)]
    pub name: Option<String>,
}

/// Home skill configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct HomeSkillConfig {
    #[serde(default)]
    pub baichuan_key: Option<String>,

    #[serde(default)]
    pub baichuan_secret: Option<String>,

    #[serde(default)]
    pub skill_id: Option<String>,

    #[serde(default)]
    pub filter: EntityFilterConfig,

    #[serde(default)]
    pub entity_config: HashMap<String, EntityConfig>,
}

impl HomeSkillConfig {
    /// Read the home skill section from the root configuration
    ///
    /// Returns `Ok(None)` when the integration is not configured. A present but
    /// empty `home_skill:` key yields the defaults.
    pub fn from_yaml(root: &Value) -> ConfigResult<Option<Self>> {
        let Some(aligenie) = section(root, DOMAIN)? else {
            return Ok(None);
        };
        let Some(home_skill) = aligenie.get(CONF_HOME_SKILL) else {
            return Ok(None);
        };

        if home_skill.is_null() {
            debug!("Empty home_skill section, using defaults");
            return Ok(Some(Self::default()));
        }

        serde_yaml::from_value(home_skill.clone())
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: format!("{DOMAIN}.{CONF_HOME_SKILL}"),
                reason: e.to_string(),
            })
    }

    /// Compile the configured entity filter
    pub fn entity_filter(&self) -> ConfigResult<EntityFilter> {
        EntityFilter::new(&self.filter).map_err(|e| ConfigError::InvalidValue {
            key: format!("{DOMAIN}.{CONF_HOME_SKILL}.filter"),
            reason: e.to_string(),
        })
    }

    /// Overrides configured for one entity
    pub fn entity(&self, entity_id: &str) -> Option<&EntityConfig> {
        self.entity_config.get(entity_id)
    }
}
