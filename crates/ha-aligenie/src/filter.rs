//! Entity filter controlling which entities are exposed to the skill
//!
//! Mirrors the platform's include/exclude filter: domains, explicit entity
//! ids, and entity id globs (`*` and `?`), evaluated in six cases depending on
//! which lists are populated.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{AligenieError, AligenieResult};

/// Raw filter configuration as it appears in YAML
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntityFilterConfig {
    #[serde(default)]
    pub include_domains: Vec<String>,
    #[serde(default)]
    pub include_entities: Vec<String>,
    #[serde(default)]
    pub include_entity_globs: Vec<String>,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    #[serde(default)]
    pub exclude_entities: Vec<String>,
    #[serde(default)]
    pub exclude_entity_globs: Vec<String>,
}

/// Compiled entity filter
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    include_domains: HashSet<String>,
    include_entities: HashSet<String>,
    include_globs: Vec<Regex>,
    exclude_domains: HashSet<String>,
    exclude_entities: HashSet<String>,
    exclude_globs: Vec<Regex>,
}

impl EntityFilter {
    /// Filter accepting every entity
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Compile a filter from its configuration
    pub fn new(config: &EntityFilterConfig) -> AligenieResult<Self> {
        Ok(Self {
            include_domains: config.include_domains.iter().cloned().collect(),
            include_entities: config.include_entities.iter().cloned().collect(),
            include_globs: compile_globs(&config.include_entity_globs)?,
            exclude_domains: config.exclude_domains.iter().cloned().collect(),
            exclude_entities: config.exclude_entities.iter().cloned().collect(),
            exclude_globs: compile_globs(&config.exclude_entity_globs)?,
        })
    }

    /// True when no rule is configured
    pub fn is_empty(&self) -> bool {
        !self.has_include() && !self.has_exclude()
    }

    fn has_include(&self) -> bool {
        !self.include_domains.is_empty()
            || !self.include_entities.is_empty()
            || !self.include_globs.is_empty()
    }

    fn has_exclude(&self) -> bool {
        !self.exclude_domains.is_empty()
            || !self.exclude_entities.is_empty()
            || !self.exclude_globs.is_empty()
    }

    /// Decide whether an entity is exposed
    pub fn matches(&self, entity_id: &str) -> bool {
        let domain = entity_id.split('.').next().unwrap_or_default();

        let included = || {
            self.include_entities.contains(entity_id)
                || self.include_domains.contains(domain)
                || glob_match(&self.include_globs, entity_id)
        };
        let excluded = || {
            self.exclude_entities.contains(entity_id)
                || self.exclude_domains.contains(domain)
                || glob_match(&self.exclude_globs, entity_id)
        };

        match (self.has_include(), self.has_exclude()) {
            (false, false) => true,
            (true, false) => included(),
            (false, true) => !excluded(),
            (true, true) => {
                if !self.include_domains.is_empty() || !self.include_globs.is_empty() {
                    self.include_entities.contains(entity_id)
                        || (!self.exclude_entities.contains(entity_id)
                            && !glob_match(&self.exclude_globs, entity_id)
                            && (self.include_domains.contains(domain)
                                || glob_match(&self.include_globs, entity_id)))
                } else if !self.exclude_domains.is_empty() || !self.exclude_globs.is_empty() {
                    self.include_entities.contains(entity_id) || !excluded()
                } else {
                    self.include_entities.contains(entity_id)
                }
            }
        }
    }
}

fn glob_match(globs: &[Regex], entity_id: &str) -> bool {
    globs.iter().any(|re| re.is_match(entity_id))
}

fn compile_globs(globs: &[String]) -> AligenieResult<Vec<Regex>> {
    globs.iter().map(|g| compile_glob(g)).collect()
}

fn compile_glob(glob: &str) -> AligenieResult<Regex> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');

    Regex::new(&pattern).map_err(|e| AligenieError::InvalidValue {
        field: "entity_globs".to_string(),
        value: format!("{glob}: {e}"),
    })
}
