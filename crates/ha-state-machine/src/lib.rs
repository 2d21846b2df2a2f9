//! In-memory entity state store
//!
//! Readers always get owned snapshots: a [`State`] returned by
//! [`StateMachine::get`] or [`StateMachine::all`] never changes after the
//! fact, so a directive sees one consistent view of its entity.

use dashmap::DashMap;
use ha_core::{Context, EntityId, State};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Current state of every entity, keyed by entity id
#[derive(Default)]
pub struct StateMachine {
    states: DashMap<String, State>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an entity's state and attributes
    ///
    /// Replaces the attributes wholesale. `last_changed` only moves when the
    /// state string changes.
    #[instrument(skip(self, state, attributes, context), fields(entity_id = %entity_id))]
    pub fn set(
        &self,
        entity_id: EntityId,
        state: impl Into<String>,
        attributes: HashMap<String, serde_json::Value>,
        context: Context,
    ) -> State {
        let key = entity_id.to_string();
        let new_state = match self.get(&key) {
            Some(existing) => existing.with_update(state, attributes, context),
            None => State::new(entity_id, state, attributes, context),
        };
        debug!(state = %new_state.state, "Setting entity state");

        self.states.insert(key, new_state.clone());
        new_state
    }

    pub fn get(&self, entity_id: &str) -> Option<State> {
        self.states.get(entity_id).map(|s| s.clone())
    }

    /// Every state, ordered by entity id
    pub fn all(&self) -> Vec<State> {
        let mut states: Vec<State> = self.states.iter().map(|r| r.value().clone()).collect();
        states.sort_by_cached_key(|s| s.entity_id.to_string());
        states
    }
}
