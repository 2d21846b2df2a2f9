//! The platform as seen by the home skill
//!
//! Handlers only need three things from the platform: entity snapshots,
//! service invocation and the configured temperature unit. The [`Platform`]
//! trait captures exactly that, and [`HomeAssistant`] provides it on top of
//! the state machine and service registry.

use async_trait::async_trait;
use ha_config::CoreConfig;
use ha_core::{Context, State};
use ha_service_registry::{ServiceRegistry, ServiceResult};
use ha_state_machine::StateMachine;
use std::sync::Arc;

/// Platform operations consumed by the home skill
#[async_trait]
pub trait Platform: Send + Sync {
    /// Snapshot of one entity
    fn get_state(&self, entity_id: &str) -> Option<State>;

    /// Snapshot of every entity
    fn all_states(&self) -> Vec<State>;

    /// Unit the platform reports temperatures in
    fn temperature_unit(&self) -> String;

    /// Invoke a service
    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: serde_json::Value,
        context: Context,
        blocking: bool,
    ) -> ServiceResult;
}

/// Running platform instance
#[derive(Clone)]
pub struct HomeAssistant {
    pub states: Arc<StateMachine>,
    pub services: Arc<ServiceRegistry>,
    pub config: Arc<CoreConfig>,
}

impl HomeAssistant {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            states: Arc::new(StateMachine::new()),
            services: Arc::new(ServiceRegistry::new()),
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl Platform for HomeAssistant {
    fn get_state(&self, entity_id: &str) -> Option<State> {
        self.states.get(entity_id)
    }

    fn all_states(&self) -> Vec<State> {
        self.states.all()
    }

    fn temperature_unit(&self) -> String {
        self.config.temperature_unit()
    }

    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: serde_json::Value,
        context: Context,
        blocking: bool,
    ) -> ServiceResult {
        self.services
            .call(domain, service, data, context, blocking)
            .await
    }
}
