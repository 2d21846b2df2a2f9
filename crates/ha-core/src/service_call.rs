//! Service call type for invoking platform services

use crate::domains::ATTR_ENTITY_ID;
use crate::Context;
use serde::{Deserialize, Serialize};

/// Represents a call to a platform service
///
/// Each service belongs to a domain and receives a JSON object of service
/// data, usually including the target `entity_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    /// The domain the service belongs to (e.g., "light", "climate")
    pub domain: String,

    /// The service name (e.g., "turn_on", "set_temperature")
    pub service: String,

    /// Data passed to the service (e.g., entity_id, brightness_pct)
    pub service_data: serde_json::Value,

    /// Context tracking who initiated this call
    pub context: Context,
}

impl ServiceCall {
    /// Create a new service call
    pub fn new(
        domain: impl Into<String>,
        service: impl Into<String>,
        service_data: serde_json::Value,
        context: Context,
    ) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            service_data,
            context,
        }
    }

    /// Get the full service identifier (domain.service)
    pub fn service_id(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }

    /// Get the target entity id, if the call names exactly one
    pub fn entity_id(&self) -> Option<&str> {
        self.service_data
            .get(ATTR_ENTITY_ID)
            .and_then(|v| v.as_str())
    }
}
