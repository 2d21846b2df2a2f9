//! Home skill message handling

use ha_config::ConfigResult;
use ha_core::domains::is_never_exposed;
use ha_core::Context;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::config::HomeSkillConfig;
use crate::error::AligenieResult;
use crate::filter::EntityFilter;
use crate::handlers::HandlerRegistry;
use crate::message::{Directive, Response};
use crate::platform::Platform;

/// A configured home skill
pub struct HomeSkill {
    config: HomeSkillConfig,
    filter: EntityFilter,
    handlers: HandlerRegistry,
}

impl HomeSkill {
    /// Set up the skill with the default directive handlers
    pub fn new(config: HomeSkillConfig) -> ConfigResult<Self> {
        let filter = config.entity_filter()?;
        Ok(Self::with_handlers(
            config,
            filter,
            HandlerRegistry::with_defaults(),
        ))
    }

    pub fn with_handlers(
        config: HomeSkillConfig,
        filter: EntityFilter,
        handlers: HandlerRegistry,
    ) -> Self {
        Self {
            config,
            filter,
            handlers,
        }
    }

    pub fn config(&self) -> &HomeSkillConfig {
        &self.config
    }

    /// Whether an entity may be reported to the skill
    pub fn should_expose(&self, entity_id: &str) -> bool {
        !is_never_exposed(entity_id) && self.filter.matches(entity_id)
    }

    /// Handle one raw request
    ///
    /// Only a malformed envelope produces `Err`. Every failure after the
    /// directive has been parsed is turned into an error response.
    #[instrument(skip_all)]
    pub async fn handle_message(
        &self,
        platform: &dyn Platform,
        message: &Value,
        context: Option<Context>,
    ) -> AligenieResult<Response> {
        let context = context.unwrap_or_default();
        let mut directive = Directive::from_json(message)?;
        debug!(
            namespace = %directive.namespace,
            name = %directive.name,
            message_id = %directive.message_id,
            "Handling directive"
        );

        let result = match load(&mut directive, platform) {
            Ok(()) => {
                self.handlers
                    .dispatch(platform, self, &directive, context)
                    .await
            }
            Err(err) => Err(err),
        };

        Ok(match result {
            Ok(response) => response,
            Err(err) => {
                if err.error_code().is_none() {
                    error!(error = %err, "Failed to handle directive");
                }
                directive.error_for(&err)
            }
        })
    }
}

fn load(directive: &mut Directive, platform: &dyn Platform) -> AligenieResult<()> {
    if directive.has_device() {
        directive.load_entity(platform)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::EntityFilterConfig;
    use crate::platform::HomeAssistant;
    use ha_config::CoreConfig;
    use ha_core::EntityId;
    use serde_json::json;
    use std::collections::HashMap;

    fn message(namespace: &str, name: &str, payload: Value) -> Value {
        json!({
            "header": {
                "namespace": namespace,
                "name": name,
                "messageId": "5f8a426e-01e4-4cc9-8b79-65f8bd0fd8a4",
                "payloadVersion": 1
            },
            "payload": payload
        })
    }

    #[test]
    fn test_never_exposed_and_filtered() {
        let config = HomeSkillConfig {
            filter: EntityFilterConfig {
                exclude_entities: vec!["fan.fan1".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let skill = HomeSkill::new(config).unwrap();

        assert!(!skill.should_expose("group.all_locks"));
        assert!(!skill.should_expose("fan.fan1"));
        assert!(skill.should_expose("light.test"));
    }

    #[tokio::test]
    async fn test_protocol_error_is_returned() {
        let hass = HomeAssistant::new(CoreConfig::default());
        let skill = HomeSkill::new(HomeSkillConfig::default()).unwrap();

        let mut bad = message("AliGenie.Iot.Device.Query", "Query", json!({}));
        bad["header"]["payloadVersion"] = json!(3);
        assert!(skill.handle_message(&hass, &bad, None).await.is_err());
    }

    #[tokio::test]
    async fn test_query_without_device_is_service_error() {
        let hass = HomeAssistant::new(CoreConfig::default());
        let skill = HomeSkill::new(HomeSkillConfig::default()).unwrap();

        let response = skill
            .handle_message(&hass, &message("AliGenie.Iot.Device.Query", "Query", json!({})), None)
            .await
            .unwrap();
        assert_eq!(response.name(), "ErrorResponse");
        assert_eq!(response.payload["errorCode"], "SERVICE_ERROR");
        assert_eq!(response.payload["message"], "");
    }

    #[tokio::test]
    async fn test_unsupported_domain_is_service_error() {
        let hass = HomeAssistant::new(CoreConfig::default());
        hass.states.set(
            EntityId::new("sensor", "temp").unwrap(),
            "21",
            HashMap::new(),
            Context::new(),
        );
        let skill = HomeSkill::new(HomeSkillConfig::default()).unwrap();

        let response = skill
            .handle_message(
                &hass,
                &message("AliGenie.Iot.Device.Control", "TurnOn", json!({"deviceId": "sensor.temp"})),
                None,
            )
            .await
            .unwrap();
        assert_eq!(response.payload["errorCode"], "SERVICE_ERROR");
        assert_eq!(response.payload["deviceId"], "sensor.temp");
    }

    #[tokio::test]
    async fn test_null_device_does_not_exist() {
        let hass = HomeAssistant::new(CoreConfig::default());
        let skill = HomeSkill::new(HomeSkillConfig::default()).unwrap();

        let response = skill
            .handle_message(
                &hass,
                &message("AliGenie.Iot.Device.Query", "Query", json!({"deviceId": null})),
                None,
            )
            .await
            .unwrap();
        assert_eq!(response.payload["errorCode"], "DEVICE_IS_NOT_EXIST");
        assert_eq!(response.payload["deviceId"], Value::Null);
    }
}
