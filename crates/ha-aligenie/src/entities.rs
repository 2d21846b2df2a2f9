//! Entity adapters
//!
//! An adapter describes one platform entity in skill terms: which operations
//! it accepts and which properties it reports, decided from its domain and
//! `supported_features` bits. Adapters are built per request from a state
//! snapshot and never outlive it.

use ha_core::domains::{climate, fan, light, media_player, switch, vacuum};
use ha_core::State;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::HomeSkillConfig;
use crate::constants::{DISCOVERY_BRAND, DISCOVERY_ICON, DISCOVERY_MODEL, DISCOVERY_ZONE};
use crate::error::{AligenieError, AligenieResult};
use crate::message::PropertyValue;
use crate::operations::Operation;
use crate::platform::Platform;
use crate::properties::Property;

/// An entity snapshot with the settings adapters need to describe it
#[derive(Debug, Clone)]
pub struct AdaptedEntity {
    pub state: State,
    /// Name from `entity_config`, preferred over the friendly name
    pub name: Option<String>,
    /// Unit the platform reports temperatures in
    pub temperature_unit: String,
}

impl AdaptedEntity {
    pub fn new(platform: &dyn Platform, config: &HomeSkillConfig, state: State) -> Self {
        let name = config
            .entity(&state.entity_id.to_string())
            .and_then(|c| c.name.clone());
        Self {
            state,
            name,
            temperature_unit: platform.temperature_unit(),
        }
    }
}

/// Device entry returned by discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub device_id: String,
    pub device_type: String,
    pub device_name: Option<String>,
    pub brand: String,
    pub model: String,
    pub zone: String,
    pub icon: String,
    pub actions: Vec<String>,
    pub properties: Vec<PropertyValue>,
}

/// Skill view of one platform entity
pub trait EntityAdapter: Send + Sync {
    fn entity(&self) -> &AdaptedEntity;

    /// Operations the entity accepts, recomputed on every call
    fn operations(&self) -> Vec<Operation>;

    /// Properties the entity reports, recomputed on every call
    fn properties(&self) -> Vec<Property>;

    fn device_type(&self) -> &str {
        self.entity().state.domain()
    }

    fn device_id(&self) -> String {
        self.entity().state.entity_id.to_string()
    }

    fn device_name(&self) -> Option<String> {
        let entity = self.entity();
        entity
            .name
            .clone()
            .or_else(|| entity.state.friendly_name().map(str::to_string))
    }

    /// Find an operation by its exact name
    fn get_operation(&self, name: &str) -> AligenieResult<Operation> {
        self.operations()
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or(AligenieError::UnsupportedFunction)
    }

    /// Serialize every property that currently has a value
    fn serialize_properties(&self) -> AligenieResult<Vec<PropertyValue>> {
        let entity = self.entity();
        let mut serialized = Vec::new();
        for property in self.properties() {
            if let Some(value) =
                property.serialize_property(&entity.state, &entity.temperature_unit)?
            {
                serialized.push(value);
            }
        }
        Ok(serialized)
    }

    /// Serialize one property by name
    fn serialize_property(&self, name: &str) -> AligenieResult<Option<PropertyValue>> {
        let entity = self.entity();
        let property = self
            .properties()
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or(AligenieError::UnsupportedFunction)?;
        property.serialize_property(&entity.state, &entity.temperature_unit)
    }

    fn serialize_discovery(&self) -> AligenieResult<DeviceDescriptor> {
        Ok(DeviceDescriptor {
            device_id: self.device_id(),
            device_type: self.device_type().to_string(),
            device_name: self.device_name(),
            brand: DISCOVERY_BRAND.to_string(),
            model: DISCOVERY_MODEL.to_string(),
            zone: DISCOVERY_ZONE.to_string(),
            icon: DISCOVERY_ICON.to_string(),
            actions: self
                .operations()
                .iter()
                .map(|op| op.name().to_string())
                .collect(),
            properties: self.serialize_properties()?,
        })
    }
}

pub struct LightAdapter(AdaptedEntity);

impl EntityAdapter for LightAdapter {
    fn entity(&self) -> &AdaptedEntity {
        &self.0
    }

    fn operations(&self) -> Vec<Operation> {
        let state = &self.0.state;
        let mut ops = vec![Operation::TurnOn, Operation::TurnOff];
        if state.supports(light::SUPPORT_BRIGHTNESS) {
            ops.extend([
                Operation::SetBrightness,
                Operation::AdjustUpBrightness,
                Operation::AdjustDownBrightness,
            ]);
        }
        if state.supports(light::SUPPORT_COLOR) {
            ops.push(Operation::SetColor);
        }
        if state.supports(light::SUPPORT_COLOR_TEMP) {
            ops.extend([
                Operation::SetColorTemperature,
                Operation::AdjustUpColorTemperature,
                Operation::AdjustDownColorTemperature,
            ]);
        }
        ops
    }

    fn properties(&self) -> Vec<Property> {
        let state = &self.0.state;
        let mut props = vec![Property::PowerState];
        if state.supports(light::SUPPORT_BRIGHTNESS) {
            props.push(Property::Brightness);
        }
        if state.supports(light::SUPPORT_COLOR) {
            props.push(Property::Color);
        }
        if state.supports(light::SUPPORT_COLOR_TEMP) {
            props.push(Property::ColorTemperature);
        }
        props
    }
}

pub struct ClimateAdapter(AdaptedEntity);

impl EntityAdapter for ClimateAdapter {
    fn entity(&self) -> &AdaptedEntity {
        &self.0
    }

    fn device_type(&self) -> &str {
        "aircondition"
    }

    fn operations(&self) -> Vec<Operation> {
        let state = &self.0.state;
        let mut ops = vec![Operation::TurnOn, Operation::TurnOff];
        if state.supports(climate::SUPPORT_TARGET_TEMPERATURE_RANGE) {
            ops.extend([
                Operation::SetTemperature,
                Operation::AdjustUpTemperature,
                Operation::AdjustDownTemperature,
            ]);
        }
        if state.supports(climate::SUPPORT_FAN_MODE) {
            ops.push(Operation::SetWindSpeed);
        }
        if state.supports(climate::SUPPORT_TARGET_HUMIDITY) {
            ops.extend([
                Operation::SetHumidity,
                Operation::AdjustUpHumidity,
                Operation::AdjustDownHumidity,
            ]);
        }
        ops
    }

    fn properties(&self) -> Vec<Property> {
        let state = &self.0.state;
        let mut props = vec![Property::PowerState];
        if state.supports(climate::SUPPORT_TARGET_TEMPERATURE_RANGE) {
            props.push(Property::Temperature);
        }
        if state.supports(climate::SUPPORT_FAN_MODE) {
            props.push(Property::Windspeed);
        }
        if state.supports(climate::SUPPORT_TARGET_HUMIDITY) {
            props.push(Property::Humidity);
        }
        props
    }
}

pub struct FanAdapter(AdaptedEntity);

impl EntityAdapter for FanAdapter {
    fn entity(&self) -> &AdaptedEntity {
        &self.0
    }

    fn operations(&self) -> Vec<Operation> {
        let state = &self.0.state;
        let mut ops = vec![Operation::TurnOn, Operation::TurnOff];
        if state.supports(fan::SUPPORT_SET_SPEED) {
            ops.push(Operation::SetWindSpeed);
        }
        if state.supports(fan::SUPPORT_OSCILLATE) {
            ops.extend([Operation::OpenSwing, Operation::CloseSwing]);
        }
        ops
    }

    fn properties(&self) -> Vec<Property> {
        let mut props = vec![Property::PowerState];
        if self.0.state.supports(fan::SUPPORT_SET_SPEED) {
            props.push(Property::Windspeed);
        }
        props
    }
}

pub struct SwitchAdapter(AdaptedEntity);

impl EntityAdapter for SwitchAdapter {
    fn entity(&self) -> &AdaptedEntity {
        &self.0
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::TurnOn, Operation::TurnOff]
    }

    fn properties(&self) -> Vec<Property> {
        vec![Property::PowerState]
    }
}

pub struct VacuumAdapter(AdaptedEntity);

impl EntityAdapter for VacuumAdapter {
    fn entity(&self) -> &AdaptedEntity {
        &self.0
    }

    fn device_type(&self) -> &str {
        "roboticvacuum"
    }

    fn operations(&self) -> Vec<Operation> {
        vec![Operation::TurnOn, Operation::TurnOff]
    }

    fn properties(&self) -> Vec<Property> {
        vec![Property::PowerState]
    }
}

pub struct MediaPlayerAdapter(AdaptedEntity);

impl EntityAdapter for MediaPlayerAdapter {
    fn entity(&self) -> &AdaptedEntity {
        &self.0
    }

    fn device_type(&self) -> &str {
        "television"
    }

    fn operations(&self) -> Vec<Operation> {
        let state = &self.0.state;
        let mut ops = vec![Operation::TurnOn, Operation::TurnOff];
        if state.supports(media_player::SUPPORT_PLAY) {
            ops.extend([
                Operation::Play,
                Operation::Pause,
                Operation::Next,
                Operation::Previous,
            ]);
        }
        if state.supports(media_player::SUPPORT_VOLUME_STEP) {
            ops.extend([Operation::AdjustUpVolume, Operation::AdjustDownVolume]);
        }
        ops
    }

    fn properties(&self) -> Vec<Property> {
        vec![Property::PowerState]
    }
}

/// Adapter constructor
pub type AdapterFactory = fn(AdaptedEntity) -> Box<dyn EntityAdapter>;

fn new_light(entity: AdaptedEntity) -> Box<dyn EntityAdapter> {
    Box::new(LightAdapter(entity))
}

fn new_climate(entity: AdaptedEntity) -> Box<dyn EntityAdapter> {
    Box::new(ClimateAdapter(entity))
}

fn new_fan(entity: AdaptedEntity) -> Box<dyn EntityAdapter> {
    Box::new(FanAdapter(entity))
}

fn new_switch(entity: AdaptedEntity) -> Box<dyn EntityAdapter> {
    Box::new(SwitchAdapter(entity))
}

fn new_vacuum(entity: AdaptedEntity) -> Box<dyn EntityAdapter> {
    Box::new(VacuumAdapter(entity))
}

fn new_media_player(entity: AdaptedEntity) -> Box<dyn EntityAdapter> {
    Box::new(MediaPlayerAdapter(entity))
}

/// Domains the skill can describe, with their adapter
pub static ENTITY_ADAPTERS: &[(&str, AdapterFactory)] = &[
    (light::DOMAIN, new_light),
    (climate::DOMAIN, new_climate),
    (fan::DOMAIN, new_fan),
    (switch::DOMAIN, new_switch),
    (vacuum::DOMAIN, new_vacuum),
    (media_player::DOMAIN, new_media_player),
];

/// Adapter constructor for a domain
pub fn adapter_factory(domain: &str) -> Option<AdapterFactory> {
    ENTITY_ADAPTERS
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, factory)| *factory)
}

/// Build the adapter for an entity
///
/// Fails with [`AligenieError::UnsupportedDomain`] for domains without one.
pub fn adapt(entity: AdaptedEntity) -> AligenieResult<Box<dyn EntityAdapter>> {
    let domain = entity.state.domain().to_string();
    let factory = adapter_factory(&domain).ok_or(AligenieError::UnsupportedDomain(domain))?;
    Ok(factory(entity))
}

/// Adapters for every entity that discovery should report
///
/// Entities are skipped when `expose` rejects them, when their domain has no
/// adapter, or when their adapter offers no operation.
pub fn discoverable_entities(
    platform: &dyn Platform,
    config: &HomeSkillConfig,
    expose: impl Fn(&str) -> bool,
) -> Vec<Box<dyn EntityAdapter>> {
    let mut adapters = Vec::new();
    for state in platform.all_states() {
        let entity_id = state.entity_id.to_string();
        let Some(factory) = adapter_factory(state.domain()) else {
            continue;
        };
        if !expose(&entity_id) {
            trace!(entity_id = %entity_id, "Entity not exposed");
            continue;
        }

        let adapter = factory(AdaptedEntity::new(platform, config, state));
        if adapter.operations().is_empty() {
            continue;
        }
        adapters.push(adapter);
    }
    adapters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntityConfig;
    use crate::platform::HomeAssistant;
    use ha_config::CoreConfig;
    use ha_core::{Context, EntityId};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn hass_with(entities: &[(&str, &str, Value)]) -> HomeAssistant {
        let hass = HomeAssistant::new(CoreConfig::default());
        for (entity_id, state, attributes) in entities {
            let attributes: HashMap<String, Value> =
                serde_json::from_value(attributes.clone()).unwrap();
            hass.states.set(
                entity_id.parse::<EntityId>().unwrap(),
                *state,
                attributes,
                Context::new(),
            );
        }
        hass
    }

    fn adapter(hass: &HomeAssistant, entity_id: &str) -> Box<dyn EntityAdapter> {
        let state = hass.get_state(entity_id).unwrap();
        adapt(AdaptedEntity::new(hass, &HomeSkillConfig::default(), state)).unwrap()
    }

    fn names(ops: Vec<Operation>) -> Vec<&'static str> {
        ops.iter().map(Operation::name).collect()
    }

    #[test]
    fn test_light_capabilities_follow_features() {
        let hass = hass_with(&[
            ("light.bare", "on", json!({})),
            ("light.full", "on", json!({"supported_features": 19})),
        ]);

        assert_eq!(names(adapter(&hass, "light.bare").operations()), ["TurnOn", "TurnOff"]);
        assert_eq!(
            names(adapter(&hass, "light.full").operations()),
            [
                "TurnOn",
                "TurnOff",
                "SetBrightness",
                "AdjustUpBrightness",
                "AdjustDownBrightness",
                "SetColor",
                "SetColorTemperature",
                "AdjustUpColorTemperature",
                "AdjustDownColorTemperature",
            ]
        );
        assert_eq!(
            adapter(&hass, "light.full").properties(),
            vec![
                Property::PowerState,
                Property::Brightness,
                Property::Color,
                Property::ColorTemperature,
            ]
        );
    }

    #[test]
    fn test_climate_capabilities() {
        let hass = hass_with(&[(
            "climate.cool",
            "cool",
            json!({"supported_features": 14, "friendly_name": "AC"}),
        )]);
        let climate = adapter(&hass, "climate.cool");

        assert_eq!(climate.device_type(), "aircondition");
        assert_eq!(climate.device_name().as_deref(), Some("AC"));
        assert_eq!(
            names(climate.operations()),
            [
                "TurnOn",
                "TurnOff",
                "SetTemperature",
                "AdjustUpTemperature",
                "AdjustDownTemperature",
                "SetWindSpeed",
                "SetHumidity",
                "AdjustUpHumidity",
                "AdjustDownHumidity",
            ]
        );
        assert!(climate.get_operation("SetMode").is_err());
    }

    #[test]
    fn test_fan_and_media_player_capabilities() {
        let hass = hass_with(&[
            ("fan.fan1", "on", json!({"supported_features": 3})),
            ("media_player.tv", "on", json!({"supported_features": 17408})),
            ("vacuum.robot", "docked", json!({})),
        ]);

        assert_eq!(
            names(adapter(&hass, "fan.fan1").operations()),
            ["TurnOn", "TurnOff", "SetWindSpeed", "OpenSwing", "CloseSwing"]
        );
        assert_eq!(
            adapter(&hass, "fan.fan1").properties(),
            vec![Property::PowerState, Property::Windspeed]
        );

        let tv = adapter(&hass, "media_player.tv");
        assert_eq!(tv.device_type(), "television");
        assert_eq!(
            names(tv.operations()),
            [
                "TurnOn",
                "TurnOff",
                "Play",
                "Pause",
                "Next",
                "Previous",
                "AdjustUpVolume",
                "AdjustDownVolume",
            ]
        );
        assert_eq!(tv.properties(), vec![Property::PowerState]);

        assert_eq!(adapter(&hass, "vacuum.robot").device_type(), "roboticvacuum");
    }

    #[test]
    fn test_get_operation_is_exact() {
        let hass = hass_with(&[("switch.test", "on", json!({}))]);
        let switch = adapter(&hass, "switch.test");
        assert_eq!(switch.get_operation("TurnOn").unwrap(), Operation::TurnOn);
        assert_eq!(
            switch.get_operation("turnon").unwrap_err(),
            AligenieError::UnsupportedFunction
        );
    }

    #[test]
    fn test_serialize_property_by_name() {
        let hass = hass_with(&[(
            "light.test",
            "off",
            json!({"supported_features": 1, "brightness": 127.5}),
        )]);
        let light = adapter(&hass, "light.test");
        assert_eq!(
            light.serialize_property("brightness").unwrap(),
            Some(PropertyValue::new("brightness", "50"))
        );
        assert_eq!(
            light.serialize_property("color").unwrap_err(),
            AligenieError::UnsupportedFunction
        );
    }

    #[test]
    fn test_switch_discovery_descriptor() {
        let hass = hass_with(&[("switch.test", "on", json!({"friendly_name": "Test switch"}))]);
        let descriptor = adapter(&hass, "switch.test").serialize_discovery().unwrap();

        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({
                "deviceId": "switch.test",
                "deviceType": "switch",
                "deviceName": "Test switch",
                "brand": "Home Assistant",
                "model": "test",
                "zone": "te",
                "icon": "https://home-assistant.io/images/favicon-192x192.png",
                "actions": ["TurnOn", "TurnOff"],
                "properties": [{"name": "powerstate", "value": "on"}]
            })
        );
    }

    #[test]
    fn test_discovery_is_repeatable() {
        let hass = hass_with(&[("light.test", "on", json!({"supported_features": 19, "color_temp": 27}))]);
        let light = adapter(&hass, "light.test");
        assert_eq!(
            light.serialize_discovery().unwrap(),
            light.serialize_discovery().unwrap()
        );
    }

    #[test]
    fn test_configured_name_overrides_friendly_name() {
        let hass = hass_with(&[("switch.test", "on", json!({"friendly_name": "Plug"}))]);
        let mut config = HomeSkillConfig::default();
        config.entity_config.insert(
            "switch.test".to_string(),
            EntityConfig {
                name: Some("Heater".to_string()),
            },
        );

        let state = hass.get_state("switch.test").unwrap();
        let switch = adapt(AdaptedEntity::new(&hass, &config, state)).unwrap();
        assert_eq!(switch.device_name().as_deref(), Some("Heater"));

        let unnamed = hass_with(&[("switch.unnamed", "on", json!({}))]);
        assert_eq!(adapter(&unnamed, "switch.unnamed").device_name(), None);
    }

    #[test]
    fn test_unsupported_domain() {
        let hass = hass_with(&[("sensor.temp", "21", json!({}))]);
        let state = hass.get_state("sensor.temp").unwrap();
        let err = adapt(AdaptedEntity::new(&hass, &HomeSkillConfig::default(), state))
            .err()
            .unwrap();
        assert_eq!(err, AligenieError::UnsupportedDomain("sensor".into()));
    }

    #[test]
    fn test_discoverable_entities() {
        let hass = hass_with(&[
            ("light.test", "on", json!({})),
            ("sensor.temp", "21", json!({})),
            ("switch.hidden", "on", json!({})),
        ]);

        let adapters = discoverable_entities(&hass, &HomeSkillConfig::default(), |id| {
            id != "switch.hidden"
        });
        let ids: Vec<String> = adapters.iter().map(|a| a.device_id()).collect();
        assert_eq!(ids, ["light.test"]);
    }
}
