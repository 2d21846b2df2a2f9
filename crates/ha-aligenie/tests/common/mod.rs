//! Test platform with captured service calls

#![allow(dead_code)]

use ha_aligenie::{HomeAssistant, HomeSkill, HomeSkillConfig, Response};
use ha_config::CoreConfig;
use ha_core::{Context, EntityId, ServiceCall, State};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Services the adapters may call
const SERVICES: &[(&str, &str)] = &[
    ("switch", "turn_on"),
    ("switch", "turn_off"),
    ("light", "turn_on"),
    ("light", "turn_off"),
    ("climate", "turn_on"),
    ("climate", "turn_off"),
    ("climate", "set_temperature"),
    ("climate", "set_humidity"),
    ("climate", "set_fan_mode"),
    ("fan", "turn_on"),
    ("fan", "turn_off"),
    ("fan", "set_speed"),
    ("fan", "oscillate"),
    ("vacuum", "start"),
    ("vacuum", "return_to_base"),
    ("media_player", "turn_on"),
    ("media_player", "turn_off"),
    ("media_player", "media_play"),
    ("media_player", "media_stop"),
];

/// A platform whose services only record their calls
pub struct TestHomeAssistant {
    pub hass: HomeAssistant,
    calls: Arc<Mutex<Vec<ServiceCall>>>,
}

impl TestHomeAssistant {
    pub fn new() -> Self {
        let hass = HomeAssistant::new(CoreConfig::default());
        let calls = Arc::new(Mutex::new(Vec::new()));
        for (domain, service) in SERVICES {
            let sink = calls.clone();
            hass.services.register(*domain, *service, move |call| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(call);
                    Ok(())
                }
            });
        }
        Self { hass, calls }
    }

    /// Set an entity's state from a JSON object of attributes
    pub fn set_state(&self, entity_id: &str, state: &str, attributes: Value) -> State {
        let entity_id: EntityId = entity_id.parse().expect("Invalid entity_id");
        let attributes: HashMap<String, Value> =
            serde_json::from_value(attributes).expect("Attributes must be an object");
        self.hass.states.set(entity_id, state, attributes, Context::new())
    }

    /// Service calls made so far, after pending ones have finished
    pub async fn service_calls(&self) -> Vec<ServiceCall> {
        self.hass.services.block_till_done().await;
        self.calls.lock().unwrap().clone()
    }

    /// Last service call made
    pub async fn last_call(&self) -> ServiceCall {
        self.service_calls()
            .await
            .pop()
            .expect("No service call was made")
    }

    pub async fn handle(&self, skill: &HomeSkill, message: Value) -> Response {
        skill
            .handle_message(&self.hass, &message, None)
            .await
            .expect("Request should be well formed")
    }
}

pub fn default_skill() -> HomeSkill {
    HomeSkill::new(HomeSkillConfig::default()).unwrap()
}

/// Build a request envelope
pub fn request(namespace: &str, name: &str, payload: Value) -> Value {
    json!({
        "header": {
            "namespace": namespace,
            "name": name,
            "messageId": uuid::Uuid::new_v4().to_string(),
            "payloadVersion": 1
        },
        "payload": payload
    })
}

pub fn discovery() -> Value {
    request("AliGenie.Iot.Device.Discovery", "DiscoveryDevices", json!({}))
}

pub fn control(name: &str, device_id: &str, value: Option<Value>) -> Value {
    let mut payload = json!({"deviceId": device_id});
    if let Some(value) = value {
        payload["value"] = value;
    }
    request("AliGenie.Iot.Device.Control", name, payload)
}

pub fn query(name: &str, device_id: &str) -> Value {
    request(
        "AliGenie.Iot.Device.Query",
        name,
        json!({"deviceId": device_id}),
    )
}

/// Serialized devices of a discovery response
pub fn devices(response: &Response) -> Vec<Value> {
    response.payload["devices"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

/// Value of a property in a query response
pub fn property(response: &Response, name: &str) -> Option<String> {
    response.property(name).map(str::to_string)
}
