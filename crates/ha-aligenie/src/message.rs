//! Directive and response messages
//!
//! Requests and responses share the same envelope:
//!
//! ```json
//! {
//!   "header": {"namespace": "...", "name": "...", "messageId": "...", "payloadVersion": 1},
//!   "payload": {"deviceId": "light.kitchen", ...},
//!   "properties": [{"name": "powerstate", "value": "on"}]
//! }
//! ```
//!
//! `properties` only appears in responses, and only once a property has been
//! merged into them.

use ha_core::State;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::constants::{
    API_DEVICE, API_HEADER, API_MESSAGE_ID, API_NAME, API_NAMESPACE, API_PAYLOAD,
    API_PAYLOAD_VERSION, ERROR_RESPONSE, ERROR_SERVICE, PAYLOAD_VERSION, RESPONSE_SUFFIX,
};
use crate::error::{AligenieError, AligenieResult};
use crate::platform::Platform;

/// Message header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub namespace: String,
    pub name: String,
    pub message_id: String,
    pub payload_version: u64,
}

/// One property value reported to the skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub name: String,
    pub value: String,
}

impl PropertyValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An inbound directive
#[derive(Debug, Clone)]
pub struct Directive {
    pub namespace: String,
    pub name: String,
    pub message_id: String,
    pub payload: Map<String, Value>,
    has_device: bool,
    entity_id: Option<String>,
    entity: Option<State>,
}

impl Directive {
    /// Parse a raw request
    ///
    /// Fails with [`AligenieError::Protocol`] when the envelope is malformed or
    /// uses another payload version.
    pub fn from_json(message: &Value) -> AligenieResult<Self> {
        let header = message
            .get(API_HEADER)
            .and_then(Value::as_object)
            .ok_or_else(|| protocol("missing header"))?;

        let version = header.get(API_PAYLOAD_VERSION).and_then(Value::as_u64);
        if version != Some(PAYLOAD_VERSION) {
            return Err(protocol(format!(
                "unsupported {API_PAYLOAD_VERSION} {}",
                header.get(API_PAYLOAD_VERSION).unwrap_or(&Value::Null)
            )));
        }

        let payload = message
            .get(API_PAYLOAD)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| protocol("missing payload"))?;

        Ok(Self {
            namespace: header_field(header, API_NAMESPACE)?,
            name: header_field(header, API_NAME)?,
            message_id: header_field(header, API_MESSAGE_ID)?,
            has_device: payload.contains_key(API_DEVICE),
            payload,
            entity_id: None,
            entity: None,
        })
    }

    /// Whether the payload names a device, even a null one
    pub fn has_device(&self) -> bool {
        self.has_device
    }

    /// Entity id, once [`load_entity`](Self::load_entity) has run
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Entity snapshot, once [`load_entity`](Self::load_entity) has succeeded
    pub fn entity(&self) -> Option<&State> {
        self.entity.as_ref()
    }

    /// Resolve the payload's device id to an entity snapshot
    pub fn load_entity(&mut self, platform: &dyn Platform) -> AligenieResult<&State> {
        let device = self.payload.get(API_DEVICE).unwrap_or(&Value::Null);
        self.entity_id = device.as_str().map(str::to_string);

        let entity = self.entity_id.as_deref().and_then(|id| platform.get_state(id));
        match entity {
            Some(state) => Ok(&*self.entity.insert(state)),
            None => Err(AligenieError::InvalidDevice(match device {
                Value::String(id) => id.clone(),
                other => other.to_string(),
            })),
        }
    }

    /// Build the success response, `{deviceId}` unless a payload is given
    pub fn response(&self, payload: Option<Map<String, Value>>) -> Response {
        let payload = payload.unwrap_or_else(|| self.device_payload());
        Response::new(
            format!("{}{RESPONSE_SUFFIX}", self.name),
            &self.namespace,
            &self.message_id,
            payload,
        )
    }

    /// Build an error response
    ///
    /// `errorCode`, `message` and `deviceId` are written over `payload`.
    pub fn error(
        &self,
        error_code: &str,
        message: &str,
        payload: Option<Map<String, Value>>,
    ) -> Response {
        let mut payload = payload.unwrap_or_default();
        payload.insert(API_DEVICE.to_string(), self.device_value());
        payload.insert("errorCode".to_string(), Value::from(error_code));
        payload.insert("message".to_string(), Value::from(message));

        info!(
            namespace = %self.namespace,
            name = %self.name,
            error_code,
            message,
            "Request failed"
        );

        Response::new(ERROR_RESPONSE, &self.namespace, &self.message_id, payload)
    }

    /// Build the error response reported for `err`
    ///
    /// Errors without a wire code become `SERVICE_ERROR` and their message is
    /// withheld from the skill.
    pub fn error_for(&self, err: &AligenieError) -> Response {
        match err.error_code() {
            Some(code) => self.error(code, &err.to_string(), None),
            None => self.error(ERROR_SERVICE, "", None),
        }
    }

    fn device_value(&self) -> Value {
        self.entity_id
            .as_deref()
            .map(Value::from)
            .unwrap_or(Value::Null)
    }

    fn device_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(API_DEVICE.to_string(), self.device_value());
        payload
    }
}

fn protocol(reason: impl Into<String>) -> AligenieError {
    AligenieError::Protocol(reason.into())
}

fn header_field(header: &Map<String, Value>, key: &str) -> AligenieResult<String> {
    header
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| protocol(format!("missing header field {key}")))
}

/// An outbound response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub header: Header,
    pub payload: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyValue>>,
}

impl Response {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        message_id: impl Into<String>,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            header: Header {
                namespace: namespace.into(),
                name: name.into(),
                message_id: message_id.into(),
                payload_version: PAYLOAD_VERSION,
            },
            payload,
            properties: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn namespace(&self) -> &str {
        &self.header.namespace
    }

    /// Append a property, even if one with the same name is present
    pub fn merge_property(&mut self, property: PropertyValue) {
        self.properties.get_or_insert_with(Vec::new).push(property);
    }

    /// Append the properties whose name is not present yet
    ///
    /// The first value seen for a name wins.
    pub fn merge_properties(&mut self, properties: impl IntoIterator<Item = PropertyValue>) {
        let merged = self.properties.get_or_insert_with(Vec::new);
        for property in properties {
            if !merged.iter().any(|p| p.name == property.name) {
                merged.push(property);
            }
        }
    }

    /// Property value by name
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Serialize to the wire representation
    pub fn serialize(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HomeAssistant;
    use ha_config::CoreConfig;
    use ha_core::{Context, EntityId};
    use serde_json::json;
    use std::collections::HashMap;

    fn request(name: &str, payload: Value) -> Value {
        json!({
            "header": {
                "namespace": "AliGenie.Iot.Device.Query",
                "name": name,
                "messageId": "msg-1",
                "payloadVersion": 1
            },
            "payload": payload
        })
    }

    #[test]
    fn test_parse() {
        let directive =
            Directive::from_json(&request("Query", json!({"deviceId": "light.test"}))).unwrap();
        assert_eq!(directive.namespace, "AliGenie.Iot.Device.Query");
        assert_eq!(directive.name, "Query");
        assert_eq!(directive.message_id, "msg-1");
        assert!(directive.has_device());
        assert_eq!(directive.entity_id(), None);
    }

    #[test]
    fn test_null_device_still_counts() {
        let directive = Directive::from_json(&request("Query", json!({"deviceId": null}))).unwrap();
        assert!(directive.has_device());

        let directive = Directive::from_json(&request("Query", json!({}))).unwrap();
        assert!(!directive.has_device());
    }

    #[test]
    fn test_protocol_errors() {
        let mut wrong_version = request("Query", json!({}));
        wrong_version["header"]["payloadVersion"] = json!(2);
        let mut no_payload = request("Query", json!({}));
        no_payload.as_object_mut().unwrap().remove("payload");
        let mut no_name = request("Query", json!({}));
        no_name["header"].as_object_mut().unwrap().remove("name");

        for message in [wrong_version, no_payload, no_name, json!("nope")] {
            assert!(matches!(
                Directive::from_json(&message),
                Err(AligenieError::Protocol(_))
            ));
        }
    }

    #[test]
    fn test_load_entity() {
        let hass = HomeAssistant::new(CoreConfig::default());
        hass.states.set(
            EntityId::new("light", "test").unwrap(),
            "on",
            HashMap::new(),
            Context::new(),
        );

        let mut directive =
            Directive::from_json(&request("Query", json!({"deviceId": "light.test"}))).unwrap();
        assert_eq!(directive.load_entity(&hass).unwrap().state, "on");
        assert_eq!(directive.entity().unwrap().entity_id.to_string(), "light.test");

        let mut missing =
            Directive::from_json(&request("Query", json!({"deviceId": "light.none"}))).unwrap();
        assert_eq!(
            missing.load_entity(&hass).unwrap_err(),
            AligenieError::InvalidDevice("light.none".into())
        );
        assert_eq!(missing.entity_id(), Some("light.none"));
    }

    #[test]
    fn test_response_defaults_to_device_payload() {
        let directive = Directive::from_json(&request("Query", json!({}))).unwrap();
        let response = directive.response(None);
        assert_eq!(
            response.serialize(),
            json!({
                "header": {
                    "namespace": "AliGenie.Iot.Device.Query",
                    "name": "QueryResponse",
                    "messageId": "msg-1",
                    "payloadVersion": 1
                },
                "payload": {"deviceId": null}
            })
        );
    }

    #[test]
    fn test_error_response() {
        let directive = Directive::from_json(&request("QueryColor", json!({}))).unwrap();

        let mut extra = Map::new();
        extra.insert("errorCode".into(), json!("overwritten"));
        extra.insert("retry".into(), json!(false));
        let response = directive.error("DEVICE_NOT_SUPPORT_FUNCTION", "function not support", Some(extra));

        assert_eq!(response.name(), "ErrorResponse");
        assert_eq!(response.namespace(), "AliGenie.Iot.Device.Query");
        assert_eq!(
            Value::Object(response.payload),
            json!({
                "deviceId": null,
                "errorCode": "DEVICE_NOT_SUPPORT_FUNCTION",
                "message": "function not support",
                "retry": false
            })
        );
    }

    #[test]
    fn test_error_for_hides_internal_messages() {
        let directive = Directive::from_json(&request("Query", json!({}))).unwrap();

        let coded = directive.error_for(&AligenieError::InvalidDevice("light.x".into()));
        assert_eq!(coded.payload["errorCode"], "DEVICE_IS_NOT_EXIST");
        assert_eq!(coded.payload["message"], "The device light.x does not exist");

        let internal = directive.error_for(&AligenieError::MissingField("value".into()));
        assert_eq!(internal.payload["errorCode"], "SERVICE_ERROR");
        assert_eq!(internal.payload["message"], "");
    }

    #[test]
    fn test_merge_properties_first_wins() {
        let mut response = Response::new("QueryResponse", "ns", "id", Map::new());
        assert!(response.properties.is_none());

        response.merge_properties(vec![
            PropertyValue::new("powerstate", "on"),
            PropertyValue::new("powerstate", "off"),
            PropertyValue::new("brightness", "50"),
        ]);
        response.merge_properties(vec![PropertyValue::new("brightness", "10")]);

        assert_eq!(
            response.properties.as_deref().unwrap(),
            &[
                PropertyValue::new("powerstate", "on"),
                PropertyValue::new("brightness", "50"),
            ]
        );
        assert_eq!(response.property("brightness"), Some("50"));
    }

    #[test]
    fn test_merge_property_appends() {
        let mut response = Response::new("QueryColorResponse", "ns", "id", Map::new());
        response.merge_property(PropertyValue::new("color", "red"));
        response.merge_property(PropertyValue::new("color", "blue"));
        assert_eq!(response.properties.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_empty_merge_still_emits_properties() {
        let mut response = Response::new("QueryResponse", "ns", "id", Map::new());
        response.merge_properties(Vec::new());
        assert_eq!(response.serialize()["properties"], json!([]));
    }
}
