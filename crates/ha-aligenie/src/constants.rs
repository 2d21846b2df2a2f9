//! Wire-level names used by the AliGenie home skill protocol

use ha_core::domains::climate;

/// Integration domain, also the configuration section name
pub const DOMAIN: &str = "aligenie";

pub const CONF_HOME_SKILL: &str = "home_skill";

pub const API_HEADER: &str = "header";
pub const API_NAMESPACE: &str = "namespace";
pub const API_NAME: &str = "name";
pub const API_MESSAGE_ID: &str = "messageId";
pub const API_PAYLOAD_VERSION: &str = "payloadVersion";
pub const API_PAYLOAD: &str = "payload";
pub const API_DEVICE: &str = "deviceId";
pub const API_VALUE: &str = "value";

/// The only payload version this skill speaks
pub const PAYLOAD_VERSION: u64 = 1;

pub const NAMESPACE_DISCOVERY: &str = "AliGenie.Iot.Device.Discovery";
pub const NAMESPACE_CONTROL: &str = "AliGenie.Iot.Device.Control";
pub const NAMESPACE_QUERY: &str = "AliGenie.Iot.Device.Query";

pub const DIRECTIVE_DISCOVERY: &str = "DiscoveryDevices";
pub const DIRECTIVE_QUERY: &str = "Query";

pub const ERROR_RESPONSE: &str = "ErrorResponse";
pub const RESPONSE_SUFFIX: &str = "Response";

pub const ERROR_DEVICE_NOT_EXIST: &str = "DEVICE_IS_NOT_EXIST";
pub const ERROR_INVALID_DIRECTIVE: &str = "INVALIDATE_CONTROL_ORDER";
pub const ERROR_UNSUPPORTED_FUNCTION: &str = "DEVICE_NOT_SUPPORT_FUNCTION";
pub const ERROR_SERVICE: &str = "SERVICE_ERROR";

/// Fixed device descriptor fields reported during discovery
pub const DISCOVERY_BRAND: &str = "Home Assistant";
pub const DISCOVERY_MODEL: &str = "test";
pub const DISCOVERY_ZONE: &str = "te";
pub const DISCOVERY_ICON: &str = "https://home-assistant.io/images/favicon-192x192.png";

/// Thermostat modes understood by the skill, mapped to platform HVAC modes
pub static ALI_THERMOSTAT_MODES: &[(&str, &str)] = &[
    ("heat", climate::HVAC_MODE_HEAT),
    ("cool", climate::HVAC_MODE_COOL),
    ("auto", climate::HVAC_MODE_AUTO),
    ("off", climate::HVAC_MODE_OFF),
    ("dehumidification", climate::HVAC_MODE_DRY),
    ("airsupply", climate::HVAC_MODE_FAN_ONLY),
];

/// Look up the platform HVAC mode for a skill thermostat mode
pub fn thermostat_mode(ali_mode: &str) -> Option<&'static str> {
    ALI_THERMOSTAT_MODES
        .iter()
        .find(|(ali, _)| *ali == ali_mode)
        .map(|(_, ha)| *ha)
}
