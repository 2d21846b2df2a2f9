//! Domain metadata and constants
//!
//! Service names, attribute keys and supported-feature bits for the entity
//! domains the platform knows how to drive. Bit values match the platform's
//! `supported_features` attribute.

/// Service data key naming the target entity
pub const ATTR_ENTITY_ID: &str = "entity_id";

/// Attribute holding the human readable name of an entity
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";

/// Attribute holding the feature bitmask of an entity
pub const ATTR_SUPPORTED_FEATURES: &str = "supported_features";

/// Generic "on" service
pub const SERVICE_TURN_ON: &str = "turn_on";

/// Generic "off" service
pub const SERVICE_TURN_OFF: &str = "turn_off";

/// Generic "on" state
pub const STATE_ON: &str = "on";

/// Generic "off" state
pub const STATE_OFF: &str = "off";

/// Entities that must never be exposed to cloud/voice integrations
pub static CLOUD_NEVER_EXPOSED_ENTITIES: &[&str] = &["group.all_locks"];

/// Check if an entity may never be exposed to a cloud integration
pub fn is_never_exposed(entity_id: &str) -> bool {
    CLOUD_NEVER_EXPOSED_ENTITIES.contains(&entity_id)
}

/// Light domain
pub mod light {
    pub const DOMAIN: &str = "light";

    pub const SUPPORT_BRIGHTNESS: u64 = 1;
    pub const SUPPORT_COLOR_TEMP: u64 = 2;
    pub const SUPPORT_EFFECT: u64 = 4;
    pub const SUPPORT_FLASH: u64 = 8;
    pub const SUPPORT_COLOR: u64 = 16;
    pub const SUPPORT_TRANSITION: u64 = 32;

    /// Raw brightness, 0..=255
    pub const ATTR_BRIGHTNESS: &str = "brightness";
    /// Brightness in percent, 0..=100 (service data only)
    pub const ATTR_BRIGHTNESS_PCT: &str = "brightness_pct";
    /// Color temperature in mireds
    pub const ATTR_COLOR_TEMP: &str = "color_temp";
    pub const ATTR_COLOR_NAME: &str = "color_name";
}

/// Climate domain
pub mod climate {
    pub const DOMAIN: &str = "climate";

    pub const SUPPORT_TARGET_TEMPERATURE: u64 = 1;
    pub const SUPPORT_TARGET_TEMPERATURE_RANGE: u64 = 2;
    pub const SUPPORT_TARGET_HUMIDITY: u64 = 4;
    pub const SUPPORT_FAN_MODE: u64 = 8;
    pub const SUPPORT_PRESET_MODE: u64 = 16;
    pub const SUPPORT_SWING_MODE: u64 = 32;
    pub const SUPPORT_AUX_HEAT: u64 = 64;

    pub const HVAC_MODE_OFF: &str = "off";
    pub const HVAC_MODE_HEAT: &str = "heat";
    pub const HVAC_MODE_COOL: &str = "cool";
    pub const HVAC_MODE_HEAT_COOL: &str = "heat_cool";
    pub const HVAC_MODE_AUTO: &str = "auto";
    pub const HVAC_MODE_DRY: &str = "dry";
    pub const HVAC_MODE_FAN_ONLY: &str = "fan_only";

    pub const ATTR_CURRENT_TEMPERATURE: &str = "current_temperature";
    pub const ATTR_CURRENT_HUMIDITY: &str = "current_humidity";
    pub const ATTR_TEMPERATURE: &str = "temperature";
    pub const ATTR_HUMIDITY: &str = "humidity";
    pub const ATTR_MIN_TEMP: &str = "min_temp";
    pub const ATTR_MAX_TEMP: &str = "max_temp";
    pub const ATTR_MIN_HUMIDITY: &str = "min_humidity";
    pub const ATTR_MAX_HUMIDITY: &str = "max_humidity";
    pub const ATTR_FAN_MODE: &str = "fan_mode";
    pub const ATTR_HVAC_MODE: &str = "hvac_mode";

    /// Default bounds used when a device does not declare its own
    pub const DEFAULT_MIN_TEMP: i64 = 7;
    pub const DEFAULT_MAX_TEMP: i64 = 35;
    pub const DEFAULT_MIN_HUMIDITY: i64 = 30;
    pub const DEFAULT_MAX_HUMIDITY: i64 = 99;

    pub const SERVICE_SET_HUMIDITY: &str = "set_humidity";
    pub const SERVICE_SET_TEMPERATURE: &str = "set_temperature";
    pub const SERVICE_SET_HVAC_MODE: &str = "set_hvac_mode";
    pub const SERVICE_SET_FAN_MODE: &str = "set_fan_mode";
}

/// Fan domain
pub mod fan {
    pub const DOMAIN: &str = "fan";

    pub const SUPPORT_SET_SPEED: u64 = 1;
    pub const SUPPORT_OSCILLATE: u64 = 2;
    pub const SUPPORT_DIRECTION: u64 = 4;

    pub const ATTR_SPEED: &str = "speed";
    pub const ATTR_OSCILLATING: &str = "oscillating";

    pub const SPEED_OFF: &str = "off";
    pub const SPEED_LOW: &str = "low";
    pub const SPEED_MEDIUM: &str = "medium";
    pub const SPEED_HIGH: &str = "high";

    pub const SERVICE_SET_SPEED: &str = "set_speed";
    pub const SERVICE_OSCILLATE: &str = "oscillate";
}

/// Media player domain
pub mod media_player {
    pub const DOMAIN: &str = "media_player";

    pub const SUPPORT_PAUSE: u64 = 1;
    pub const SUPPORT_SEEK: u64 = 2;
    pub const SUPPORT_VOLUME_SET: u64 = 4;
    pub const SUPPORT_VOLUME_MUTE: u64 = 8;
    pub const SUPPORT_PREVIOUS_TRACK: u64 = 16;
    pub const SUPPORT_NEXT_TRACK: u64 = 32;
    pub const SUPPORT_TURN_ON: u64 = 128;
    pub const SUPPORT_TURN_OFF: u64 = 256;
    pub const SUPPORT_PLAY_MEDIA: u64 = 512;
    pub const SUPPORT_VOLUME_STEP: u64 = 1024;
    pub const SUPPORT_SELECT_SOURCE: u64 = 2048;
    pub const SUPPORT_STOP: u64 = 4096;
    pub const SUPPORT_PLAY: u64 = 16384;

    pub const SERVICE_MEDIA_PLAY: &str = "media_play";
    pub const SERVICE_MEDIA_PLAY_PAUSE: &str = "media_play_pause";
    pub const SERVICE_MEDIA_STOP: &str = "media_stop";
    pub const SERVICE_MEDIA_NEXT_TRACK: &str = "media_next_track";
    pub const SERVICE_MEDIA_PREVIOUS_TRACK: &str = "media_previous_track";
    pub const SERVICE_VOLUME_UP: &str = "volume_up";
    pub const SERVICE_VOLUME_DOWN: &str = "volume_down";
}

/// Switch domain
pub mod switch {
    pub const DOMAIN: &str = "switch";
}

/// Vacuum domain
pub mod vacuum {
    pub const DOMAIN: &str = "vacuum";

    pub const SERVICE_START: &str = "start";
    pub const SERVICE_RETURN_TO_BASE: &str = "return_to_base";
}
