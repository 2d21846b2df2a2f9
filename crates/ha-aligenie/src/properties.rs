//! Readable device properties
//!
//! A property turns an entity snapshot into the string value the skill
//! expects, converting units where the platform and the skill disagree.

use ha_core::domains::{climate, fan, light, STATE_OFF, STATE_ON};
use ha_core::temperature::{self, TEMP_CELSIUS};
use ha_core::State;
use serde_json::Value;

use crate::error::{AligenieError, AligenieResult};
use crate::message::PropertyValue;

/// Wind speed tokens in skill order, index is the skill's speed level
pub(crate) const WIND_SPEEDS: [&str; 4] = [
    fan::SPEED_OFF,
    fan::SPEED_LOW,
    fan::SPEED_MEDIUM,
    fan::SPEED_HIGH,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    PowerState,
    Brightness,
    ColorTemperature,
    Color,
    Humidity,
    Temperature,
    Windspeed,
}

impl Property {
    /// Lowercase name used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Property::PowerState => "powerstate",
            Property::Brightness => "brightness",
            Property::ColorTemperature => "colortemperature",
            Property::Color => "color",
            Property::Humidity => "humidity",
            Property::Temperature => "temperature",
            Property::Windspeed => "windspeed",
        }
    }

    /// Read the value of `name` from an entity
    ///
    /// `name` must be this property's own name. `temperature_unit` is the unit
    /// the platform reports temperatures in.
    pub fn get_property(
        &self,
        name: &str,
        entity: &State,
        temperature_unit: &str,
    ) -> AligenieResult<Option<String>> {
        if name != self.name() {
            return Err(AligenieError::UnsupportedProperty(name.to_string()));
        }

        let value = match self {
            Property::PowerState => {
                let is_on = if entity.domain() == climate::DOMAIN {
                    entity.state != climate::HVAC_MODE_OFF
                } else {
                    entity.state != STATE_OFF
                };
                Some(if is_on { STATE_ON } else { STATE_OFF }.to_string())
            }
            Property::Brightness => {
                let pct = match present(entity, light::ATTR_BRIGHTNESS) {
                    Some(raw) => {
                        let raw = as_number(entity, light::ATTR_BRIGHTNESS, raw)?;
                        (raw / 255.0 * 100.0).round() as i64
                    }
                    None => 0,
                };
                Some(pct.to_string())
            }
            Property::ColorTemperature => Some(
                present(entity, light::ATTR_COLOR_TEMP)
                    .map(display)
                    .unwrap_or_else(|| "0".to_string()),
            ),
            Property::Color => present(entity, light::ATTR_COLOR_NAME).map(display),
            Property::Humidity => {
                let humidity = if entity.domain() == climate::DOMAIN {
                    present(entity, climate::ATTR_CURRENT_HUMIDITY).map(display)
                } else {
                    None
                };
                Some(humidity.unwrap_or_else(|| "0".to_string()))
            }
            Property::Temperature => {
                let current = if entity.domain() == climate::DOMAIN {
                    present(entity, climate::ATTR_CURRENT_TEMPERATURE)
                } else {
                    None
                };
                Some(match current {
                    Some(raw) => celsius(entity, raw, temperature_unit)?,
                    None => "0".to_string(),
                })
            }
            Property::Windspeed => {
                let key = match entity.domain() {
                    fan::DOMAIN => Some(fan::ATTR_SPEED),
                    climate::DOMAIN => Some(climate::ATTR_FAN_MODE),
                    _ => None,
                };
                let token = key.and_then(|k| entity.attributes.get(k)).and_then(Value::as_str);
                Some(speed_level(token).to_string())
            }
        };

        Ok(value)
    }

    /// Read this property into its wire form, `None` when it has no value
    pub fn serialize_property(
        &self,
        entity: &State,
        temperature_unit: &str,
    ) -> AligenieResult<Option<PropertyValue>> {
        let name = self.name();
        Ok(self
            .get_property(name, entity, temperature_unit)?
            .map(|value| PropertyValue::new(name, value)))
    }
}

/// Map a platform speed token to the skill's speed level
pub(crate) fn speed_level(token: Option<&str>) -> usize {
    token
        .and_then(|t| WIND_SPEEDS.iter().position(|s| *s == t))
        .unwrap_or(0)
}

/// Attribute value, treating an explicit null like an absent key
fn present<'a>(entity: &'a State, key: &str) -> Option<&'a Value> {
    entity.attributes.get(key).filter(|v| !v.is_null())
}

fn as_number(entity: &State, key: &str, value: &Value) -> AligenieResult<f64> {
    value.as_f64().ok_or_else(|| AligenieError::InvalidValue {
        field: format!("{}.{key}", entity.entity_id),
        value: value.to_string(),
    })
}

/// Plain string form: strings unquoted, numbers as the platform wrote them
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Current temperature in Celsius, one decimal unless it needed no conversion
fn celsius(entity: &State, raw: &Value, unit: &str) -> AligenieResult<String> {
    let value = as_number(entity, climate::ATTR_CURRENT_TEMPERATURE, raw)?;
    if (raw.is_i64() || raw.is_u64()) && unit == TEMP_CELSIUS {
        return Ok(display(raw));
    }
    let converted = temperature::convert(value, unit, TEMP_CELSIUS)?;
    Ok(format!("{converted:.1}"))
}
