//! Executable device operations
//!
//! Every operation turns one control directive into exactly one service call.
//! Operations only act on the domain they were written for; invoked on
//! another domain they fall back to a plain `turn_on` or `turn_off`.

use ha_core::domains::{
    climate, fan, light, media_player, vacuum, ATTR_ENTITY_ID, SERVICE_TURN_OFF, SERVICE_TURN_ON,
};
use ha_core::{Context, State};
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::{thermostat_mode, API_VALUE};
use crate::error::{AligenieError, AligenieResult};
use crate::platform::Platform;
use crate::properties::WIND_SPEEDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    TurnOn,
    TurnOff,
    SelectChannel,
    Play,
    Pause,
    Next,
    Previous,
    AdjustUpVolume,
    AdjustDownVolume,
    SetBrightness,
    AdjustUpBrightness,
    AdjustDownBrightness,
    SetColorTemperature,
    AdjustUpColorTemperature,
    AdjustDownColorTemperature,
    SetColor,
    SetHumidity,
    AdjustUpHumidity,
    AdjustDownHumidity,
    SetTemperature,
    AdjustUpTemperature,
    AdjustDownTemperature,
    SetMode,
    SetWindSpeed,
    OpenSwing,
    CloseSwing,
}

/// A resolved service call
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub domain: String,
    pub service: &'static str,
    pub data: Map<String, Value>,
}

impl Operation {
    /// Directive name of this operation
    pub fn name(&self) -> &'static str {
        match self {
            Operation::TurnOn => "TurnOn",
            Operation::TurnOff => "TurnOff",
            Operation::SelectChannel => "SelectChannel",
            Operation::Play => "Play",
            Operation::Pause => "Pause",
            Operation::Next => "Next",
            Operation::Previous => "Previous",
            Operation::AdjustUpVolume => "AdjustUpVolume",
            Operation::AdjustDownVolume => "AdjustDownVolume",
            Operation::SetBrightness => "SetBrightness",
            Operation::AdjustUpBrightness => "AdjustUpBrightness",
            Operation::AdjustDownBrightness => "AdjustDownBrightness",
            Operation::SetColorTemperature => "SetColorTemperature",
            Operation::AdjustUpColorTemperature => "AdjustUpColorTemperature",
            Operation::AdjustDownColorTemperature => "AdjustDownColorTemperature",
            Operation::SetColor => "SetColor",
            Operation::SetHumidity => "SetHumidity",
            Operation::AdjustUpHumidity => "AdjustUpHumidity",
            Operation::AdjustDownHumidity => "AdjustDownHumidity",
            Operation::SetTemperature => "SetTemperature",
            Operation::AdjustUpTemperature => "AdjustUpTemperature",
            Operation::AdjustDownTemperature => "AdjustDownTemperature",
            Operation::SetMode => "SetMode",
            Operation::SetWindSpeed => "SetWindSpeed",
            Operation::OpenSwing => "OpenSwing",
            Operation::CloseSwing => "CloseSwing",
        }
    }

    /// Resolve the service call for `entity`
    ///
    /// Values are read from the payload's `value` field.
    pub fn plan(
        &self,
        entity: &State,
        payload: &Map<String, Value>,
    ) -> AligenieResult<ServiceRequest> {
        let domain = entity.domain();
        let mut data = Map::new();
        data.insert(
            ATTR_ENTITY_ID.to_string(),
            Value::String(entity.entity_id.to_string()),
        );

        let service = match self {
            Operation::TurnOn => match domain {
                media_player::DOMAIN if !has_power_control(entity) => {
                    media_player::SERVICE_MEDIA_PLAY
                }
                vacuum::DOMAIN => vacuum::SERVICE_START,
                _ => SERVICE_TURN_ON,
            },
            Operation::TurnOff => match domain {
                media_player::DOMAIN if !has_power_control(entity) => {
                    media_player::SERVICE_MEDIA_STOP
                }
                vacuum::DOMAIN => vacuum::SERVICE_RETURN_TO_BASE,
                _ => SERVICE_TURN_OFF,
            },
            Operation::SelectChannel => return Err(AligenieError::UnsupportedFunction),

            Operation::Play
            | Operation::Pause
            | Operation::Next
            | Operation::Previous
            | Operation::AdjustUpVolume
            | Operation::AdjustDownVolume => {
                if domain == media_player::DOMAIN {
                    self.media_service()
                } else {
                    SERVICE_TURN_OFF
                }
            }

            Operation::SetBrightness if domain == light::DOMAIN => {
                let pct = match value(payload)? {
                    v if v == "max" => 100,
                    v if v == "min" => 1,
                    v => int_value(v)?,
                };
                data.insert(light::ATTR_BRIGHTNESS_PCT.to_string(), Value::from(pct));
                SERVICE_TURN_ON
            }
            Operation::AdjustUpBrightness if domain == light::DOMAIN => {
                let target = brightness_pct(entity)?
                    .offset(int_value(value(payload)?)?)
                    .min(Numeric::Int(100));
                data.insert(light::ATTR_BRIGHTNESS_PCT.to_string(), target.into());
                SERVICE_TURN_ON
            }
            Operation::AdjustDownBrightness if domain == light::DOMAIN => {
                let target = brightness_pct(entity)?
                    .lower(int_value(value(payload)?)?)
                    .max(Numeric::Int(0));
                data.insert(light::ATTR_BRIGHTNESS_PCT.to_string(), target.into());
                SERVICE_TURN_ON
            }
            Operation::SetColorTemperature if domain == light::DOMAIN => {
                let color_temp = int_value(value(payload)?)?;
                data.insert(light::ATTR_COLOR_TEMP.to_string(), Value::from(color_temp));
                SERVICE_TURN_ON
            }
            Operation::AdjustUpColorTemperature if domain == light::DOMAIN => {
                let target = Numeric::attribute(entity, light::ATTR_COLOR_TEMP)?
                    .offset(int_value(value(payload)?)?);
                data.insert(light::ATTR_COLOR_TEMP.to_string(), target.into());
                SERVICE_TURN_ON
            }
            Operation::AdjustDownColorTemperature if domain == light::DOMAIN => {
                let target = Numeric::attribute(entity, light::ATTR_COLOR_TEMP)?
                    .lower(int_value(value(payload)?)?)
                    .max(Numeric::Int(1));
                data.insert(light::ATTR_COLOR_TEMP.to_string(), target.into());
                SERVICE_TURN_ON
            }
            Operation::SetColor if domain == light::DOMAIN => {
                data.insert(light::ATTR_COLOR_NAME.to_string(), value(payload)?.clone());
                SERVICE_TURN_ON
            }
            Operation::SetBrightness
            | Operation::AdjustUpBrightness
            | Operation::AdjustDownBrightness
            | Operation::SetColorTemperature
            | Operation::AdjustUpColorTemperature
            | Operation::AdjustDownColorTemperature
            | Operation::SetColor => SERVICE_TURN_ON,

            Operation::SetHumidity if domain == climate::DOMAIN => {
                let humidity = bounded_value(
                    payload,
                    climate::DEFAULT_MAX_HUMIDITY,
                    climate::DEFAULT_MIN_HUMIDITY,
                )?;
                data.insert(climate::ATTR_HUMIDITY.to_string(), Value::from(humidity));
                climate::SERVICE_SET_HUMIDITY
            }
            Operation::AdjustUpHumidity if domain == climate::DOMAIN => {
                let target = Numeric::attribute(entity, climate::ATTR_HUMIDITY)?
                    .offset(int_value(value(payload)?)?)
                    .min(Numeric::attribute(entity, climate::ATTR_MAX_HUMIDITY)?);
                data.insert(climate::ATTR_HUMIDITY.to_string(), target.into());
                climate::SERVICE_SET_HUMIDITY
            }
            // The lower bound is applied with `min`, so a step that stays above
            // the minimum still lands on the minimum. Kept as deployed.
            Operation::AdjustDownHumidity if domain == climate::DOMAIN => {
                let target = Numeric::attribute(entity, climate::ATTR_HUMIDITY)?
                    .lower(int_value(value(payload)?)?)
                    .min(Numeric::attribute(entity, climate::ATTR_MIN_HUMIDITY)?);
                data.insert(climate::ATTR_HUMIDITY.to_string(), target.into());
                climate::SERVICE_SET_HUMIDITY
            }
            Operation::SetTemperature if domain == climate::DOMAIN => {
                let temperature = bounded_value(
                    payload,
                    climate::DEFAULT_MAX_TEMP,
                    climate::DEFAULT_MIN_TEMP,
                )?;
                data.insert(climate::ATTR_TEMPERATURE.to_string(), Value::from(temperature));
                climate::SERVICE_SET_TEMPERATURE
            }
            Operation::AdjustUpTemperature if domain == climate::DOMAIN => {
                let target = Numeric::attribute(entity, climate::ATTR_TEMPERATURE)?
                    .offset(int_value(value(payload)?)?)
                    .min(Numeric::attribute(entity, climate::ATTR_MAX_TEMP)?);
                data.insert(climate::ATTR_TEMPERATURE.to_string(), target.into());
                climate::SERVICE_SET_TEMPERATURE
            }
            // Same `min` bound as AdjustDownHumidity.
            Operation::AdjustDownTemperature if domain == climate::DOMAIN => {
                let target = Numeric::attribute(entity, climate::ATTR_TEMPERATURE)?
                    .lower(int_value(value(payload)?)?)
                    .min(Numeric::attribute(entity, climate::ATTR_MIN_TEMP)?);
                data.insert(climate::ATTR_TEMPERATURE.to_string(), target.into());
                climate::SERVICE_SET_TEMPERATURE
            }
            Operation::SetMode if domain == climate::DOMAIN => {
                let mode = value(payload)?
                    .as_str()
                    .and_then(thermostat_mode)
                    .ok_or(AligenieError::UnsupportedFunction)?;
                data.insert(climate::ATTR_HVAC_MODE.to_string(), Value::from(mode));
                climate::SERVICE_SET_HVAC_MODE
            }
            Operation::SetWindSpeed if domain == climate::DOMAIN => {
                data.insert(climate::ATTR_FAN_MODE.to_string(), value(payload)?.clone());
                climate::SERVICE_SET_FAN_MODE
            }
            Operation::SetWindSpeed if domain == fan::DOMAIN => {
                let level = value(payload)?;
                let speed = usize::try_from(int_value(level)?)
                    .ok()
                    .and_then(|i| WIND_SPEEDS.get(i))
                    .ok_or_else(|| AligenieError::InvalidValue {
                        field: API_VALUE.to_string(),
                        value: level.to_string(),
                    })?;
                data.insert(fan::ATTR_SPEED.to_string(), Value::from(*speed));
                fan::SERVICE_SET_SPEED
            }
            Operation::SetHumidity
            | Operation::AdjustUpHumidity
            | Operation::AdjustDownHumidity
            | Operation::SetTemperature
            | Operation::AdjustUpTemperature
            | Operation::AdjustDownTemperature
            | Operation::SetMode
            | Operation::SetWindSpeed => SERVICE_TURN_ON,

            Operation::OpenSwing | Operation::CloseSwing if domain == fan::DOMAIN => {
                let oscillating = if *self == Operation::OpenSwing {
                    "True"
                } else {
                    "False"
                };
                data.insert(fan::ATTR_OSCILLATING.to_string(), Value::from(oscillating));
                fan::SERVICE_OSCILLATE
            }
            Operation::OpenSwing | Operation::CloseSwing => {
                return Err(AligenieError::UnsupportedFunction)
            }
        };

        Ok(ServiceRequest {
            domain: domain.to_string(),
            service,
            data,
        })
    }

    /// Perform the operation on `entity`
    ///
    /// The service call is submitted without waiting for it to complete.
    pub async fn execute(
        &self,
        platform: &dyn Platform,
        entity: &State,
        payload: &Map<String, Value>,
        context: Context,
    ) -> AligenieResult<()> {
        let request = self.plan(entity, payload)?;
        debug!(
            operation = self.name(),
            domain = %request.domain,
            service = request.service,
            "Executing operation"
        );

        platform
            .call_service(
                &request.domain,
                request.service,
                Value::Object(request.data),
                context,
                false,
            )
            .await?;
        Ok(())
    }

    fn media_service(&self) -> &'static str {
        match self {
            Operation::Play => media_player::SERVICE_MEDIA_PLAY,
            Operation::Pause => media_player::SERVICE_MEDIA_PLAY_PAUSE,
            Operation::Next => media_player::SERVICE_MEDIA_NEXT_TRACK,
            Operation::Previous => media_player::SERVICE_MEDIA_PREVIOUS_TRACK,
            Operation::AdjustUpVolume => media_player::SERVICE_VOLUME_UP,
            Operation::AdjustDownVolume => media_player::SERVICE_VOLUME_DOWN,
            _ => SERVICE_TURN_OFF,
        }
    }
}

fn has_power_control(entity: &State) -> bool {
    entity.supports(media_player::SUPPORT_TURN_ON | media_player::SUPPORT_TURN_OFF)
}

fn value(payload: &Map<String, Value>) -> AligenieResult<&Value> {
    payload
        .get(API_VALUE)
        .ok_or_else(|| AligenieError::MissingField(API_VALUE.to_string()))
}

/// Integer form of a payload value
///
/// Accepts integers, floats (truncated) and integer strings.
fn int_value(value: &Value) -> AligenieResult<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    parsed.ok_or_else(|| AligenieError::InvalidValue {
        field: API_VALUE.to_string(),
        value: value.to_string(),
    })
}

/// `"max"` and `"min"` map to the given defaults, anything else is parsed
fn bounded_value(payload: &Map<String, Value>, max: i64, min: i64) -> AligenieResult<i64> {
    match value(payload)? {
        v if v == "max" => Ok(max),
        v if v == "min" => Ok(min),
        v => int_value(v),
    }
}

fn brightness_pct(entity: &State) -> AligenieResult<Numeric> {
    let raw = Numeric::attribute(entity, light::ATTR_BRIGHTNESS)?;
    Ok(Numeric::Float(raw.as_f64() * 100.0 / 255.0))
}

/// Attribute arithmetic that keeps integers integral
///
/// The target value is sent as an integer when every input was one, so
/// `min`/`max` return whichever operand won, type included.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn attribute(entity: &State, key: &str) -> AligenieResult<Self> {
        let missing = || AligenieError::MissingAttribute {
            entity_id: entity.entity_id.to_string(),
            attribute: key.to_string(),
        };
        let value = entity.attributes.get(key).ok_or_else(missing)?;
        match value.as_i64() {
            Some(i) => Ok(Numeric::Int(i)),
            None => value.as_f64().map(Numeric::Float).ok_or_else(missing),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    fn offset(self, delta: i64) -> Self {
        match self {
            Numeric::Int(i) => Numeric::Int(i.saturating_add(delta)),
            Numeric::Float(f) => Numeric::Float(f + delta as f64),
        }
    }

    fn lower(self, delta: i64) -> Self {
        match self {
            Numeric::Int(i) => Numeric::Int(i.saturating_sub(delta)),
            Numeric::Float(f) => Numeric::Float(f - delta as f64),
        }
    }

    fn min(self, other: Self) -> Self {
        if other.as_f64() < self.as_f64() {
            other
        } else {
            self
        }
    }

    fn max(self, other: Self) -> Self {
        if other.as_f64() > self.as_f64() {
            other
        } else {
            self
        }
    }
}

impl From<Numeric> for Value {
    fn from(n: Numeric) -> Self {
        match n {
            Numeric::Int(i) => Value::from(i),
            Numeric::Float(f) => Value::from(f),
        }
    }
}
