//! Temperature unit conversion

use thiserror::Error;

/// Celsius unit symbol as reported by the unit system
pub const TEMP_CELSIUS: &str = "°C";

/// Fahrenheit unit symbol as reported by the unit system
pub const TEMP_FAHRENHEIT: &str = "°F";

/// Error for unknown temperature units
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0} is not a recognized temperature unit")]
pub struct UnknownUnit(pub String);

/// Convert a temperature between the two supported units
///
/// Converting to the same unit returns the value untouched.
pub fn convert(value: f64, from_unit: &str, to_unit: &str) -> Result<f64, UnknownUnit> {
    for unit in [from_unit, to_unit] {
        if unit != TEMP_CELSIUS && unit != TEMP_FAHRENHEIT {
            return Err(UnknownUnit(unit.to_string()));
        }
    }

    if from_unit == to_unit {
        return Ok(value);
    }

    if from_unit == TEMP_CELSIUS {
        Ok(value * 1.8 + 32.0)
    } else {
        Ok((value - 32.0) / 1.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_unit_is_identity() {
        assert_eq!(convert(21.5, TEMP_CELSIUS, TEMP_CELSIUS), Ok(21.5));
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        let c = convert(212.0, TEMP_FAHRENHEIT, TEMP_CELSIUS).unwrap();
        assert!((c - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        let f = convert(0.0, TEMP_CELSIUS, TEMP_FAHRENHEIT).unwrap();
        assert!((f - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_unit() {
        assert_eq!(
            convert(1.0, "K", TEMP_CELSIUS),
            Err(UnknownUnit("K".to_string()))
        );
    }
}
