//! Error types for the home skill

use ha_core::temperature::UnknownUnit;
use ha_service_registry::ServiceError;
use thiserror::Error;

use crate::constants::{ERROR_DEVICE_NOT_EXIST, ERROR_INVALID_DIRECTIVE, ERROR_UNSUPPORTED_FUNCTION};

/// Result type for home skill operations
pub type AligenieResult<T> = Result<T, AligenieError>;

/// Errors raised while handling a directive
///
/// Variants with an [`error_code`](AligenieError::error_code) are reported to
/// the skill service along with their message. Everything else is an internal
/// fault and is reported as an opaque `SERVICE_ERROR`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AligenieError {
    /// The request envelope is malformed; no response can be addressed
    #[error("malformed request: {0}")]
    Protocol(String),

    #[error("The device {0} does not exist")]
    InvalidDevice(String),

    #[error("The directive {0} does not exist")]
    InvalidDirective(String),

    #[error("function not support")]
    UnsupportedFunction,

    #[error("property {0} is not supported")]
    UnsupportedProperty(String),

    #[error("device type {0} is not supported")]
    UnsupportedDomain(String),

    #[error("payload field '{0}' is missing")]
    MissingField(String),

    #[error("invalid value '{value}' for '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("entity {entity_id} has no '{attribute}' attribute")]
    MissingAttribute { entity_id: String, attribute: String },

    #[error(transparent)]
    Unit(#[from] UnknownUnit),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AligenieError {
    /// Wire error code for errors the skill service understands
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            AligenieError::InvalidDevice(_) => Some(ERROR_DEVICE_NOT_EXIST),
            AligenieError::InvalidDirective(_) => Some(ERROR_INVALID_DIRECTIVE),
            AligenieError::UnsupportedFunction => Some(ERROR_UNSUPPORTED_FUNCTION),
            _ => None,
        }
    }
}
