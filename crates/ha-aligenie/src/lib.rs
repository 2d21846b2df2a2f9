//! AliGenie home skill integration
//!
//! Exposes platform entities to the AliGenie voice assistant. The skill
//! service sends directives over HTTP:
//!
//! - `AliGenie.Iot.Device.Discovery` lists the devices the skill may control
//! - `AliGenie.Iot.Device.Control` runs one operation on a device
//! - `AliGenie.Iot.Device.Query` reads one or all properties of a device
//!
//! Directives are parsed into a [`Directive`], routed by the
//! [`HandlerRegistry`] and answered with a [`Response`]. Each entity domain
//! has an [`EntityAdapter`] deciding which [`Operation`]s and [`Property`]s
//! it supports from the entity's feature bits.

pub mod config;
pub mod constants;
pub mod entities;
mod error;
pub mod filter;
pub mod handlers;
mod home_skill;
pub mod http;
pub mod message;
pub mod operations;
pub mod platform;
pub mod properties;

pub use config::{EntityConfig, HomeSkillConfig};
pub use entities::{adapt, AdaptedEntity, DeviceDescriptor, EntityAdapter};
pub use error::{AligenieError, AligenieResult};
pub use filter::{EntityFilter, EntityFilterConfig};
pub use handlers::{Handler, HandlerRegistry};
pub use home_skill::HomeSkill;
pub use message::{Directive, PropertyValue, Response};
pub use operations::{Operation, ServiceRequest};
pub use platform::{HomeAssistant, Platform};
pub use properties::Property;
