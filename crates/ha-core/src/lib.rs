//! Core types for the Home Assistant platform
//!
//! This crate provides the value types shared by the platform and the
//! integrations built on top of it: EntityId, State, Context and
//! ServiceCall, plus per-domain constants and unit helpers.

mod context;
pub mod domains;
mod entity_id;
mod service_call;
mod state;
pub mod temperature;

pub use context::Context;
pub use entity_id::{EntityId, EntityIdError};
pub use service_call::ServiceCall;
pub use state::State;
