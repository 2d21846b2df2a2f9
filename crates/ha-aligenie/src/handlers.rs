//! Directive handlers and their registry
//!
//! Handlers are keyed either by `(namespace, name)` or by namespace alone.
//! An exact key always wins over the namespace fallback.

use futures::future::BoxFuture;
use ha_core::Context;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::constants::{
    API_DEVICE, DIRECTIVE_DISCOVERY, DIRECTIVE_QUERY, NAMESPACE_CONTROL, NAMESPACE_DISCOVERY,
    NAMESPACE_QUERY,
};
use crate::entities::{adapt, discoverable_entities, AdaptedEntity, EntityAdapter};
use crate::error::{AligenieError, AligenieResult};
use crate::home_skill::HomeSkill;
use crate::message::{Directive, Response};
use crate::platform::Platform;

/// Future returned by a handler
pub type HandlerFuture<'a> = BoxFuture<'a, AligenieResult<Response>>;

/// Async directive handler
pub type Handler = for<'a> fn(
    &'a dyn Platform,
    &'a HomeSkill,
    &'a Directive,
    Context,
) -> HandlerFuture<'a>;

/// Registry key: a namespace, optionally narrowed to one directive name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HandlerKey {
    namespace: String,
    name: Option<String>,
}

/// Maps directives to handlers
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerKey, Handler>,
}

impl HandlerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with discovery, control and query handlers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NAMESPACE_DISCOVERY, Some(DIRECTIVE_DISCOVERY), discovery);
        registry.register(NAMESPACE_CONTROL, None, control);
        registry.register(NAMESPACE_QUERY, Some(DIRECTIVE_QUERY), query);
        registry.register(NAMESPACE_QUERY, None, query_property);
        registry
    }

    /// Register a handler, replacing any previous one for the same key
    pub fn register(&mut self, namespace: &str, name: Option<&str>, handler: Handler) {
        let key = HandlerKey {
            namespace: namespace.to_string(),
            name: name.map(str::to_string),
        };
        self.handlers.insert(key, handler);
    }

    /// Find the handler for a directive
    pub fn resolve(&self, namespace: &str, name: &str) -> Option<Handler> {
        let exact = HandlerKey {
            namespace: namespace.to_string(),
            name: Some(name.to_string()),
        };
        let fallback = HandlerKey {
            namespace: namespace.to_string(),
            name: None,
        };
        self.handlers
            .get(&exact)
            .or_else(|| self.handlers.get(&fallback))
            .copied()
    }

    /// Run the handler for `directive`
    ///
    /// Fails with [`AligenieError::InvalidDirective`] when nothing is registered.
    pub async fn dispatch(
        &self,
        platform: &dyn Platform,
        skill: &HomeSkill,
        directive: &Directive,
        context: Context,
    ) -> AligenieResult<Response> {
        let handler = self
            .resolve(&directive.namespace, &directive.name)
            .ok_or_else(|| AligenieError::InvalidDirective(directive.name.clone()))?;
        debug!(namespace = %directive.namespace, name = %directive.name, "Dispatching directive");
        handler(platform, skill, directive, context).await
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Adapter for the directive's entity
fn directive_adapter(
    platform: &dyn Platform,
    skill: &HomeSkill,
    directive: &Directive,
) -> AligenieResult<Box<dyn EntityAdapter>> {
    let entity = directive
        .entity()
        .cloned()
        .ok_or_else(|| AligenieError::MissingField(API_DEVICE.to_string()))?;
    adapt(AdaptedEntity::new(platform, skill.config(), entity))
}

fn discovery<'a>(
    platform: &'a dyn Platform,
    skill: &'a HomeSkill,
    directive: &'a Directive,
    _context: Context,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let devices = discoverable_entities(platform, skill.config(), |id| skill.should_expose(id))
            .iter()
            .map(|adapter| adapter.serialize_discovery())
            .collect::<AligenieResult<Vec<_>>>()?;
        debug!(count = devices.len(), "Discovered devices");

        let mut payload = Map::new();
        payload.insert(
            "devices".to_string(),
            serde_json::to_value(devices).unwrap_or(Value::Array(Vec::new())),
        );
        Ok(directive.response(Some(payload)))
    })
}

fn control<'a>(
    platform: &'a dyn Platform,
    skill: &'a HomeSkill,
    directive: &'a Directive,
    context: Context,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let adapter = directive_adapter(platform, skill, directive)?;
        let operation = adapter.get_operation(&directive.name)?;
        operation
            .execute(platform, &adapter.entity().state, &directive.payload, context)
            .await?;
        Ok(directive.response(None))
    })
}

fn query<'a>(
    platform: &'a dyn Platform,
    skill: &'a HomeSkill,
    directive: &'a Directive,
    _context: Context,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let adapter = directive_adapter(platform, skill, directive)?;
        let mut response = directive.response(None);
        response.merge_properties(adapter.serialize_properties()?);
        Ok(response)
    })
}

/// `Query<Property>` directives, e.g. `QueryPowerState` reads `powerstate`
fn query_property<'a>(
    platform: &'a dyn Platform,
    skill: &'a HomeSkill,
    directive: &'a Directive,
    _context: Context,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let adapter = directive_adapter(platform, skill, directive)?;
        let property = directive
            .name
            .get(DIRECTIVE_QUERY.len()..)
            .unwrap_or_default()
            .to_lowercase();

        let mut response = directive.response(None);
        if let Some(value) = adapter.serialize_property(&property)? {
            response.merge_property(value);
        }
        Ok(response)
    })
}
