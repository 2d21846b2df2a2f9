//! Async service registry
//!
//! Entities are controlled by calling `domain.service` handlers with a JSON
//! payload.
//!
//! Calls are either blocking (the caller awaits the handler) or
//! non-blocking (the handler is spawned on the runtime and the caller
//! returns as soon as the service has been found).

use dashmap::DashMap;
use ha_core::{Context, ServiceCall};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Result type for service calls
pub type ServiceResult = Result<(), ServiceError>;

/// Future type for async service handlers
pub type ServiceFuture = Pin<Box<dyn Future<Output = ServiceResult> + Send>>;

/// Service handler function type
pub type ServiceHandler = Arc<dyn Fn(ServiceCall) -> ServiceFuture + Send + Sync>;

/// Errors that can occur when working with services
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("service not found: {domain}.{service}")]
    NotFound { domain: String, service: String },

    #[error("service call failed: {0}")]
    CallFailed(String),
}

/// The service registry manages all registered services
pub struct ServiceRegistry {
    /// Handlers indexed by "domain.service" key
    services: DashMap<String, ServiceHandler>,
    /// Spawned non-blocking calls, pruned of finished ones on every spawn
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl ServiceRegistry {
    /// Create a new empty service registry
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Register a service, replacing any previous handler for the same key
    #[instrument(skip(self, domain, service, handler))]
    pub fn register<F, Fut>(&self, domain: impl Into<String>, service: impl Into<String>, handler: F)
    where
        F: Fn(ServiceCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult> + Send + 'static,
    {
        let domain = domain.into();
        let service = service.into();

        debug!(domain = %domain, service = %service, "Registering service");

        let handler: ServiceHandler =
            Arc::new(move |call| Box::pin(handler(call)) as ServiceFuture);
        self.services.insert(service_key(&domain, &service), handler);
    }

    /// Call a service
    ///
    /// A missing service is reported immediately in both modes. With
    /// `blocking == false` handler failures are only logged, since the
    /// caller has already moved on.
    #[instrument(skip(self, service_data, context))]
    pub async fn call(
        &self,
        domain: &str,
        service: &str,
        service_data: serde_json::Value,
        context: Context,
        blocking: bool,
    ) -> ServiceResult {
        let handler = self
            .services
            .get(&service_key(domain, service))
            .map(|h| h.clone())
            .ok_or_else(|| {
                warn!(domain = %domain, service = %service, "Service not found");
                ServiceError::NotFound {
                    domain: domain.to_string(),
                    service: service.to_string(),
                }
            })?;

        let call = ServiceCall::new(domain, service, service_data, context);
        debug!(service_id = %call.service_id(), blocking, "Calling service");

        if blocking {
            return handler(call).await;
        }

        let service_id = call.service_id();
        let task = tokio::spawn(async move {
            if let Err(err) = handler(call).await {
                warn!(service_id = %service_id, error = %err, "Non-blocking service call failed");
            }
        });
        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            pending.retain(|task| !task.is_finished());
            pending.push(task);
        }

        Ok(())
    }

    /// Wait until every spawned non-blocking call has finished
    ///
    /// Calls spawned while waiting are awaited as well.
    pub async fn block_till_done(&self) {
        loop {
            let tasks: Vec<JoinHandle<()>> = std::mem::take(
                &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if tasks.is_empty() {
                return;
            }
            for task in tasks {
                if let Err(err) = task.await {
                    warn!(error = %err, "Service task did not complete");
                }
            }
        }
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn service_key(domain: &str, service: &str) -> String {
    format!("{}.{}", domain, service)
}
