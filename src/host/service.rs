//! The host framework's service model.

use crate::error::Result;
use crate::host::context::RequestContext;
use serde_json::Value;
use std::sync::Arc;

/// Callback invoked after a lifecycle event or action completes.
///
/// Receives the event's result payload and the request context the event
/// ran under. Handlers run synchronously inside the host's event dispatch
/// and must return promptly; they must never fail the triggering business
/// operation.
pub type EventHandler = Arc<dyn Fn(&Value, &dyn RequestContext) + Send + Sync>;

/// Declarative metadata lookup by annotation key.
///
/// Entities and actions carry arbitrary annotations in the host's model;
/// the metrics subsystem reads its declarations (`@Counter`, `@Gauge.*`)
/// through this single access point.
pub trait Annotated {
    /// Look up an annotation value by key, if the model declares one.
    fn annotation(&self, key: &str) -> Option<Value>;
}

/// A domain entity exposed by a registered service.
pub trait EntityDef: Annotated + Send + Sync {
    /// The entity's name as the host registers it.
    fn name(&self) -> &str;

    /// Human-readable description, if the model provides one.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Actions bound to this entity.
    fn actions(&self) -> Vec<Arc<dyn ActionDef>> {
        Vec::new()
    }
}

/// A bound or unbound action.
pub trait ActionDef: Annotated + Send + Sync {
    /// Full action name as the host registers it, possibly namespaced
    /// (e.g. `CatalogService.purchaseBook`).
    fn name(&self) -> &str;

    /// Owning entity name, for bound actions.
    fn parent(&self) -> Option<&str> {
        None
    }
}

/// A registered service: its entities, its actions, and hook registration.
pub trait ServiceDef: Send + Sync {
    /// The service's name.
    fn name(&self) -> &str;

    /// Entities this service exposes.
    fn entities(&self) -> Vec<Arc<dyn EntityDef>>;

    /// Unbound (service-level) actions this service exposes.
    fn actions(&self) -> Vec<Arc<dyn ActionDef>>;

    /// Install a callback invoked after `event` completes.
    ///
    /// When `entity` is given the hook fires only for that entity's events;
    /// otherwise it fires for the service-level event of that name.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot register the hook (unknown
    /// event, service shutting down, ...).
    fn register_after(
        &self,
        event: &str,
        entity: Option<&str>,
        handler: EventHandler,
    ) -> Result<()>;
}
