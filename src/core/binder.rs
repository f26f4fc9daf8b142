//! Counter declarations bound to post-event hooks.

use crate::core::attributes::{AttributeRef, default_attributes, resolve_labels, validate_attributes};
use crate::core::declaration::{ActionCounterSpec, CounterSpec};
use crate::core::registry::InstrumentRegistry;
use crate::error::{MetricsError, Result};
use crate::host::{ActionDef, EntityDef, EventHandler, ServiceDef};
use std::sync::Arc;
use tracing::{debug, error};

/// The row-level lifecycle events counters default to.
pub const LIFECYCLE_EVENTS: [&str; 4] = ["READ", "CREATE", "DELETE", "UPDATE"];

/// Interprets counter declarations and installs the matching hooks.
///
/// Validation failures are fatal to the declaration site and propagate to
/// the caller; failures inside an installed hook at runtime are logged and
/// swallowed so the triggering business operation is never affected.
pub struct CounterBinder {
    registry: Arc<InstrumentRegistry>,
}

impl CounterBinder {
    /// Create a binder incrementing counters through `registry`.
    pub fn new(registry: Arc<InstrumentRegistry>) -> Self {
        Self { registry }
    }

    /// Interpret the counter declaration on `entity` and install its hooks.
    ///
    /// # Errors
    ///
    /// Returns the validation or declaration error that rejected the
    /// declaration site, after logging it. Hook-registration failures from
    /// the host propagate as well.
    pub fn bind_entity(&self, service: &dyn ServiceDef, entity: &dyn EntityDef) -> Result<()> {
        let Some(spec) = CounterSpec::from_entity(entity, &format!("entity {}", entity.name()))
            .map_err(log_rejection)?
        else {
            return Ok(());
        };
        match spec {
            CounterSpec::Attributes(attributes) => {
                let context = format!("entity {} @Counter.attributes", entity.name());
                checked(&attributes, &context)?;
                for event in LIFECYCLE_EVENTS {
                    self.install_entity_hook(service, entity.name(), event, attributes.clone())?;
                }
            }
            CounterSpec::Events(events) if !events.is_empty() => {
                for descriptor in events {
                    if let Some(attributes) = &descriptor.attributes {
                        let context = format!(
                            "entity {} @Counter event {}",
                            entity.name(),
                            descriptor.event
                        );
                        checked(attributes, &context)?;
                    }
                    let attributes = descriptor.attributes.unwrap_or_else(default_attributes);
                    self.install_entity_hook(service, entity.name(), &descriptor.event, attributes)?;
                }
            }
            CounterSpec::Events(_) | CounterSpec::AllDefaults => {
                for event in LIFECYCLE_EVENTS {
                    self.install_entity_hook(service, entity.name(), event, default_attributes())?;
                }
            }
        }
        Ok(())
    }

    /// Install the counter hook for an action bound to `entity`, if the
    /// action declares one.
    ///
    /// The hook registers under the short action name; the counter is named
    /// `<parent>_<fullActionName>_total`.
    ///
    /// # Errors
    ///
    /// Returns the validation or declaration error that rejected the
    /// declaration site, after logging it.
    pub fn bind_bound_action(
        &self,
        service: &dyn ServiceDef,
        entity: &dyn EntityDef,
        action: &dyn ActionDef,
    ) -> Result<()> {
        let context = format!("bound action {} @Counter.attributes", action.name());
        let Some(spec) =
            ActionCounterSpec::from_action(action, &context).map_err(log_rejection)?
        else {
            return Ok(());
        };
        if let Some(declared) = &spec.attributes {
            checked(declared, &context)?;
        }
        let parent = action.parent().unwrap_or_else(|| entity.name());
        let counter_name = format!("{}_{}_total", parent, action.name());
        let handler = self.counting_handler(counter_name, spec.effective_attributes());
        service.register_after(short_name(action.name()), Some(entity.name()), handler)
    }

    /// Install the counter hook for a service-level action, if the action
    /// declares one.
    ///
    /// The hook registers under the short action name; the counter is named
    /// `<fullActionName>_total`.
    ///
    /// # Errors
    ///
    /// Returns the validation or declaration error that rejected the
    /// declaration site, after logging it.
    pub fn bind_unbound_action(
        &self,
        service: &dyn ServiceDef,
        action: &dyn ActionDef,
    ) -> Result<()> {
        let context = format!("unbound action {} @Counter.attributes", action.name());
        let Some(spec) =
            ActionCounterSpec::from_action(action, &context).map_err(log_rejection)?
        else {
            return Ok(());
        };
        if let Some(declared) = &spec.attributes {
            checked(declared, &context)?;
        }
        let counter_name = format!("{}_total", action.name());
        let handler = self.counting_handler(counter_name, spec.effective_attributes());
        service.register_after(short_name(action.name()), None, handler)
    }

    fn install_entity_hook(
        &self,
        service: &dyn ServiceDef,
        entity: &str,
        event: &str,
        attributes: Vec<AttributeRef>,
    ) -> Result<()> {
        let counter_name = format!("{entity}_{event}_total");
        debug!(entity, event, counter = %counter_name, "installing lifecycle counter hook");
        let handler = self.counting_handler(counter_name, attributes);
        service.register_after(event, Some(entity), handler)
    }

    fn counting_handler(&self, counter_name: String, attributes: Vec<AttributeRef>) -> EventHandler {
        let registry = Arc::clone(&self.registry);
        Arc::new(move |_result, ctx| match resolve_labels(&attributes, ctx) {
            Ok(labels) => registry.increment(&counter_name, &labels),
            Err(err) => {
                error!(counter = %counter_name, error = %err, "failed to resolve counter labels");
            }
        })
    }
}

// CatalogService.purchaseBook -> purchaseBook
fn short_name(full: &str) -> &str {
    full.rsplit('.').next().unwrap_or(full)
}

fn checked(attributes: &[AttributeRef], context: &str) -> Result<()> {
    validate_attributes(attributes, context).map_err(|err| {
        error!(error = %err, "rejected counter declaration");
        MetricsError::from(err)
    })
}

fn log_rejection(err: MetricsError) -> MetricsError {
    error!(error = %err, "rejected counter declaration");
    err
}
