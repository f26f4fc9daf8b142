//! Startup driver wiring declarations into live hooks and gauges.

use crate::core::binder::CounterBinder;
use crate::core::registry::InstrumentRegistry;
use crate::core::sampler::GaugeSampler;
use crate::error::Result;
use crate::host::{DataStore, EntityDef, ServiceDef};
use crate::sdk::MetricsBackend;
use std::sync::Arc;
use tracing::error;

/// The business-metrics subsystem: instrument registry, counter binder,
/// and gauge sampler assembled around a backend and a data store.
///
/// Built once at process start and driven over the fully-registered
/// service model; the hooks and gauges it installs live for the process
/// lifetime.
///
/// # Examples
///
/// ```rust,no_run
/// use entity_metrics::prelude::*;
/// use entity_metrics::sdk::OtelBackend;
/// use std::sync::Arc;
///
/// # fn services() -> Vec<Arc<dyn ServiceDef>> { Vec::new() }
/// # fn store() -> Arc<dyn DataStore> { unimplemented!() }
/// let metrics = BusinessMetrics::new(Arc::new(OtelBackend::from_global()), store());
/// metrics.register_all(&services());
/// ```
pub struct BusinessMetrics {
    binder: CounterBinder,
    sampler: GaugeSampler,
}

impl BusinessMetrics {
    /// Assemble the subsystem around a metrics backend and a data store.
    pub fn new(backend: Arc<dyn MetricsBackend>, store: Arc<dyn DataStore>) -> Self {
        let registry = Arc::new(InstrumentRegistry::new(Arc::clone(&backend)));
        Self {
            binder: CounterBinder::new(registry),
            sampler: GaugeSampler::new(backend, store),
        }
    }

    /// Walk every registered service once and install its declared metrics.
    ///
    /// Must run after the host has finished registering services. Failures
    /// are isolated: a broken service, entity, or unbound action is logged
    /// and skipped without disabling metrics for the rest of the model.
    pub fn register_all(&self, services: &[Arc<dyn ServiceDef>]) {
        for service in services {
            if let Err(err) = self.register_service(service.as_ref()) {
                error!(
                    service = service.name(),
                    error = %err,
                    "failed to set up metrics for service"
                );
            }
        }
    }

    fn register_service(&self, service: &dyn ServiceDef) -> Result<()> {
        for entity in service.entities() {
            if let Err(err) = self.register_entity(service, entity.as_ref()) {
                error!(
                    service = service.name(),
                    entity = entity.name(),
                    error = %err,
                    "failed to set up metrics for entity"
                );
            }
        }
        for action in service.actions() {
            if let Err(err) = self.binder.bind_unbound_action(service, action.as_ref()) {
                error!(
                    service = service.name(),
                    action = action.name(),
                    error = %err,
                    "failed to set up counter for unbound action"
                );
            }
        }
        Ok(())
    }

    // Gauge first, then entity counters, then bound actions. A counter
    // failure aborts the rest of this entity but never its siblings; a
    // gauge failure aborts nothing.
    fn register_entity(&self, service: &dyn ServiceDef, entity: &dyn EntityDef) -> Result<()> {
        if let Err(err) = self.sampler.register_entity(entity) {
            error!(
                entity = entity.name(),
                error = %err,
                "failed to set up gauge for entity"
            );
        }
        self.binder.bind_entity(service, entity)?;
        for action in entity.actions() {
            self.binder.bind_bound_action(service, entity, action.as_ref())?;
        }
        Ok(())
    }
}
