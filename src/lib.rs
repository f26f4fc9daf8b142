//! # entity-metrics
//!
//! Annotation-driven business metrics: counters and gauges bound to entity
//! lifecycle events.
//!
//! ## Overview
//!
//! `entity-metrics` observes a host application framework's service model
//! and turns declarative annotations on entities and actions into live
//! metric instruments:
//!
//! - `@Counter` declarations become post-event hooks that increment
//!   counters named `<entity>_<event>_total` (and `<action>_total` for
//!   actions), labeled from the request context.
//! - `@Gauge.observe`/`@Gauge.key` declarations become pull-based
//!   observable gauges that snapshot the entity's current rows inside a
//!   rollback-only read transaction on every collection tick.
//!
//! The host framework, the transactional data store, and the metrics SDK
//! are all injected capabilities (see [`host`] and [`sdk`]), so the core
//! runs against any host and tests run against none.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use entity_metrics::prelude::*;
//! use entity_metrics::sdk::OtelBackend;
//! use std::sync::Arc;
//!
//! # fn services() -> Vec<Arc<dyn ServiceDef>> { Vec::new() }
//! # fn store() -> Arc<dyn DataStore> { unimplemented!() }
//! # fn host_settings() -> TelemetrySettings { TelemetrySettings::default() }
//! // At process start, after all services are registered:
//! let gate = ActivationGate::from_env(InvocationMode::from_command("serve"), host_settings());
//! if gate.is_active() {
//!     let metrics = BusinessMetrics::new(Arc::new(OtelBackend::from_global()), store());
//!     metrics.register_all(&services());
//! }
//! ```
//!
//! ## Failure model
//!
//! Metrics are best-effort telemetry. Validation failures reject a single
//! declaration site at startup without disabling the rest of the model;
//! every runtime failure (a rejected increment, a failed gauge query, a
//! rollback error) is caught, logged, and swallowed. The subsystem never
//! surfaces in API responses.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod bootstrap;
pub mod core;
pub mod error;
pub mod host;
pub mod sdk;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::bootstrap::{ActivationGate, InvocationMode, TelemetrySettings};
    pub use crate::core::BusinessMetrics;
    pub use crate::error::{MetricsError, Result, ValidationError};
    pub use crate::host::{
        ActionDef, Annotated, DataStore, EntityDef, RequestContext, ServiceDef,
    };
    pub use crate::sdk::{LabelSet, MetricsBackend};
}
