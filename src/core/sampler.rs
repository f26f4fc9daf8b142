//! Pull-based gauge sampling over rollback-safe read transactions.

use crate::core::attributes::UNKNOWN;
use crate::core::declaration::GaugeSpec;
use crate::error::Result;
use crate::host::{DataStore, EntityDef, ReadQuery, Row};
use crate::sdk::{GaugeObserver, LabelSet, MetricsBackend};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// Gauge description used when the entity model provides none.
pub const DEFAULT_GAUGE_DESCRIPTION: &str = "No description available";

/// Label carrying the gauge's entity name on every measurement.
const ENTITY_LABEL: &str = "entity_gauge";
/// Label carrying the row's key-field value.
const KEY_LABEL: &str = "key";

/// Registers observable gauges for entities that declare them.
///
/// Each registered gauge snapshots the entity's current rows on every
/// collection tick, inside a transaction of its own that is always rolled
/// back. Nothing a tick does can fail the export pipeline: query failures,
/// rejected observations, and rollback failures are logged independently
/// and swallowed.
pub struct GaugeSampler {
    backend: Arc<dyn MetricsBackend>,
    store: Arc<dyn DataStore>,
}

impl GaugeSampler {
    /// Create a sampler registering gauges through `backend` and reading
    /// rows through `store`.
    pub fn new(backend: Arc<dyn MetricsBackend>, store: Arc<dyn DataStore>) -> Self {
        Self { backend, store }
    }

    /// Register an observable gauge for `entity` if it declares one.
    ///
    /// Returns whether a gauge was registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration is malformed or the backend
    /// rejects the registration.
    pub fn register_entity(&self, entity: &dyn EntityDef) -> Result<bool> {
        let context = format!("entity {}", entity.name());
        let Some(spec) = GaugeSpec::from_entity(entity, &context)? else {
            return Ok(false);
        };
        let description = entity
            .description()
            .unwrap_or(DEFAULT_GAUGE_DESCRIPTION)
            .to_owned();
        let entity_name = entity.name().to_owned();
        debug!(
            entity = %entity_name,
            fields = ?spec.observe,
            key = %spec.key,
            "registering observable gauge"
        );
        let store = Arc::clone(&self.store);
        let gauge_entity = entity_name.clone();
        self.backend.register_gauge(
            &entity_name,
            &description,
            Box::new(move |observer| sample(store.as_ref(), &gauge_entity, &spec, observer)),
        )?;
        Ok(true)
    }
}

/// One collection tick: read the entity's current rows inside a fresh
/// transaction, report every present observed value, and always release
/// the transaction by rolling it back.
fn sample(store: &dyn DataStore, entity: &str, spec: &GaugeSpec, observer: &dyn GaugeObserver) {
    let mut tx = match store.begin() {
        Ok(tx) => tx,
        Err(err) => {
            error!(entity, error = %err, "failed to open gauge sampling transaction");
            return;
        }
    };
    match tx.read(&ReadQuery::all(entity)) {
        Ok(rows) => observe_rows(entity, spec, &rows, observer),
        Err(err) => error!(entity, error = %err, "gauge sampling query failed"),
    }
    if let Err(err) = tx.rollback() {
        error!(entity, error = %err, "failed to roll back gauge sampling transaction");
    }
}

fn observe_rows(entity: &str, spec: &GaugeSpec, rows: &[Row], observer: &dyn GaugeObserver) {
    for row in rows {
        let key = row
            .get(&spec.key)
            .map(label_value)
            .unwrap_or_else(|| UNKNOWN.to_owned());
        for field in &spec.observe {
            let Some(value) = row.get(field).filter(|value| !value.is_null()) else {
                continue;
            };
            let Some(value) = value.as_f64() else {
                debug!(entity, field = %field, "skipping non-numeric gauge field value");
                continue;
            };
            let mut labels = LabelSet::new();
            labels.insert(ENTITY_LABEL.to_owned(), entity.to_owned());
            labels.insert(KEY_LABEL.to_owned(), key.clone());
            if let Err(err) = observer.observe(value, &labels) {
                error!(entity, field = %field, error = %err, "gauge observation failed");
            }
        }
    }
}

// Row key values become label strings; strings stay bare, everything else
// renders as JSON.
fn label_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => UNKNOWN.to_owned(),
        other => other.to_string(),
    }
}
