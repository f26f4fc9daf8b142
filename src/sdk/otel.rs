//! OpenTelemetry implementation of the metrics backend.

use crate::error::Result;
use crate::sdk::backend::{CounterHandle, GaugeCallback, GaugeObserver, LabelSet, MetricsBackend};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::{AsyncInstrument, Counter, Meter, ObservableGauge};
use parking_lot::Mutex;
use std::sync::Arc;

/// Instrumentation scope under which all business-metric instruments are
/// created.
pub const METER_NAME: &str = "entity-metrics:business-metrics";

/// Metrics backend recording through an OpenTelemetry [`Meter`].
///
/// # Examples
///
/// ```rust,no_run
/// use entity_metrics::sdk::OtelBackend;
/// use opentelemetry::global;
///
/// // Either pin the meter yourself...
/// let backend = OtelBackend::new(global::meter("my-app"));
/// // ...or take the crate's instrumentation scope.
/// let backend = OtelBackend::from_global();
/// ```
pub struct OtelBackend {
    meter: Meter,
    // Registered gauge handles, retained for the process lifetime.
    gauges: Mutex<Vec<ObservableGauge<f64>>>,
}

impl OtelBackend {
    /// Create a backend recording through the provided meter.
    pub fn new(meter: Meter) -> Self {
        Self {
            meter,
            gauges: Mutex::new(Vec::new()),
        }
    }

    /// Create a backend on the globally installed meter provider, scoped
    /// under [`METER_NAME`].
    pub fn from_global() -> Self {
        Self::new(global::meter(METER_NAME))
    }
}

impl MetricsBackend for OtelBackend {
    fn create_counter(&self, name: &str) -> Result<Arc<dyn CounterHandle>> {
        let counter = self.meter.u64_counter(name.to_owned()).build();
        Ok(Arc::new(OtelCounter { counter }))
    }

    fn register_gauge(
        &self,
        name: &str,
        description: &str,
        callback: GaugeCallback,
    ) -> Result<()> {
        let gauge = self
            .meter
            .f64_observable_gauge(name.to_owned())
            .with_description(description.to_owned())
            .with_callback(move |instrument| callback(&OtelObserver { instrument }))
            .build();
        self.gauges.lock().push(gauge);
        Ok(())
    }
}

struct OtelCounter {
    counter: Counter<u64>,
}

impl CounterHandle for OtelCounter {
    fn add(&self, amount: u64, labels: &LabelSet) -> Result<()> {
        self.counter.add(amount, &to_key_values(labels));
        Ok(())
    }
}

struct OtelObserver<'a> {
    instrument: &'a dyn AsyncInstrument<f64>,
}

impl GaugeObserver for OtelObserver<'_> {
    fn observe(&self, value: f64, labels: &LabelSet) -> Result<()> {
        self.instrument.observe(value, &to_key_values(labels));
        Ok(())
    }
}

fn to_key_values(labels: &LabelSet) -> Vec<KeyValue> {
    labels
        .iter()
        .map(|(key, value)| KeyValue::new(key.clone(), value.clone()))
        .collect()
}
