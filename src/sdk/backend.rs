//! Backend traits for counter and gauge instruments.

use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key-value tags attached to a metric data point.
///
/// Built per event or per sample and discarded after recording; ordering is
/// deterministic so recorded label sets compare cleanly in tests.
pub type LabelSet = BTreeMap<String, String>;

/// A created counter instrument.
pub trait CounterHandle: Send + Sync {
    /// Add `amount` to the counter, tagged with `labels`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the recording.
    fn add(&self, amount: u64, labels: &LabelSet) -> Result<()>;
}

/// Sink for gauge measurements during one collection tick.
pub trait GaugeObserver {
    /// Report one current value, tagged with `labels`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the measurement.
    fn observe(&self, value: f64, labels: &LabelSet) -> Result<()>;
}

/// Pull callback invoked by the export pipeline on each collection tick.
pub type GaugeCallback = Box<dyn Fn(&dyn GaugeObserver) + Send + Sync>;

/// Creates instruments in the external metrics SDK.
pub trait MetricsBackend: Send + Sync {
    /// Create the counter registered under `name`.
    ///
    /// Callers cache the returned handle; the backend is asked at most once
    /// per name for the process lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK cannot create the instrument.
    fn create_counter(&self, name: &str) -> Result<Arc<dyn CounterHandle>>;

    /// Register an observable gauge whose values are supplied by `callback`.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK cannot register the gauge.
    fn register_gauge(
        &self,
        name: &str,
        description: &str,
        callback: GaugeCallback,
    ) -> Result<()>;
}
