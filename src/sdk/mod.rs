//! The metrics-backend seam.
//!
//! The core components create counters and register gauges through the
//! [`MetricsBackend`] trait; [`OtelBackend`] is the production
//! implementation over the OpenTelemetry metrics API. Tests substitute
//! in-memory backends to assert on instrument creation and recorded
//! measurements.

mod backend;
mod otel;

pub use backend::{CounterHandle, GaugeCallback, GaugeObserver, LabelSet, MetricsBackend};
pub use otel::{METER_NAME, OtelBackend};
