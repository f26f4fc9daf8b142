//! Core annotation interpretation and instrument lifecycle management.

pub mod attributes;
pub mod declaration;

mod binder;
mod driver;
mod registry;
mod sampler;

pub use binder::{CounterBinder, LIFECYCLE_EVENTS};
pub use driver::BusinessMetrics;
pub use registry::InstrumentRegistry;
pub use sampler::{DEFAULT_GAUGE_DESCRIPTION, GaugeSampler};
