//! Injected host-framework capabilities.
//!
//! The metrics subsystem never talks to the application framework or the
//! database directly. Everything it needs (the registered service model,
//! hook registration, the request context, and transactional reads) is
//! expressed as a trait here and supplied by the embedding application.
//! This keeps the core registerable against any host and testable without
//! one.

mod context;
mod service;
mod store;

pub use context::RequestContext;
pub use service::{ActionDef, Annotated, EntityDef, EventHandler, ServiceDef};
pub use store::{DataStore, ReadQuery, Row, Transaction};
