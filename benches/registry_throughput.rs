//! Performance benchmarks for the instrument-registry hot path.
//!
//! Counter hooks run synchronously inside business-event dispatch, so the
//! per-event cost is one cached lookup plus one add against the backend.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use entity_metrics::core::InstrumentRegistry;
use entity_metrics::error::Result;
use entity_metrics::sdk::{CounterHandle, GaugeCallback, LabelSet, MetricsBackend};
use std::sync::Arc;

struct NoopBackend;

struct NoopCounter;

impl CounterHandle for NoopCounter {
    fn add(&self, _amount: u64, _labels: &LabelSet) -> Result<()> {
        Ok(())
    }
}

impl MetricsBackend for NoopBackend {
    fn create_counter(&self, _name: &str) -> Result<Arc<dyn CounterHandle>> {
        Ok(Arc::new(NoopCounter))
    }

    fn register_gauge(
        &self,
        _name: &str,
        _description: &str,
        _callback: GaugeCallback,
    ) -> Result<()> {
        Ok(())
    }
}

/// Benchmark the cached-lookup path every event hook takes.
fn benchmark_cached_lookup(c: &mut Criterion) {
    let registry = InstrumentRegistry::new(Arc::new(NoopBackend));
    registry
        .get_or_create("Books_READ_total")
        .expect("creation cannot fail");

    let mut group = c.benchmark_group("registry");
    group.bench_function("cached_lookup", |b| {
        b.iter(|| {
            let counter = registry
                .get_or_create(black_box("Books_READ_total"))
                .expect("lookup cannot fail");
            black_box(counter);
        });
    });
    group.finish();
}

/// Benchmark a full increment with a typical two-label set.
fn benchmark_increment(c: &mut Criterion) {
    let registry = InstrumentRegistry::new(Arc::new(NoopBackend));
    let labels: LabelSet = [
        ("user".to_owned(), "alice".to_owned()),
        ("tenant".to_owned(), "acme".to_owned()),
    ]
    .into_iter()
    .collect();

    let mut group = c.benchmark_group("registry");
    group.bench_function("increment", |b| {
        b.iter(|| registry.increment(black_box("Books_READ_total"), &labels));
    });
    group.finish();
}

criterion_group!(benches, benchmark_cached_lookup, benchmark_increment);
criterion_main!(benches);
