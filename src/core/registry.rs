//! Process-wide cache of counter instruments.

use crate::error::Result;
use crate::sdk::{CounterHandle, LabelSet, MetricsBackend};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Name-keyed cache guaranteeing at most one counter instrument per metric
/// name for the process lifetime.
///
/// Event hooks call into the registry concurrently; creation is serialized
/// under the write lock so a first-time race never asks the backend for the
/// same instrument twice. Instruments are retained forever; there is no
/// eviction.
pub struct InstrumentRegistry {
    backend: Arc<dyn MetricsBackend>,
    counters: RwLock<HashMap<String, Arc<dyn CounterHandle>>>,
}

impl InstrumentRegistry {
    /// Create an empty registry creating instruments through `backend`.
    pub fn new(backend: Arc<dyn MetricsBackend>) -> Self {
        Self {
            backend,
            counters: RwLock::new(HashMap::new()),
        }
    }

    /// Return the counter registered under `name`, creating it on first use.
    ///
    /// Repeated lookups return the same instrument; the backend's creation
    /// operation runs exactly once per name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to create the instrument.
    pub fn get_or_create(&self, name: &str) -> Result<Arc<dyn CounterHandle>> {
        if let Some(counter) = self.counters.read().get(name) {
            return Ok(Arc::clone(counter));
        }
        let mut counters = self.counters.write();
        // Re-check: another hook may have created it while we waited.
        if let Some(counter) = counters.get(name) {
            return Ok(Arc::clone(counter));
        }
        let counter = self.backend.create_counter(name)?;
        counters.insert(name.to_owned(), Arc::clone(&counter));
        Ok(counter)
    }

    /// Increment the counter `name` by one, tagged with `labels`.
    ///
    /// Counter increments are best-effort telemetry: every failure is
    /// caught and logged here so nothing propagates into the caller's
    /// event-processing path.
    pub fn increment(&self, name: &str, labels: &LabelSet) {
        match self.get_or_create(name) {
            Ok(counter) => {
                if let Err(err) = counter.add(1, labels) {
                    error!(counter = name, error = %err, "failed to increment counter");
                }
            }
            Err(err) => {
                error!(counter = name, error = %err, "failed to create or retrieve counter");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetricsError;
    use crate::sdk::GaugeCallback;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingBackend {
        created: AtomicUsize,
        counters: Mutex<Vec<Arc<RecordingCounter>>>,
        fail_creation: bool,
    }

    impl MetricsBackend for RecordingBackend {
        fn create_counter(&self, name: &str) -> Result<Arc<dyn CounterHandle>> {
            if self.fail_creation {
                return Err(MetricsError::Backend(format!("meter failure for {name}")));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            let counter = Arc::new(RecordingCounter::default());
            self.counters.lock().push(Arc::clone(&counter));
            Ok(counter)
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

    #[derive(Default)]
    struct RecordingCounter {
        adds: Mutex<Vec<(u64, LabelSet)>>,
        fail_add: bool,
    }

    impl CounterHandle for RecordingCounter {
        fn add(&self, amount: u64, labels: &LabelSet) -> Result<()> {
            if self.fail_add {
                return Err(MetricsError::Backend("add rejected".to_owned()));
            }
            self.adds.lock().push((amount, labels.clone()));
            Ok(())
        }
    }

    fn labels(entries: &[(&str, &str)]) -> LabelSet {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn repeated_lookups_return_the_same_instrument() {
        let backend = Arc::new(RecordingBackend::default());
        let registry = InstrumentRegistry::new(Arc::clone(&backend) as Arc<dyn MetricsBackend>);

        let first = registry.get_or_create("Books_READ_total").unwrap();
        let second = registry.get_or_create("Books_READ_total").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn distinct_names_create_distinct_instruments() {
        let backend = Arc::new(RecordingBackend::default());
        let registry = InstrumentRegistry::new(Arc::clone(&backend) as Arc<dyn MetricsBackend>);

        registry.get_or_create("Books_READ_total").unwrap();
        registry.get_or_create("Books_CREATE_total").unwrap();

        assert_eq!(backend.created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn increment_reuses_the_cached_instrument_across_label_sets() {
        let backend = Arc::new(RecordingBackend::default());
        let registry = InstrumentRegistry::new(Arc::clone(&backend) as Arc<dyn MetricsBackend>);

        registry.increment("Books_READ_total", &labels(&[("user", "alice")]));
        registry.increment("Books_READ_total", &labels(&[("user", "bob")]));

        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
        let counters = backend.counters.lock();
        let adds = counters[0].adds.lock();
        assert_eq!(adds.len(), 2);
        assert_eq!(adds[0], (1, labels(&[("user", "alice")])));
        assert_eq!(adds[1], (1, labels(&[("user", "bob")])));
    }

    #[test]
    fn increment_swallows_creation_failures() {
        let backend = Arc::new(RecordingBackend {
            fail_creation: true,
            ..Default::default()
        });
        let registry = InstrumentRegistry::new(backend as Arc<dyn MetricsBackend>);

        // Must not panic or propagate.
        registry.increment("Books_READ_total", &LabelSet::new());
    }

    #[test]
    fn increment_swallows_add_failures() {
        struct FailingAddBackend;

        impl MetricsBackend for FailingAddBackend {
            fn create_counter(&self, _name: &str) -> Result<Arc<dyn CounterHandle>> {
                Ok(Arc::new(RecordingCounter {
                    adds: Mutex::new(Vec::new()),
                    fail_add: true,
                }))
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

        let registry = InstrumentRegistry::new(Arc::new(FailingAddBackend));
        registry.increment("Books_READ_total", &LabelSet::new());
    }

    #[test]
    fn concurrent_first_lookups_create_once() {
        let backend = Arc::new(RecordingBackend::default());
        let registry = Arc::new(InstrumentRegistry::new(
            Arc::clone(&backend) as Arc<dyn MetricsBackend>
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.get_or_create("orders_CREATE_total").unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
    }
}
