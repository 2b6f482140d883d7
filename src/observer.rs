//! Observer hooks for resolution events.
//!
//! The container always emits `tracing` events on its own; observers are for
//! callers that want to react programmatically (metrics, test assertions,
//! startup reports).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::Key;

/// Observer for object-graph resolution events.
///
/// Calls are made synchronously on the resolving thread; keep implementations
/// cheap.
///
/// # Examples
///
/// ```
/// use iotlogic_di::{deps, DiObserver, Key, ServiceCollection, Resolver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct StartupLog;
///
/// impl DiObserver for StartupLog {
///     fn resolving(&self, key: &Key) {
///         println!("constructing {}", key);
///     }
///
///     fn resolved(&self, key: &Key, duration: Duration) {
///         println!("constructed {} in {:?}", key, duration);
///     }
/// }
///
/// struct WifiManager;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(StartupLog));
/// services.add_singleton_factory::<WifiManager, _>(deps![], |_| Ok(WifiManager));
///
/// let provider = services.build().unwrap();
/// let _wifi = provider.get_required::<WifiManager>();
/// ```
pub trait DiObserver: Send + Sync {
    /// Called right before a binding's dependencies are walked and its constructor runs.
    fn resolving(&self, key: &Key);

    /// Called after a binding was constructed.
    fn resolved(&self, key: &Key, duration: Duration);

    /// Called when a scoped or singleton binding was served from its cache.
    fn cache_hit(&self, _key: &Key) {}

    /// Called when constructing a binding failed, before the error is returned.
    fn construction_failed(&self, _key: &Key, _error: &DiError) {}
}

/// Registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn cache_hit(&self, key: &Key) {
        for observer in &self.observers {
            observer.cache_hit(key);
        }
    }

    #[inline]
    pub(crate) fn construction_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.construction_failed(key, error);
        }
    }
}

/// Observer that counts constructions, cache hits and failures.
///
/// ```
/// use iotlogic_di::{deps, MetricsObserver, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct UsbSerialManager;
///
/// let metrics = Arc::new(MetricsObserver::new());
/// let mut services = ServiceCollection::new();
/// services.add_observer(metrics.clone());
/// services.add_singleton_factory::<UsbSerialManager, _>(deps![], |_| Ok(UsbSerialManager));
///
/// let provider = services.build().unwrap();
/// provider.get_required::<UsbSerialManager>();
/// provider.get_required::<UsbSerialManager>();
///
/// assert_eq!(metrics.construction_count(), 1);
/// assert_eq!(metrics.cache_hit_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MetricsObserver {
    constructions: AtomicU64,
    cache_hits: AtomicU64,
    failures: AtomicU64,
    total_construction_nanos: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constructor runs observed.
    pub fn construction_count(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }

    pub fn cache_hit_count(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Total time spent constructing, dependencies included.
    pub fn total_construction_time(&self) -> Duration {
        Duration::from_nanos(self.total_construction_nanos.load(Ordering::Relaxed))
    }

    /// Average construction time, or `None` before the first construction.
    pub fn average_construction_time(&self) -> Option<Duration> {
        let count = self.construction_count();
        if count == 0 {
            return None;
        }
        let total = self.total_construction_nanos.load(Ordering::Relaxed);
        Some(Duration::from_nanos(total / count))
    }
}

impl DiObserver for MetricsObserver {
    fn resolving(&self, _key: &Key) {}

    fn resolved(&self, _key: &Key, duration: Duration) {
        self.constructions.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_construction_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn cache_hit(&self, _key: &Key) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn construction_failed(&self, _key: &Key, _error: &DiError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}
