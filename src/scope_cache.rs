//! Per-scope instance memoization.
//!
//! Each key gets its own `OnceCell` slot. The map lock is only held long
//! enough to fetch or insert a slot; suppliers run outside it, so a slow
//! constructor only blocks threads waiting on the same key.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::DiResult;
use crate::factory::AnyArc;
use crate::key::Key;
use crate::registry::Map;

/// Memoizes instances for one scope (the root singleton scope or a child scope).
///
/// [`get_or_create`](ScopeCache::get_or_create) runs its supplier at most once
/// per key, even when many threads ask for the same key at the same time: one
/// thread constructs, the others block on that key's slot and then observe the
/// published value. A failing supplier publishes nothing, so the next caller
/// runs its own attempt and errors are never cached.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{AnyArc, Key, ScopeCache};
/// use std::sync::Arc;
///
/// struct LocationManager;
///
/// let cache = ScopeCache::new("singleton");
/// let key = Key::of::<LocationManager>();
///
/// let first = cache.get_or_create(&key, || Ok(Arc::new(LocationManager) as AnyArc)).unwrap();
/// let second = cache.get_or_create(&key, || unreachable!()).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// ```
pub struct ScopeCache {
    label: &'static str,
    slots: Mutex<Map<Key, Arc<OnceCell<AnyArc>>>>,
}

impl ScopeCache {
    /// Creates an empty cache; `label` only shows up in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            slots: Mutex::new(Map::default()),
        }
    }

    /// The published instance for `key`, if any.
    #[inline]
    pub fn get(&self, key: &Key) -> Option<AnyArc> {
        let slot = self.slots.lock().get(key).cloned()?;
        slot.get().cloned()
    }

    /// Whether an instance for `key` has been published.
    pub fn contains(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    /// Returns the cached instance for `key`, running `supplier` exactly once
    /// if there is none yet.
    pub fn get_or_create<F>(&self, key: &Key, supplier: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(*key).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };

        if let Some(value) = slot.get() {
            tracing::trace!(scope = self.label, key = %key, "scope cache hit");
            return Ok(value.clone());
        }

        slot.get_or_try_init(|| {
            let value = supplier()?;
            tracing::trace!(scope = self.label, key = %key, "instance published");
            Ok(value)
        })
        .cloned()
    }

    /// Number of published instances.
    pub fn len(&self) -> usize {
        self.slots.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl std::fmt::Debug for ScopeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeCache")
            .field("label", &self.label)
            .field("instances", &self.len())
            .finish()
    }
}
