//! Provider registry: the key → factory table.

use std::any::{Any, TypeId};

use crate::error::{DiError, DiResult};
use crate::factory::Factory;
use crate::key::Key;
use crate::members::InjectionSite;

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

/// Members injector stored with its target type erased.
pub(crate) struct InjectorEntry {
    pub(crate) target_name: &'static str,
    pub(crate) sites: Vec<InjectionSite>,
    /// Always a `MembersInjector<T>` for the `TypeId` it is stored under.
    pub(crate) injector: Box<dyn Any + Send + Sync>,
}

/// Table of factories keyed by [`Key`].
///
/// The registry is filled once while the graph is declared and treated as
/// read-only afterwards, so lookups need no lock. Factories keep their
/// registration order, which is also the order validation reports problems in.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{deps, DiError, Factory, Key, Lifetime, ProviderRegistry};
///
/// struct WifiManager;
///
/// let mut registry = ProviderRegistry::new();
/// registry.register(Factory::new::<WifiManager, _>(Lifetime::Singleton, deps![], |_| Ok(WifiManager))).unwrap();
///
/// let again = Factory::new::<WifiManager, _>(Lifetime::Singleton, deps![], |_| Ok(WifiManager));
/// assert!(matches!(registry.register(again), Err(DiError::DuplicateBinding(_))));
///
/// assert!(registry.lookup(&Key::of::<WifiManager>()).is_ok());
/// assert!(registry.lookup(&Key::of::<String>()).is_err());
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    factories: Vec<Factory>,
    index: Map<Key, usize>,
    injectors: Map<TypeId, InjectorEntry>,
    injector_order: Vec<TypeId>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `factory` under its key.
    pub fn register(&mut self, factory: Factory) -> DiResult<()> {
        let key = factory.key();
        if self.index.contains_key(&key) {
            return Err(DiError::DuplicateBinding(key));
        }
        tracing::trace!(key = %key, lifetime = %factory.lifetime(), "binding registered");
        self.index.insert(key, self.factories.len());
        self.factories.push(factory);
        Ok(())
    }

    /// The factory bound to `key`.
    #[inline]
    pub fn lookup(&self, key: &Key) -> DiResult<&Factory> {
        self.get(key).ok_or(DiError::Unresolved {
            key: *key,
            required_by: None,
        })
    }

    #[inline]
    pub fn get(&self, key: &Key) -> Option<&Factory> {
        self.index.get(key).map(|&i| &self.factories[i])
    }

    #[inline]
    pub fn contains(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Factories in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Factory> {
        self.factories.iter()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn register_injector(&mut self, target: TypeId, entry: InjectorEntry) -> DiResult<()> {
        if self.injectors.contains_key(&target) {
            return Err(DiError::DuplicateMembersInjector(entry.target_name));
        }
        self.injector_order.push(target);
        self.injectors.insert(target, entry);
        Ok(())
    }

    pub(crate) fn injector(&self, target: &TypeId) -> Option<&InjectorEntry> {
        self.injectors.get(target)
    }

    /// Members injectors in registration order.
    pub(crate) fn injectors(&self) -> impl Iterator<Item = &InjectorEntry> {
        self.injector_order.iter().filter_map(|id| self.injectors.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{deps, Lifetime};

    struct UsbSerial;
    struct Geofence;

    #[test]
    fn keeps_registration_order() {
        let mut registry = ProviderRegistry::new();
        registry
            .register(Factory::new::<Geofence, _>(Lifetime::Transient, deps![], |_| Ok(Geofence)))
            .unwrap();
        registry
            .register(Factory::new::<UsbSerial, _>(Lifetime::Singleton, deps![], |_| Ok(UsbSerial)))
            .unwrap();

        let keys: Vec<Key> = registry.iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec![Key::of::<Geofence>(), Key::of::<UsbSerial>()]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn qualified_keys_are_separate_bindings() {
        let mut registry = ProviderRegistry::new();
        registry.register(Factory::instance(Key::of::<String>(), "plain".to_string())).unwrap();
        registry
            .register(Factory::instance(Key::named::<String>("broker_url"), "tcp://broker".to_string()))
            .unwrap();

        assert!(registry.contains(&Key::named::<String>("broker_url")));
        assert!(!registry.contains(&Key::named::<String>("other")));
    }

    #[test]
    fn lookup_miss_names_the_key() {
        let registry = ProviderRegistry::new();
        match registry.lookup(&Key::of::<UsbSerial>()) {
            Err(DiError::Unresolved { key, required_by }) => {
                assert_eq!(key, Key::of::<UsbSerial>());
                assert!(required_by.is_none());
            }
            _ => panic!("expected Unresolved"),
        }
    }
}
