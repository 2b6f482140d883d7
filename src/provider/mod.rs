//! Service provider: the built, read-only object graph.
//!
//! The root [`ServiceProvider`] owns the singleton [`ScopeCache`]; every
//! [`Scope`] created from it owns one more cache for scoped bindings.

use std::any::TypeId;
use std::sync::Arc;

use crate::config::ContainerOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::factory::AnyArc;
use crate::graph::GraphBuilder;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::members::MembersInjector;
use crate::observer::Observers;
use crate::registry::ProviderRegistry;
use crate::scope_cache::ScopeCache;
use crate::traits::ResolverCore;

pub mod handle;
pub mod scope;
pub use handle::Provider;
pub use scope::Scope;

/// The application's object graph, ready for resolution.
///
/// Built once at startup by [`ServiceCollection::build`](crate::ServiceCollection::build)
/// and owned by the application root. Cloning is cheap (`Arc` inside), and
/// the provider can be shared freely across threads: lookups are lock-free,
/// and the singleton cache serializes construction per key only.
///
/// # Examples
///
/// ```
/// use iotlogic_di::{deps, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct ApiService;
/// struct ApiClient { service: Arc<ApiService> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_factory::<ApiService, _>(deps![], |_| Ok(ApiService));
/// services.add_singleton_factory::<ApiClient, _>(deps![ApiService], |d| {
///     Ok(ApiClient { service: d.get::<ApiService>(0)? })
/// });
///
/// let provider = services.build().unwrap();
/// let client = provider.get_required::<ApiClient>();
/// assert!(Arc::ptr_eq(&client, &provider.get_required::<ApiClient>()));
/// assert!(Arc::ptr_eq(&client.service, &provider.get_required::<ApiService>()));
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub(crate) registry: ProviderRegistry,
    pub(crate) singletons: ScopeCache,
    pub(crate) observers: Observers,
    pub(crate) options: ContainerOptions,
}

impl ServiceProvider {
    pub(crate) fn new(registry: ProviderRegistry, observers: Observers, options: ContainerOptions) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                singletons: ScopeCache::new("singleton"),
                observers,
                options,
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    #[inline]
    pub(crate) fn graph<'a>(&'a self, scoped: Option<&'a ScopeCache>) -> GraphBuilder<'a> {
        GraphBuilder::new(
            &self.inner.registry,
            &self.inner.singletons,
            scoped,
            &self.inner.observers,
            self.inner.options.max_depth,
        )
    }

    /// Creates a child scope with its own cache for scoped bindings.
    ///
    /// ```
    /// use iotlogic_di::{deps, Resolver, ServiceCollection};
    /// use std::sync::Arc;
    ///
    /// struct PairingSession;
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_factory::<PairingSession, _>(deps![], |_| Ok(PairingSession));
    /// let provider = services.build().unwrap();
    ///
    /// let first = provider.create_scope();
    /// let second = provider.create_scope();
    /// let a = first.get_required::<PairingSession>();
    /// assert!(Arc::ptr_eq(&a, &first.get_required::<PairingSession>()));
    /// assert!(!Arc::ptr_eq(&a, &second.get_required::<PairingSession>()));
    ///
    /// // Scoped bindings are not visible from the root
    /// assert!(provider.get::<PairingSession>().is_err());
    /// ```
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    /// Populates the fields of a framework-created `target` using the
    /// injector registered for `T`.
    ///
    /// Every injection site is resolved before any field is assigned.
    pub fn inject_members<T: 'static>(&self, target: &mut T) -> DiResult<()> {
        let injector = self.registered_injector::<T>()?;
        self.graph(None).inject_members(target, injector)
    }

    /// Populates the fields of `target` with an ad-hoc injector.
    pub fn inject_members_with<T: 'static>(&self, target: &mut T, injector: &MembersInjector<T>) -> DiResult<()> {
        self.graph(None).inject_members(target, injector)
    }

    pub(crate) fn registered_injector<T: 'static>(&self) -> DiResult<&MembersInjector<T>> {
        self.inner
            .registry
            .injector(&TypeId::of::<T>())
            .and_then(|entry| entry.injector.downcast_ref::<MembersInjector<T>>())
            .ok_or(DiError::NoMembersInjector(std::any::type_name::<T>()))
    }

    /// Constructs every singleton that is not cached yet, in registration order.
    ///
    /// Returns how many singletons are cached afterwards.
    pub fn prewarm_singletons(&self) -> DiResult<usize> {
        let graph = self.graph(None);
        for factory in self.inner.registry.iter() {
            if factory.lifetime() == Lifetime::Singleton {
                graph.resolve(&factory.key())?;
            }
        }
        let cached = self.inner.singletons.len();
        tracing::debug!(singletons = cached, "singletons prewarmed");
        Ok(cached)
    }

    /// Descriptors of every binding, in registration order.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.inner.registry.iter().map(ServiceDescriptor::from_factory).collect()
    }

    /// Whether `key` has a binding.
    pub fn contains(&self, key: &Key) -> bool {
        self.inner.registry.contains(key)
    }

    /// Number of singletons constructed so far.
    pub fn singleton_count(&self) -> usize {
        self.inner.singletons.len()
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Object Graph ===\n");
        for factory in self.inner.registry.iter() {
            let cached = if self.inner.singletons.contains(&factory.key()) { " (cached)" } else { "" };
            s.push_str(&format!("  {} [{}]{}\n", factory.key(), factory.lifetime(), cached));
            for dep in factory.dependencies() {
                s.push_str(&format!("    <- {}\n", dep));
            }
        }
        s.push_str("Members Injectors:\n");
        for entry in self.inner.registry.injectors() {
            s.push_str(&format!("  {}\n", entry.target_name));
            for site in &entry.sites {
                s.push_str(&format!("    .{} <- {}\n", site.field, site.key));
            }
        }
        s
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.graph(None).resolve(key)
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("bindings", &self.inner.registry.len())
            .field("singletons", &self.inner.singletons.len())
            .field("options", &self.inner.options)
            .finish()
    }
}
