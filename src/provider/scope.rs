//! Child scopes.

use std::sync::Arc;

use crate::error::DiResult;
use crate::factory::AnyArc;
use crate::key::Key;
use crate::members::MembersInjector;
use crate::scope_cache::ScopeCache;
use crate::traits::ResolverCore;

use super::ServiceProvider;

/// A child scope of a [`ServiceProvider`].
///
/// Scoped bindings are cached here, one instance per scope; singletons are
/// still served from (and cached in) the root. Clones share the same cache.
///
/// # Examples
///
/// ```
/// use iotlogic_di::{deps, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct DeviceRepository;
/// struct ProvisioningFlow { repo: Arc<DeviceRepository> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_factory::<DeviceRepository, _>(deps![], |_| Ok(DeviceRepository));
/// services.add_scoped_factory::<ProvisioningFlow, _>(deps![DeviceRepository], |d| {
///     Ok(ProvisioningFlow { repo: d.get(0)? })
/// });
///
/// let provider = services.build().unwrap();
/// let scope = provider.create_scope();
/// let flow = scope.get_required::<ProvisioningFlow>();
/// assert!(Arc::ptr_eq(&flow.repo, &provider.get_required::<DeviceRepository>()));
/// ```
#[derive(Clone)]
pub struct Scope {
    root: ServiceProvider,
    cache: Arc<ScopeCache>,
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider) -> Self {
        Self {
            root,
            cache: Arc::new(ScopeCache::new("scoped")),
        }
    }

    /// The provider this scope was created from.
    pub fn root(&self) -> &ServiceProvider {
        &self.root
    }

    /// Populates `target` using the injector registered for `T`; scoped
    /// sites come from this scope.
    pub fn inject_members<T: 'static>(&self, target: &mut T) -> DiResult<()> {
        let injector = self.root.registered_injector::<T>()?;
        self.root.graph(Some(&*self.cache)).inject_members(target, injector)
    }

    /// Populates `target` with an ad-hoc injector.
    pub fn inject_members_with<T: 'static>(&self, target: &mut T, injector: &MembersInjector<T>) -> DiResult<()> {
        self.root.graph(Some(&*self.cache)).inject_members(target, injector)
    }

    /// Number of scoped instances constructed in this scope.
    pub fn scoped_count(&self) -> usize {
        self.cache.len()
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.root.graph(Some(&*self.cache)).resolve(key)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("scoped_instances", &self.cache.len())
            .finish()
    }
}
