//! Object-graph resolution.
//!
//! A key moves through three states while it is resolved:
//!
//! - *Unresolved*: nothing has been done yet.
//! - *Resolving*: the key is on the thread's resolution stack while its
//!   dependencies are walked depth-first in declared order. Entering it again
//!   is a cycle.
//! - *Resolved*: the constructor ran (or the scope cache already had the
//!   instance) and the value is returned, published first if the key is scoped.

use std::time::Instant;

use crate::error::{DiError, DiResult};
use crate::factory::{AnyArc, Dependencies, Factory};
use crate::internal::ResolutionGuard;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::members::MembersInjector;
use crate::observer::Observers;
use crate::registry::ProviderRegistry;
use crate::scope_cache::ScopeCache;

/// Resolves keys against a registry and the scope caches visible from one resolver.
#[derive(Clone, Copy)]
pub(crate) struct GraphBuilder<'a> {
    registry: &'a ProviderRegistry,
    singletons: &'a ScopeCache,
    scoped: Option<&'a ScopeCache>,
    observers: &'a Observers,
    max_depth: usize,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(
        registry: &'a ProviderRegistry,
        singletons: &'a ScopeCache,
        scoped: Option<&'a ScopeCache>,
        observers: &'a Observers,
        max_depth: usize,
    ) -> Self {
        Self {
            registry,
            singletons,
            scoped,
            observers,
            max_depth,
        }
    }

    /// Resolves `key` and everything it depends on.
    pub(crate) fn resolve(&self, key: &Key) -> DiResult<AnyArc> {
        let factory = self.registry.lookup(key)?;

        match factory.lifetime() {
            Lifetime::Singleton => {
                if let Some(hit) = self.cached(self.singletons, key) {
                    return Ok(hit);
                }
                let _guard = ResolutionGuard::enter(*key, self.max_depth)?;
                // Singletons only ever see the root graph.
                let root = Self { scoped: None, ..*self };
                self.singletons.get_or_create(key, || root.construct(factory))
            }
            Lifetime::Scoped => {
                let cache = self.scoped.ok_or(DiError::WrongLifetime {
                    key: *key,
                    reason: "scoped binding resolved outside of a scope",
                })?;
                if let Some(hit) = self.cached(cache, key) {
                    return Ok(hit);
                }
                let _guard = ResolutionGuard::enter(*key, self.max_depth)?;
                cache.get_or_create(key, || self.construct(factory))
            }
            Lifetime::Transient => {
                let _guard = ResolutionGuard::enter(*key, self.max_depth)?;
                self.construct(factory)
            }
        }
    }

    /// Resolves every site of `injector`, then hands the values to its setters.
    pub(crate) fn inject_members<T: 'static>(&self, target: &mut T, injector: &MembersInjector<T>) -> DiResult<()> {
        let resolved = injector
            .sites()
            .iter()
            .map(|site| self.resolve(&site.key))
            .collect::<DiResult<Vec<_>>>()?;

        tracing::debug!(
            target_type = std::any::type_name::<T>(),
            fields = resolved.len(),
            "injecting members"
        );
        injector.inject(target, resolved)
    }

    fn cached(&self, cache: &ScopeCache, key: &Key) -> Option<AnyArc> {
        let hit = cache.get(key)?;
        tracing::trace!(scope = cache.label(), key = %key, "resolved from cache");
        if self.observers.has_observers() {
            self.observers.cache_hit(key);
        }
        Some(hit)
    }

    fn construct(&self, factory: &Factory) -> DiResult<AnyArc> {
        let key = factory.key();
        let started = self.observers.has_observers().then(|| {
            self.observers.resolving(&key);
            Instant::now()
        });

        let result = self
            .resolve_dependencies(factory)
            .and_then(|args| factory.create(&args));

        match &result {
            Ok(_) => {
                tracing::debug!(key = %key, lifetime = %factory.lifetime(), "constructed");
                if let Some(started) = started {
                    self.observers.resolved(&key, started.elapsed());
                }
            }
            Err(err) => {
                match err {
                    DiError::Construction { key: failed, .. } if *failed == key => {
                        tracing::error!(key = %key, error = %err, "constructor failed")
                    }
                    _ => tracing::debug!(key = %key, error = %err, "dependency resolution failed"),
                }
                if started.is_some() {
                    self.observers.construction_failed(&key, err);
                }
            }
        }
        result
    }

    fn resolve_dependencies(&self, factory: &Factory) -> DiResult<Dependencies> {
        let declared = factory.dependencies();
        if declared.is_empty() {
            return Ok(Dependencies::empty());
        }

        let mut values = Vec::with_capacity(declared.len());
        for dep in declared {
            let value = self.resolve(dep).map_err(|err| match err {
                DiError::Unresolved { key, required_by: None } if key == *dep => DiError::Unresolved {
                    key,
                    required_by: Some(factory.key()),
                },
                other => other,
            })?;
            values.push(value);
        }
        Ok(Dependencies::new(declared.to_vec(), values))
    }
}
