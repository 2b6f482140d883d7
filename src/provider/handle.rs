//! Deferred resolution handles.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::traits::ResolverCore;

/// Deferred handle for one binding.
///
/// Nothing is resolved until [`get`](Provider::get) is called, and every call
/// resolves again: singletons come back identical, transients come back fresh.
/// Handy for code that needs an instance later or repeatedly.
pub struct Provider<T: Send + Sync + 'static> {
    resolver: Arc<dyn ResolverCore>,
    key: Key,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Provider<T> {
    pub(crate) fn new(resolver: Arc<dyn ResolverCore>, key: Key) -> Self {
        Self {
            resolver,
            key,
            _marker: PhantomData,
        }
    }

    /// Resolves the binding now.
    pub fn get(&self) -> DiResult<Arc<T>> {
        self.resolver
            .resolve_any(&self.key)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

impl<T: Send + Sync + 'static> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("key", &self.key).finish()
    }
}
