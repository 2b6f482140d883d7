//! Binding lifetimes.

use std::fmt;

/// Lifetimes controlling instance reuse.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{deps, Lifetime, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct MqttManager;
/// struct SyncSession;
/// struct ScanRequest;
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_factory::<MqttManager, _>(deps![], |_| Ok(MqttManager));
/// services.add_scoped_factory::<SyncSession, _>(deps![], |_| Ok(SyncSession));
/// services.add_transient_factory::<ScanRequest, _>(deps![], |_| Ok(ScanRequest));
///
/// let provider = services.build().unwrap();
///
/// // Singleton: same instance everywhere
/// let scope = provider.create_scope();
/// let a = provider.get_required::<MqttManager>();
/// let b = scope.get_required::<MqttManager>();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Scoped: same within a scope, different across scopes
/// let s1 = scope.get_required::<SyncSession>();
/// let s2 = scope.get_required::<SyncSession>();
/// let other = provider.create_scope().get_required::<SyncSession>();
/// assert!(Arc::ptr_eq(&s1, &s2));
/// assert!(!Arc::ptr_eq(&s1, &other));
///
/// // Transient: always fresh
/// let t1 = provider.get_required::<ScanRequest>();
/// let t2 = provider.get_required::<ScanRequest>();
/// assert!(!Arc::ptr_eq(&t1, &t2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One instance per root container, cached for the container's lifetime.
    Singleton,
    /// One instance per child scope.
    Scoped,
    /// A new instance on every resolution, never cached.
    Transient,
}

impl Lifetime {
    /// Whether instances of this lifetime are memoized in a scope cache.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::Scoped)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("Singleton"),
            Lifetime::Scoped => f.write_str("Scoped"),
            Lifetime::Transient => f.write_str("Transient"),
        }
    }
}
