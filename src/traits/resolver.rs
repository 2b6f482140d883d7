//! Resolver traits for typed resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::factory::AnyArc;
use crate::key::Key;
use crate::provider::Provider;

/// Object-safe resolution by key.
///
/// Implemented by [`ServiceProvider`](crate::ServiceProvider) and
/// [`Scope`](crate::Scope). Most callers want the typed methods on
/// [`Resolver`], which every `ResolverCore` gets for free.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` with its full dependency subgraph.
    ///
    /// Returns the instance type-erased; concrete bindings are stored as
    /// `Arc<T>`, trait-object bindings as `Arc<Arc<dyn Trait>>`.
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;
}

/// Typed resolution on top of [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use iotlogic_di::{deps, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// trait ApiService: Send + Sync {
///     fn base_url(&self) -> &str;
/// }
///
/// struct HttpApiService;
/// impl ApiService for HttpApiService {
///     fn base_url(&self) -> &str { "https://api.iotlogic.example" }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_named_singleton("broker_url", "tcp://broker:1883".to_string());
/// services.add_singleton_trait::<dyn ApiService>(Arc::new(HttpApiService));
///
/// let provider = services.build().unwrap();
///
/// let broker = provider.get_named::<String>("broker_url").unwrap();
/// assert_eq!(broker.as_str(), "tcp://broker:1883");
///
/// let api = provider.get_required_trait::<dyn ApiService>();
/// assert_eq!(api.base_url(), "https://api.iotlogic.example");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the unqualified binding of the concrete type `T`.
    fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_by_key(&Key::of::<T>())
    }

    /// Resolves the binding of `T` tagged with `qualifier`.
    fn get_named<T: Send + Sync + 'static>(&self, qualifier: &'static str) -> DiResult<Arc<T>> {
        self.get_by_key(&Key::named::<T>(qualifier))
    }

    /// Resolves a concrete binding under an explicit key.
    fn get_by_key<T: Send + Sync + 'static>(&self, key: &Key) -> DiResult<Arc<T>> {
        self.resolve_any(key)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves the unqualified binding of the trait object `T`.
    fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_trait_by_key(&Key::of::<T>())
    }

    /// Resolves the binding of the trait object `T` tagged with `qualifier`.
    fn get_named_trait<T: ?Sized + Send + Sync + 'static>(&self, qualifier: &'static str) -> DiResult<Arc<T>> {
        self.get_trait_by_key(&Key::named::<T>(qualifier))
    }

    /// Resolves a trait-object binding under an explicit key.
    fn get_trait_by_key<T: ?Sized + Send + Sync + 'static>(&self, key: &Key) -> DiResult<Arc<T>> {
        self.resolve_any(key)?
            .downcast::<Arc<T>>()
            .map(|inner| (*inner).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the resolution error if `T` cannot be resolved. Meant for
    /// application bootstrap code where a broken graph should abort.
    fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves the trait object `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the resolution error if `T` cannot be resolved.
    fn get_required_trait<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve trait {}: {}", std::any::type_name::<T>(), e))
    }

    /// Deferred handle that resolves `T` each time [`Provider::get`] is called.
    ///
    /// ```
    /// use iotlogic_di::{deps, Resolver, ServiceCollection};
    /// use std::sync::Arc;
    ///
    /// struct ScanRequest;
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_transient_factory::<ScanRequest, _>(deps![], |_| Ok(ScanRequest));
    /// let provider = services.build().unwrap();
    ///
    /// let requests = provider.provider_of::<ScanRequest>();
    /// let a = requests.get().unwrap();
    /// let b = requests.get().unwrap();
    /// assert!(!Arc::ptr_eq(&a, &b));
    /// ```
    fn provider_of<T: Send + Sync + 'static>(&self) -> Provider<T>
    where
        Self: Clone + Sized + 'static,
    {
        Provider::new(Arc::new(self.clone()), Key::of::<T>())
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
