//! Factories: a constructor plus the ordered keys of its arguments.

use std::any::Any;
use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult};
use crate::key::Key;
use crate::lifetime::Lifetime;

/// Type-erased instance as stored in scope caches.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Return type of constructor functions.
///
/// Constructors may fail with any error; `?` on a [`DiError`] from
/// [`Dependencies::get`] works out of the box.
pub type ConstructResult<T> = Result<T, BoxError>;

type Ctor = dyn Fn(&Dependencies) -> ConstructResult<AnyArc> + Send + Sync;

/// Binding of one key to a constructor and its declared dependencies.
///
/// A factory is created once while the graph is declared and is immutable
/// afterwards. It does not cache: [`create`](Factory::create) runs the
/// constructor every time. Reuse is the scope cache's job.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{deps, AnyArc, Dependencies, Factory, Key, Lifetime};
/// use std::sync::Arc;
///
/// struct ApiService;
/// struct ApiClient { service: Arc<ApiService> }
///
/// let factory = Factory::new::<ApiClient, _>(Lifetime::Singleton, deps![ApiService], |deps| {
///     Ok(ApiClient { service: deps.get::<ApiService>(0)? })
/// });
/// assert_eq!(factory.dependencies(), &[Key::of::<ApiService>()]);
///
/// let args = Dependencies::new(factory.dependencies().to_vec(), vec![Arc::new(ApiService) as AnyArc]);
/// let client = factory.create(&args).unwrap().downcast::<ApiClient>().unwrap();
/// let _ = &client.service;
/// ```
#[derive(Clone)]
pub struct Factory {
    key: Key,
    lifetime: Lifetime,
    dependencies: Vec<Key>,
    ctor: Arc<Ctor>,
    impl_type_name: &'static str,
}

impl Factory {
    /// Factory for the concrete type `T`, keyed by `Key::of::<T>()`.
    pub fn new<T, F>(lifetime: Lifetime, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<T> + Send + Sync + 'static,
    {
        Self::keyed::<T, F>(Key::of::<T>(), lifetime, dependencies, ctor)
    }

    /// Factory for the concrete type `T` under an explicit key (usually a qualified one).
    pub fn keyed<T, F>(key: Key, lifetime: Lifetime, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<T> + Send + Sync + 'static,
    {
        Self {
            key,
            lifetime,
            dependencies: dependencies.into_iter().collect(),
            ctor: Arc::new(move |deps: &Dependencies| -> ConstructResult<AnyArc> {
                Ok(Arc::new(ctor(deps)?) as AnyArc)
            }),
            impl_type_name: std::any::type_name::<T>(),
        }
    }

    /// Factory binding the trait object `Tr` to whatever `Arc<Tr>` the constructor returns.
    ///
    /// Trait objects are stored as `Arc<Arc<dyn Tr>>` so they survive type erasure.
    pub fn for_trait<Tr, F>(key: Key, lifetime: Lifetime, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> Self
    where
        Tr: ?Sized + Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<Arc<Tr>> + Send + Sync + 'static,
    {
        Self {
            key,
            lifetime,
            dependencies: dependencies.into_iter().collect(),
            ctor: Arc::new(move |deps: &Dependencies| -> ConstructResult<AnyArc> {
                Ok(Arc::new(ctor(deps)?) as AnyArc)
            }),
            impl_type_name: std::any::type_name::<Tr>(),
        }
    }

    /// Singleton binding of an already-built instance.
    pub fn instance<T: Send + Sync + 'static>(key: Key, value: T) -> Self {
        let arc: AnyArc = Arc::new(value);
        Self {
            key,
            lifetime: Lifetime::Singleton,
            dependencies: Vec::new(),
            ctor: Arc::new(move |_: &Dependencies| -> ConstructResult<AnyArc> { Ok(arc.clone()) }),
            impl_type_name: std::any::type_name::<T>(),
        }
    }

    /// Runs the constructor with already-resolved arguments.
    ///
    /// Constructor errors come back as [`DiError::Construction`] for this
    /// factory's key.
    pub fn create(&self, args: &Dependencies) -> DiResult<AnyArc> {
        (self.ctor)(args).map_err(|source| DiError::construction(self.key, source))
    }

    /// The key this factory is bound to.
    pub fn key(&self) -> Key {
        self.key
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Dependency keys in constructor-argument order.
    pub fn dependencies(&self) -> &[Key] {
        &self.dependencies
    }

    /// Name of the type the constructor produces.
    pub fn impl_type_name(&self) -> &'static str {
        self.impl_type_name
    }
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("dependencies", &self.dependencies)
            .field("impl_type_name", &self.impl_type_name)
            .finish()
    }
}

/// Resolved constructor arguments, in declared order.
pub struct Dependencies {
    keys: Vec<Key>,
    values: Vec<AnyArc>,
}

impl Dependencies {
    /// Pairs declared keys with their resolved instances.
    pub fn new(keys: Vec<Key>, values: Vec<AnyArc>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self { keys, values }
    }

    pub(crate) fn empty() -> Self {
        Self { keys: Vec::new(), values: Vec::new() }
    }

    /// Typed access to the concrete argument at `index`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.raw(index)?
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Typed access to the trait-object argument at `index`.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.raw(index)?
            .clone()
            .downcast::<Arc<T>>()
            .map(|inner| (*inner).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// The type-erased argument at `index`.
    pub fn raw(&self, index: usize) -> DiResult<&AnyArc> {
        self.values.get(index).ok_or(DiError::ArgumentOutOfRange {
            index,
            declared: self.values.len(),
        })
    }

    /// Declared keys, in order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
