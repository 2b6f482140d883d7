//! Service collection: the registration surface.
//!
//! Bindings are declared here at startup, next to the code that knows what
//! each type needs, and turned into a read-only [`ServiceProvider`] by
//! [`build`](ServiceCollection::build).

use std::any::TypeId;
use std::sync::Arc;

use crate::config::ContainerOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::factory::{ConstructResult, Dependencies, Factory};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::members::{Injectable, MembersInjector};
use crate::observer::{DiObserver, Observers};
use crate::registry::{InjectorEntry, ProviderRegistry};
use crate::validation::{self, ValidationReport};
use crate::ServiceProvider;

pub mod module_system;
pub use module_system::*;

/// Builder for the object graph.
///
/// The chaining `add_*` methods never fail on the spot: a duplicate binding is
/// recorded and reported by [`build`](Self::build), so the whole registration
/// block reads as a declarative list. Use [`register`](Self::register) to see
/// the error immediately.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{deps, Key, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Context { package: &'static str }
/// struct ApiService;
/// struct ApiClient { service: Arc<ApiService> }
/// struct DeviceRepository { ctx: Arc<Context>, api: Arc<ApiClient> }
///
/// let mut services = ServiceCollection::new();
/// services
///     .add_named_singleton("application_context", Context { package: "com.iotlogic" })
///     .add_singleton_factory::<ApiService, _>(deps![], |_| Ok(ApiService))
///     .add_singleton_factory::<ApiClient, _>(deps![ApiService], |d| {
///         Ok(ApiClient { service: d.get(0)? })
///     })
///     .add_singleton_factory::<DeviceRepository, _>(
///         [Key::named::<Context>("application_context"), Key::of::<ApiClient>()],
///         |d| Ok(DeviceRepository { ctx: d.get(0)?, api: d.get(1)? }),
///     );
///
/// let provider = services.build().unwrap();
/// let repo = provider.get_required::<DeviceRepository>();
/// assert_eq!(repo.ctx.package, "com.iotlogic");
/// assert!(Arc::ptr_eq(&repo.api, &provider.get_required::<ApiClient>()));
/// ```
pub struct ServiceCollection {
    registry: ProviderRegistry,
    observers: Observers,
    options: ContainerOptions,
    errors: Vec<DiError>,
}

impl ServiceCollection {
    /// Creates an empty collection with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates an empty collection with the given options.
    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            registry: ProviderRegistry::new(),
            observers: Observers::new(),
            options,
            errors: Vec::new(),
        }
    }

    /// Mutable access to the options used by `build()`.
    pub fn options_mut(&mut self) -> &mut ContainerOptions {
        &mut self.options
    }

    /// Adds a factory, failing immediately if its key is already bound.
    pub fn register(&mut self, factory: Factory) -> DiResult<&mut Self> {
        self.registry.register(factory)?;
        Ok(self)
    }

    fn push(&mut self, factory: Factory) -> &mut Self {
        if let Err(err) = self.registry.register(factory) {
            tracing::debug!(error = %err, "registration rejected");
            self.errors.push(err);
        }
        self
    }

    // ----- Instance bindings -----

    /// Binds an already-built singleton instance of `T`.
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.push(Factory::instance(Key::of::<T>(), value))
    }

    /// Binds an already-built singleton instance of `T` under a qualifier.
    pub fn add_named_singleton<T: Send + Sync + 'static>(&mut self, qualifier: &'static str, value: T) -> &mut Self {
        self.push(Factory::instance(Key::named::<T>(qualifier), value))
    }

    /// Binds the trait object `T` to an already-built implementation.
    pub fn add_singleton_trait<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) -> &mut Self {
        self.push(Factory::instance(Key::of::<T>(), value))
    }

    // ----- Concrete factories -----

    /// Binds `T` to a constructor run once per container.
    ///
    /// ```rust
    /// use iotlogic_di::{deps, Resolver, ServiceCollection};
    /// use std::sync::Arc;
    ///
    /// struct BluetoothAdapter;
    /// struct BleManager { adapter: Arc<BluetoothAdapter> }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(BluetoothAdapter);
    /// services.add_singleton_factory::<BleManager, _>(deps![BluetoothAdapter], |d| {
    ///     Ok(BleManager { adapter: d.get(0)? })
    /// });
    ///
    /// let provider = services.build().unwrap();
    /// let ble = provider.get_required::<BleManager>();
    /// assert!(Arc::ptr_eq(&ble, &provider.get_required::<BleManager>()));
    /// ```
    pub fn add_singleton_factory<T, F>(&mut self, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<T> + Send + Sync + 'static,
    {
        self.push(Factory::new::<T, F>(Lifetime::Singleton, dependencies, ctor))
    }

    /// Binds `T` to a constructor run once per scope.
    pub fn add_scoped_factory<T, F>(&mut self, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<T> + Send + Sync + 'static,
    {
        self.push(Factory::new::<T, F>(Lifetime::Scoped, dependencies, ctor))
    }

    /// Binds `T` to a constructor run on every resolution.
    pub fn add_transient_factory<T, F>(&mut self, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<T> + Send + Sync + 'static,
    {
        self.push(Factory::new::<T, F>(Lifetime::Transient, dependencies, ctor))
    }

    /// Binds `T` under a qualifier with the given lifetime.
    ///
    /// ```rust
    /// use iotlogic_di::{deps, Lifetime, Resolver, ServiceCollection};
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_named_factory::<String, _>("mqtt_client_id", Lifetime::Singleton, deps![], |_| {
    ///     Ok("iotlogic-android".to_string())
    /// });
    ///
    /// let provider = services.build().unwrap();
    /// assert_eq!(provider.get_named::<String>("mqtt_client_id").unwrap().as_str(), "iotlogic-android");
    /// ```
    pub fn add_named_factory<T, F>(
        &mut self,
        qualifier: &'static str,
        lifetime: Lifetime,
        dependencies: impl IntoIterator<Item = Key>,
        ctor: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<T> + Send + Sync + 'static,
    {
        self.push(Factory::keyed::<T, F>(Key::named::<T>(qualifier), lifetime, dependencies, ctor))
    }

    // ----- Trait factories -----

    /// Binds the trait object `Tr` to an implementation built once per container.
    ///
    /// ```rust
    /// use iotlogic_di::{deps, Resolver, ServiceCollection};
    /// use std::sync::Arc;
    ///
    /// trait NotificationSink: Send + Sync {
    ///     fn channel(&self) -> &'static str;
    /// }
    /// struct PushSink;
    /// impl NotificationSink for PushSink {
    ///     fn channel(&self) -> &'static str { "push" }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_trait_factory::<dyn NotificationSink, _>(deps![], |_| Ok(Arc::new(PushSink)));
    ///
    /// let provider = services.build().unwrap();
    /// assert_eq!(provider.get_required_trait::<dyn NotificationSink>().channel(), "push");
    /// ```
    pub fn add_singleton_trait_factory<Tr, F>(&mut self, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> &mut Self
    where
        Tr: ?Sized + Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<Arc<Tr>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<Tr, F>(Lifetime::Singleton, dependencies, ctor)
    }

    /// Binds the trait object `Tr` to an implementation built once per scope.
    pub fn add_scoped_trait_factory<Tr, F>(&mut self, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> &mut Self
    where
        Tr: ?Sized + Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<Arc<Tr>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<Tr, F>(Lifetime::Scoped, dependencies, ctor)
    }

    /// Binds the trait object `Tr` to an implementation built on every resolution.
    pub fn add_transient_trait_factory<Tr, F>(&mut self, dependencies: impl IntoIterator<Item = Key>, ctor: F) -> &mut Self
    where
        Tr: ?Sized + Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<Arc<Tr>> + Send + Sync + 'static,
    {
        self.add_trait_factory::<Tr, F>(Lifetime::Transient, dependencies, ctor)
    }

    /// Binds the trait object `Tr` with an explicit lifetime.
    pub fn add_trait_factory<Tr, F>(
        &mut self,
        lifetime: Lifetime,
        dependencies: impl IntoIterator<Item = Key>,
        ctor: F,
    ) -> &mut Self
    where
        Tr: ?Sized + Send + Sync + 'static,
        F: Fn(&Dependencies) -> ConstructResult<Arc<Tr>> + Send + Sync + 'static,
    {
        self.push(Factory::for_trait::<Tr, F>(Key::of::<Tr>(), lifetime, dependencies, ctor))
    }

    // ----- Members injection -----

    /// Registers the injector used by `inject_members` for targets of type `T`.
    pub fn add_members_injector<T: 'static>(&mut self, injector: MembersInjector<T>) -> &mut Self {
        let entry = InjectorEntry {
            target_name: std::any::type_name::<T>(),
            sites: injector.sites().to_vec(),
            injector: Box::new(injector),
        };
        if let Err(err) = self.registry.register_injector(TypeId::of::<T>(), entry) {
            self.errors.push(err);
        }
        self
    }

    /// Registers the injector `T` declares for itself.
    pub fn add_injectable<T: Injectable>(&mut self) -> &mut Self {
        self.add_members_injector(T::members_injector())
    }

    // ----- Observation & introspection -----

    /// Adds an observer notified of every construction and cache hit.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Descriptors of every binding registered so far, in registration order.
    pub fn get_service_descriptors(&self) -> Vec<ServiceDescriptor> {
        self.registry.iter().map(ServiceDescriptor::from_factory).collect()
    }

    /// Whether `key` has a binding.
    pub fn contains(&self, key: &Key) -> bool {
        self.registry.contains(key)
    }

    /// Validates the graph as declared so far without building it.
    ///
    /// Recorded registration errors come first, followed by graph errors.
    ///
    /// ```rust
    /// use iotlogic_di::{deps, DiError, Key, ServiceCollection};
    ///
    /// struct GeofenceManager;
    /// struct LocationManager;
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_factory::<GeofenceManager, _>(deps![LocationManager], |_| Ok(GeofenceManager));
    ///
    /// let report = services.validate();
    /// assert!(!report.is_valid());
    /// assert!(matches!(
    ///     &report.errors[0],
    ///     DiError::Unresolved { key, .. } if *key == Key::of::<LocationManager>()
    /// ));
    /// ```
    pub fn validate(&self) -> ValidationReport {
        let mut report = validation::validate(&self.registry);
        let mut errors = self.errors.clone();
        errors.append(&mut report.errors);
        report.errors = errors;
        report
    }

    /// Builds the provider.
    ///
    /// Fails with the first recorded registration error, then with the first
    /// graph error. Turning `validate_on_build` off skips the missing-binding
    /// and lifetime checks; cycles are rejected regardless. With
    /// `eager_singletons` on, every singleton is constructed before this returns.
    pub fn build(self) -> DiResult<ServiceProvider> {
        if let Some(err) = self.errors.into_iter().next() {
            tracing::error!(error = %err, "object graph rejected");
            return Err(err);
        }

        let report = if self.options.validate_on_build {
            validation::validate(&self.registry)
        } else {
            ValidationReport {
                errors: validation::find_cycles(&self.registry),
                warnings: Vec::new(),
            }
        };
        let warnings = report.into_result().map_err(|err| {
            tracing::error!(error = %err, "object graph rejected");
            err
        })?;
        for warning in &warnings {
            tracing::warn!(%warning, "object graph warning");
        }

        let bindings = self.registry.len();
        let eager = self.options.eager_singletons;
        let provider = ServiceProvider::new(self.registry, self.observers, self.options);
        tracing::debug!(bindings, eager, "object graph built");

        if eager {
            provider.prewarm_singletons()?;
        }
        Ok(provider)
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("bindings", &self.registry.len())
            .field("pending_errors", &self.errors.len())
            .field("options", &self.options)
            .finish()
    }
}
