//! Field injection for objects the container does not construct.
//!
//! Framework-owned objects (activities, services, broadcast receivers,
//! workers) are instantiated elsewhere and handed to the container
//! afterwards. Instead of reflection, each such type is described by a
//! [`MembersInjector`]: a list of injection sites, each with a typed setter.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::factory::AnyArc;
use crate::key::Key;

/// One post-construction field assignment: which field receives which binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionSite {
    /// Field identifier, used in diagnostics
    pub field: &'static str,
    /// Binding assigned into the field
    pub key: Key,
}

type Setter<T> = Box<dyn Fn(&mut T, AnyArc) -> DiResult<()> + Send + Sync>;

/// Type test run on a resolved value before any setter sees it.
#[derive(Clone, Copy)]
struct TypeCheck {
    expected: &'static str,
    matches: fn(&AnyArc) -> bool,
}

impl TypeCheck {
    fn of<V: 'static>(expected: &'static str) -> Self {
        Self {
            expected,
            matches: |value| (**value).is::<V>(),
        }
    }
}

/// Typed setters for the injectable fields of `T`.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{deps, MembersInjector, ServiceCollection};
/// use std::sync::Arc;
///
/// struct LocationManager;
///
/// #[derive(Default)]
/// struct GeofenceReceiver {
///     location_manager: Option<Arc<LocationManager>>,
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_factory::<LocationManager, _>(deps![], |_| Ok(LocationManager));
/// services.add_members_injector(
///     MembersInjector::<GeofenceReceiver>::new()
///         .field::<LocationManager, _>("location_manager", |r, v| r.location_manager = Some(v)),
/// );
/// let provider = services.build().unwrap();
///
/// // Created by the framework, not by the container
/// let mut receiver = GeofenceReceiver::default();
/// provider.inject_members(&mut receiver).unwrap();
/// assert!(receiver.location_manager.is_some());
/// ```
pub struct MembersInjector<T: 'static> {
    sites: Vec<InjectionSite>,
    checks: Vec<TypeCheck>,
    setters: Vec<Setter<T>>,
}

impl<T: 'static> MembersInjector<T> {
    /// Injector with no sites yet.
    pub fn new() -> Self {
        Self {
            sites: Vec::new(),
            checks: Vec::new(),
            setters: Vec::new(),
        }
    }

    /// Adds a site for the concrete binding `D`.
    pub fn field<D, F>(self, field: &'static str, setter: F) -> Self
    where
        D: Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.keyed_field::<D, F>(field, Key::of::<D>(), setter)
    }

    /// Adds a site for the binding of `D` tagged with `qualifier`.
    pub fn named_field<D, F>(self, field: &'static str, qualifier: &'static str, setter: F) -> Self
    where
        D: Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.keyed_field::<D, F>(field, Key::named::<D>(qualifier), setter)
    }

    /// Adds a site for the trait-object binding `D`.
    pub fn trait_field<D, F>(mut self, field: &'static str, setter: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.sites.push(InjectionSite { field, key: Key::of::<D>() });
        self.checks.push(TypeCheck::of::<Arc<D>>(std::any::type_name::<D>()));
        self.setters.push(Box::new(move |target, value| {
            let value = value
                .downcast::<Arc<D>>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<D>()))?;
            setter(target, (*value).clone());
            Ok(())
        }));
        self
    }

    fn keyed_field<D, F>(mut self, field: &'static str, key: Key, setter: F) -> Self
    where
        D: Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.sites.push(InjectionSite { field, key });
        self.checks.push(TypeCheck::of::<D>(std::any::type_name::<D>()));
        self.setters.push(Box::new(move |target, value| {
            let value = value
                .downcast::<D>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<D>()))?;
            setter(target, value);
            Ok(())
        }));
        self
    }

    /// Injection sites in declaration order.
    pub fn sites(&self) -> &[InjectionSite] {
        &self.sites
    }

    /// Assigns already-resolved values into `target`, one per site, in order.
    ///
    /// Each setter runs exactly once. If `resolved` does not line up with the
    /// sites, in count or in type, nothing is assigned.
    pub fn inject(&self, target: &mut T, resolved: Vec<AnyArc>) -> DiResult<()> {
        if resolved.len() != self.sites.len() {
            return Err(DiError::ArgumentOutOfRange {
                index: resolved.len(),
                declared: self.sites.len(),
            });
        }
        if let Some(check) = self
            .checks
            .iter()
            .zip(&resolved)
            .find_map(|(check, value)| (!(check.matches)(value)).then_some(check))
        {
            return Err(DiError::TypeMismatch(check.expected));
        }
        for (setter, value) in self.setters.iter().zip(resolved) {
            setter(target, value)?;
        }
        Ok(())
    }
}

impl<T: 'static> Default for MembersInjector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for MembersInjector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembersInjector")
            .field("target", &std::any::type_name::<T>())
            .field("sites", &self.sites)
            .finish()
    }
}

/// A framework-instantiated type that declares its own injector.
///
/// ```rust
/// use iotlogic_di::{Injectable, MembersInjector};
/// use std::sync::Arc;
///
/// struct MqttManager;
///
/// #[derive(Default)]
/// struct SyncWorker {
///     mqtt: Option<Arc<MqttManager>>,
/// }
///
/// impl Injectable for SyncWorker {
///     fn members_injector() -> MembersInjector<Self> {
///         MembersInjector::<Self>::new().field::<MqttManager, _>("mqtt", |w, v| w.mqtt = Some(v))
///     }
/// }
/// ```
pub trait Injectable: Sized + 'static {
    fn members_injector() -> MembersInjector<Self>;
}
