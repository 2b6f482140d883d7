//! Binding descriptors for introspection and diagnostics.

use crate::factory::Factory;
use crate::key::Key;
use crate::lifetime::Lifetime;

/// Read-only description of one binding.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{deps, Key, Lifetime, ServiceCollection};
///
/// struct Context;
/// struct MqttManager;
///
/// let mut services = ServiceCollection::new();
/// services.add_named_singleton("application_context", Context);
/// services.add_singleton_factory::<MqttManager, _>(
///     [Key::named::<Context>("application_context")],
///     |_| Ok(MqttManager),
/// );
///
/// let descriptors = services.get_service_descriptors();
/// let ctx = &descriptors[0];
/// assert_eq!(ctx.qualifier(), Some("application_context"));
///
/// let mqtt = &descriptors[1];
/// assert_eq!(mqtt.lifetime, Lifetime::Singleton);
/// assert_eq!(mqtt.dependencies, vec![Key::named::<Context>("application_context")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// The key the binding is registered under
    pub key: Key,
    pub lifetime: Lifetime,
    /// Declared dependencies, in constructor-argument order
    pub dependencies: Vec<Key>,
    /// Name of the type the constructor produces
    pub impl_type_name: &'static str,
}

impl ServiceDescriptor {
    pub(crate) fn from_factory(factory: &Factory) -> Self {
        Self {
            key: factory.key(),
            lifetime: factory.lifetime(),
            dependencies: factory.dependencies().to_vec(),
            impl_type_name: factory.impl_type_name(),
        }
    }

    /// Name of the declared type.
    pub fn type_name(&self) -> &'static str {
        self.key.type_name()
    }

    pub fn qualifier(&self) -> Option<&'static str> {
        self.key.qualifier()
    }

    /// Whether the binding has no dependencies.
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }
}
