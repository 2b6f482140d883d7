//! Modules: reusable groups of registrations.

use crate::{DiResult, ServiceCollection};

/// A group of bindings registered together, e.g. everything the Bluetooth
/// stack needs.
///
/// # Example
///
/// ```rust
/// use iotlogic_di::{deps, DiResult, Resolver, ServiceCollection, ServiceCollectionExt, ServiceModule};
/// use std::sync::Arc;
///
/// struct BluetoothAdapter;
/// struct BleManager { adapter: Arc<BluetoothAdapter> }
///
/// struct BluetoothModule;
///
/// impl ServiceModule for BluetoothModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.register(iotlogic_di::Factory::instance(
///             iotlogic_di::Key::of::<BluetoothAdapter>(),
///             BluetoothAdapter,
///         ))?;
///         services.add_singleton_factory::<BleManager, _>(deps![BluetoothAdapter], |d| {
///             Ok(BleManager { adapter: d.get(0)? })
///         });
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let provider = ServiceCollection::new().add_module(BluetoothModule)?.build()?;
/// let ble = provider.get_required::<BleManager>();
/// # let _ = &ble.adapter;
/// # Ok(())
/// # }
/// ```
pub trait ServiceModule {
    /// Registers this module's bindings.
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()>;
}

/// Module registration on [`ServiceCollection`].
pub trait ServiceCollectionExt {
    /// Adds a module, taking and returning the collection by value.
    fn add_module<M: ServiceModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;

    /// Adds a module in place.
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_module<M: ServiceModule>(mut self, module: M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }

    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_services(self)?;
        Ok(self)
    }
}
