//! # iotlogic-di
//!
//! Application-wide object-graph container: declare how each component is
//! built and what it needs, then let the container construct, cache and hand
//! out fully-wired instances.
//!
//! ## Features
//!
//! - **Declared dependencies**: every binding lists the [`Key`]s it needs, so
//!   missing bindings and cycles are caught when the graph is built
//! - **Lifetimes**: Singleton (once per container), Scoped (once per [`Scope`]) and Transient
//! - **Qualified keys**: several bindings of one type told apart by a tag
//! - **Trait bindings**: `dyn Trait` keys bound to a concrete implementation
//! - **Members injection**: fill the fields of framework-created objects
//! - **Thread-safe**: one construction per cached key, even under contention
//!
//! ## Quick Start
//!
//! ```rust
//! use iotlogic_di::{deps, Resolver, ServiceCollection};
//! use std::sync::Arc;
//!
//! struct ApiService {
//!     base_url: String,
//! }
//!
//! struct ApiClient {
//!     service: Arc<ApiService>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton_factory::<ApiService, _>(deps![], |_| {
//!     Ok(ApiService { base_url: "https://api.iotlogic.example".to_string() })
//! });
//! services.add_singleton_factory::<ApiClient, _>(deps![ApiService], |d| {
//!     Ok(ApiClient { service: d.get(0)? })
//! });
//!
//! let provider = services.build().unwrap();
//! let client = provider.get_required::<ApiClient>();
//! assert_eq!(client.service.base_url, "https://api.iotlogic.example");
//!
//! // Singletons are constructed once
//! assert!(Arc::ptr_eq(&client, &provider.get_required::<ApiClient>()));
//! ```
//!
//! ## Failures
//!
//! Resolution never panics unless you ask it to (`get_required*`). Constructor
//! errors come back as [`DiError::Construction`] and are not cached, so the
//! next request runs the constructor again.
//!
//! ```rust
//! use iotlogic_di::{deps, DiError, Resolver, ServiceCollection};
//!
//! struct WifiManager;
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton_factory::<WifiManager, _>(deps![], |_| Err("radio off".into()));
//!
//! let provider = services.build().unwrap();
//! assert!(matches!(provider.get::<WifiManager>(), Err(DiError::Construction { .. })));
//! ```

pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod factory;
pub mod key;
pub mod lifetime;
pub mod members;
pub mod observer;
pub mod provider;
pub mod registry;
pub mod scope_cache;
pub mod traits;
pub mod validation;

mod graph;
mod internal;

pub use collection::{ServiceCollection, ServiceCollectionExt, ServiceModule};
pub use config::ContainerOptions;
pub use descriptors::ServiceDescriptor;
pub use error::{BoxError, DiError, DiResult};
pub use factory::{AnyArc, ConstructResult, Dependencies, Factory};
pub use key::{key_of_type, Key};
pub use lifetime::Lifetime;
pub use members::{Injectable, InjectionSite, MembersInjector};
pub use observer::{DiObserver, MetricsObserver};
pub use provider::{Provider, Scope, ServiceProvider};
pub use registry::ProviderRegistry;
pub use scope_cache::ScopeCache;
pub use traits::{Resolver, ResolverCore};
pub use validation::{ValidationReport, ValidationWarning};
