//! Build-time validation of the declared object graph.
//!
//! Because every factory declares its dependency keys up front, the whole
//! graph can be checked before anything is constructed:
//!
//! - **Missing bindings**: a declared dependency or injection site with no factory
//! - **Cycles**: a key reachable from itself
//! - **Singleton → Scoped**: a singleton would capture one scope's instance,
//!   including through a chain of transients
//! - **Singleton → Transient** (warning): the singleton keeps one transient instance forever

use std::fmt;

use crate::error::DiError;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registry::{Map, ProviderRegistry};

/// A configuration that is legal but probably not what was meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Singleton depends on a transient binding and will only ever see one instance of it
    SingletonDependsOnTransient { singleton: Key, transient: Key },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::SingletonDependsOnTransient { singleton, transient } => write!(
                f,
                "singleton {} captures transient {} for the container's lifetime",
                singleton, transient
            ),
        }
    }
}

/// Outcome of validating a registry.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Problems that make the graph unusable
    pub errors: Vec<DiError>,
    /// Problems worth a log line
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first error, which is what `build()` reports.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, DiError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.warnings),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Resolving,
    Resolved,
}

/// Checks every binding and injection site in `registry`.
pub(crate) fn validate(registry: &ProviderRegistry) -> ValidationReport {
    let mut report = ValidationReport::default();

    for factory in registry.iter() {
        for dep in factory.dependencies() {
            match registry.get(dep) {
                None => report.errors.push(DiError::Unresolved {
                    key: *dep,
                    required_by: Some(factory.key()),
                }),
                Some(target) => match (factory.lifetime(), target.lifetime()) {
                    (Lifetime::Singleton, Lifetime::Scoped) => report.errors.push(DiError::WrongLifetime {
                        key: factory.key(),
                        reason: "singleton depends on a scoped binding",
                    }),
                    (Lifetime::Singleton, Lifetime::Transient) => {
                        if transient_reaches_scoped(registry, *dep, &mut Vec::new()) {
                            report.errors.push(DiError::WrongLifetime {
                                key: factory.key(),
                                reason: "singleton depends on a scoped binding through a transient one",
                            });
                        } else {
                            report.warnings.push(ValidationWarning::SingletonDependsOnTransient {
                                singleton: factory.key(),
                                transient: *dep,
                            });
                        }
                    }
                    _ => {}
                },
            }
        }
    }

    for entry in registry.injectors() {
        for site in &entry.sites {
            if !registry.contains(&site.key) {
                report.errors.push(DiError::Unresolved {
                    key: site.key,
                    required_by: None,
                });
                tracing::debug!(target_type = entry.target_name, field = site.field, "injection site has no binding");
            }
        }
    }

    report.errors.extend(find_cycles(registry));
    report
}

/// Every dependency cycle in `registry`, each reported once.
///
/// Always run by `build()`, even with `validate_on_build` off: a cycle entered
/// from two threads at once would leave each waiting on the other's scope
/// cache slot, out of reach of the per-thread resolution stack.
pub(crate) fn find_cycles(registry: &ProviderRegistry) -> Vec<DiError> {
    let mut cycles = Vec::new();
    let mut marks: Map<Key, Mark> = Map::default();
    for factory in registry.iter() {
        let mut path = Vec::new();
        if let Some(cycle) = find_cycle(registry, factory.key(), &mut marks, &mut path) {
            // Keys left on the path belong to a reported cycle; don't walk into them again.
            for key in path.drain(..) {
                marks.insert(key, Mark::Resolved);
            }
            cycles.push(DiError::Circular(cycle));
        }
    }
    cycles
}

/// Whether the transient binding `key` needs a scoped binding, directly or
/// through further transients. Singletons stop the walk: they are checked on their own.
fn transient_reaches_scoped(registry: &ProviderRegistry, key: Key, seen: &mut Vec<Key>) -> bool {
    if seen.contains(&key) {
        return false;
    }
    seen.push(key);

    let Some(factory) = registry.get(&key) else {
        return false;
    };
    factory.dependencies().iter().any(|dep| match registry.get(dep).map(|f| f.lifetime()) {
        Some(Lifetime::Scoped) => true,
        Some(Lifetime::Transient) => transient_reaches_scoped(registry, *dep, seen),
        _ => false,
    })
}

/// Depth-first walk with Resolving/Resolved marks; returns the first cycle found.
fn find_cycle(
    registry: &ProviderRegistry,
    key: Key,
    marks: &mut Map<Key, Mark>,
    path: &mut Vec<Key>,
) -> Option<Vec<Key>> {
    match marks.get(&key) {
        Some(Mark::Resolved) => return None,
        Some(Mark::Resolving) => {
            let start = path.iter().position(|k| *k == key).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(key);
            return Some(cycle);
        }
        None => {}
    }

    let factory = registry.get(&key)?;
    marks.insert(key, Mark::Resolving);
    path.push(key);

    for dep in factory.dependencies() {
        if let Some(cycle) = find_cycle(registry, *dep, marks, path) {
            return Some(cycle);
        }
    }

    path.pop();
    marks.insert(key, Mark::Resolved);
    None
}
