//! Error types for the object-graph container.

use std::sync::Arc;

use thiserror::Error;

use crate::key::Key;

/// Boxed error returned by constructor functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Container errors.
///
/// Every variant is fatal for the resolution that produced it: the container
/// never substitutes a default or retries on its own. Graph problems
/// (`Unresolved`, `DuplicateBinding`, `Circular`, `WrongLifetime`) are reported
/// by [`ServiceCollection::build`](crate::ServiceCollection::build) so a
/// misconfigured graph fails at startup.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{DiError, Key, Resolver, ServiceCollection};
///
/// struct BleManager;
///
/// let provider = ServiceCollection::new().build().unwrap();
/// match provider.get::<BleManager>() {
///     Err(DiError::Unresolved { key, required_by: None }) => {
///         assert_eq!(key, Key::of::<BleManager>());
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No binding for a requested or declared dependency
    #[error("no binding for {key}{}", required_by_suffix(.required_by))]
    Unresolved {
        /// The missing key
        key: Key,
        /// The binding whose dependency list names `key`, if any
        required_by: Option<Key>,
    },
    /// Two bindings registered for the same key
    #[error("duplicate binding for {0}")]
    DuplicateBinding(Key),
    /// Dependency cycle; the path ends with the key that closed the cycle
    #[error("circular dependency: {}", join_path(.0))]
    Circular(Vec<Key>),
    /// A constructor function failed
    #[error("failed to construct {key}: {source}")]
    Construction {
        /// The binding being constructed
        key: Key,
        /// Error returned by the constructor
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// A resolved instance did not have the requested type
    #[error("type mismatch for {0}")]
    TypeMismatch(&'static str),
    /// A key was resolved from a graph that cannot see its lifetime
    #[error("lifetime error for {key}: {reason}")]
    WrongLifetime {
        /// The offending key
        key: Key,
        /// What went wrong
        reason: &'static str,
    },
    /// Resolution stack grew past the configured limit
    #[error("max resolution depth {0} exceeded")]
    DepthExceeded(usize),
    /// A constructor asked for an argument it did not declare
    #[error("argument index {index} out of range ({declared} declared)")]
    ArgumentOutOfRange {
        /// Requested index
        index: usize,
        /// Number of declared dependencies
        declared: usize,
    },
    /// `inject_members` called for a type with no registered injector
    #[error("no members injector registered for {0}")]
    NoMembersInjector(&'static str),
    /// Two members injectors registered for the same target type
    #[error("duplicate members injector for {0}")]
    DuplicateMembersInjector(&'static str),
    /// Container options could not be read
    #[error("invalid container configuration: {0}")]
    InvalidConfig(String),
}

impl DiError {
    /// Wraps a constructor failure for `key`.
    pub(crate) fn construction(key: Key, source: BoxError) -> Self {
        DiError::Construction {
            key,
            source: Arc::from(source),
        }
    }
}

fn required_by_suffix(required_by: &Option<Key>) -> String {
    match required_by {
        Some(owner) => format!(" (required by {})", owner),
        None => String::new(),
    }
}

fn join_path(path: &[Key]) -> String {
    path.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for container operations.
pub type DiResult<T> = Result<T, DiError>;
