//! Binding keys for the object graph.

use std::any::TypeId;
use std::fmt;

/// Key identifying one binding in the object graph.
///
/// A key is a declared type plus an optional qualifier tag, the same pair an
/// `@Named("application_context") Context` parameter carries. The declared type
/// can be a concrete type or a trait object (`dyn ApiService`), which is how
/// interface bindings are keyed.
///
/// Equality, hashing and ordering only look at the `TypeId` and the
/// qualifier; the type name is kept for diagnostics.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::Key;
///
/// struct Context;
/// trait ApiService: Send + Sync {}
///
/// let plain = Key::of::<Context>();
/// let app_ctx = Key::named::<Context>("application_context");
/// let api = Key::of::<dyn ApiService>();
///
/// assert_ne!(plain, app_ctx);
/// assert_eq!(app_ctx, plain.with_qualifier("application_context"));
/// assert_eq!(app_ctx.qualifier(), Some("application_context"));
/// assert!(api.type_name().contains("ApiService"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    type_name: &'static str,
    qualifier: Option<&'static str>,
}

impl Key {
    /// Key for an unqualified binding of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: None,
        }
    }

    /// Key for a binding of `T` tagged with `qualifier`.
    #[inline]
    pub fn named<T: ?Sized + 'static>(qualifier: &'static str) -> Self {
        Self::of::<T>().with_qualifier(qualifier)
    }

    /// Same type, different qualifier.
    #[inline]
    pub fn with_qualifier(mut self, qualifier: &'static str) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    /// The `TypeId` of the declared type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Human-readable name of the declared type (`std::any::type_name`).
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Qualifier tag, or `None` for unqualified bindings.
    #[inline]
    pub fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }

    /// Whether this key carries a qualifier.
    #[inline]
    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.qualifier == other.qualifier
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.qualifier.hash(state);
    }
}

impl PartialOrd for Key {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Some(q) => write!(f, "{}[\"{}\"]", self.type_name, q),
            None => f.write_str(self.type_name),
        }
    }
}

/// Helper for creating unqualified type keys.
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}

/// Builds an ordered dependency list for a factory registration.
///
/// ```rust
/// use iotlogic_di::{deps, Key};
///
/// struct ApiService;
/// trait Clock: Send + Sync {}
///
/// let list = deps![ApiService, dyn Clock];
/// assert_eq!(list, [Key::of::<ApiService>(), Key::of::<dyn Clock>()]);
/// assert!(deps![].is_empty());
/// ```
#[macro_export]
macro_rules! deps {
    () => {{
        let keys: [$crate::Key; 0] = [];
        keys
    }};
    ($($t:ty),+ $(,)?) => {
        [$($crate::Key::of::<$t>()),+]
    };
}
