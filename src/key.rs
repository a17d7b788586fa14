//! Convenience key type for scope stores.

use std::any::TypeId;
use std::fmt;

/// Key identifying a dependency inside a scope.
///
/// Scopes accept any `Eq + Hash + Clone` key and never look inside it. `Key`
/// is the shape most containers want: a type identity plus an optional
/// discriminating name, so one type can be stored several times.
///
/// # Key Types
///
/// - **Type**: one instance per concrete type
/// - **TypeNamed**: several instances of one type, told apart by name
/// - **Name**: a plain string key not tied to any type
///
/// # Examples
///
/// ```rust
/// use ferrous_scopes::{key_of_named, key_of_type, Key, ProcessScope, Scope};
/// use std::any::Any;
/// use std::sync::Arc;
///
/// type AnyArc = Arc<dyn Any + Send + Sync>;
///
/// let scope = ProcessScope::<Key, AnyArc>::new();
/// scope.set(key_of_type::<u32>(), Arc::new(42u32) as AnyArc);
/// scope.set(key_of_named::<u32>("port"), Arc::new(8080u32) as AnyArc);
///
/// let port = scope.get(&key_of_named::<u32>("port")).unwrap();
/// assert_eq!(port.downcast_ref::<u32>(), Some(&8080));
/// assert!(scope.get(&Key::Name("missing")).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    ///
    /// The TypeId provides the identity; the name only helps debugging.
    Type(TypeId, &'static str),
    /// Named concrete type key with TypeId, typename, and name
    ///
    /// Like `Type` but with an additional string name for cases where
    /// multiple instances of the same type need different bindings.
    TypeNamed(TypeId, &'static str, &'static str),
    /// Free-form key
    Name(&'static str),
}

impl Key {
    /// Get the type name (or the free-form name) for display
    ///
    /// ```rust
    /// use ferrous_scopes::{key_of_named, Key};
    ///
    /// assert_eq!(key_of_named::<u32>("port").display_name(), "u32");
    /// assert_eq!(Key::Name("config").display_name(), "config");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::TypeNamed(_, name, _) => name,
            Key::Name(name) => name,
        }
    }

    /// Get the discriminating name for named keys, or None for type keys
    ///
    /// ```rust
    /// use ferrous_scopes::{key_of_named, key_of_type, Key};
    ///
    /// assert_eq!(key_of_type::<String>().service_name(), None);
    /// assert_eq!(key_of_named::<u32>("database_port").service_name(), Some("database_port"));
    /// assert_eq!(Key::Name("config").service_name(), Some("config"));
    /// ```
    pub fn service_name(&self) -> Option<&'static str> {
        match self {
            Key::Type(_, _) => None,
            Key::TypeNamed(_, _, name) => Some(name),
            Key::Name(name) => Some(name),
        }
    }

    /// The `TypeId` behind type keys.
    pub fn concrete_type(&self) -> Option<TypeId> {
        match self {
            Key::Type(id, _) | Key::TypeNamed(id, _, _) => Some(*id),
            Key::Name(_) => None,
        }
    }
}

// Identity is the TypeId (plus name); the diagnostic type name is ignored
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::TypeNamed(a, _, name_a), Key::TypeNamed(b, _, name_b)) => a == b && name_a == name_b,
            (Key::Name(a), Key::Name(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::TypeNamed(id, _, name) => {
                1u8.hash(state);
                id.hash(state);
                name.hash(state);
            }
            Key::Name(name) => {
                2u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Type(_, type_name) => f.write_str(type_name),
            Key::TypeNamed(_, type_name, name) => write!(f, "{}[{}]", type_name, name),
            Key::Name(name) => f.write_str(name),
        }
    }
}

/// Key for the unnamed binding of `T`.
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for the binding of `T` registered under `name`.
#[inline(always)]
pub fn key_of_named<T: ?Sized + 'static>(name: &'static str) -> Key {
    Key::TypeNamed(TypeId::of::<T>(), std::any::type_name::<T>(), name)
}
