//! The per-type attribute descriptor store.

use alloc::boxed::Box;
use core::any::{Any, TypeId, type_name};
use core::{error, fmt};

use hashbrown::HashMap;

use crate::descriptor::AttributeDescriptor;

// -----------------------------------------------------------------------------
// Error

/// An error returned from a failed registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The type already has a registered descriptor set.
    DuplicateRegistration { type_name: &'static str },
    /// Two descriptors in one registration share a key.
    DuplicateKey {
        type_name: &'static str,
        key: Box<str>,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRegistration { type_name } => {
                write!(f, "the type `{type_name}` is already registered")
            }
            Self::DuplicateKey { type_name, key } => write!(
                f,
                "the descriptor set for `{type_name}` declares key `{key}` more than once"
            ),
        }
    }
}

impl error::Error for RegistryError {}

// -----------------------------------------------------------------------------
// TypeRegistry

struct TypeEntry {
    type_name: &'static str,
    // Registration order, which also defines enumeration order.
    descriptors: Box<[AttributeDescriptor]>,
    // key -> index into `descriptors`
    by_key: HashMap<Box<str>, usize>,
}

/// Maps a type to its ordered set of [`AttributeDescriptor`]s.
///
/// The registry is append-only: each type is registered exactly once and
/// its descriptor set is immutable afterwards. Registration is expected to
/// happen during a single-threaded initialization phase; once it has
/// completed, any number of threads may perform `&self` lookups
/// concurrently.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use kv_access::{AttributeDescriptor, AttributeKind, ScalarKind, TypeRegistry, ValueBox};
///
/// struct Point {
///     x: f64,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .register::<Point>([AttributeDescriptor::read_only(
///         "x",
///         AttributeKind::Scalar(ScalarKind::Float),
///         |p: &Point| ValueBox::from(p.x),
///     )])
///     .unwrap();
///
/// assert!(registry.contains(TypeId::of::<Point>()));
/// let descriptor = registry.lookup(TypeId::of::<Point>(), "x").unwrap();
/// assert_eq!(descriptor.key(), "x");
/// ```
pub struct TypeRegistry {
    entries: HashMap<TypeId, TypeEntry>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers the descriptor set for `T`, to be called once per type.
    ///
    /// Fails with [`RegistryError::DuplicateRegistration`] if `T` is
    /// already registered, or [`RegistryError::DuplicateKey`] if two
    /// descriptors share a key; in both cases the registry is unchanged.
    pub fn register<T: Any>(
        &mut self,
        descriptors: impl IntoIterator<Item = AttributeDescriptor>,
    ) -> Result<(), RegistryError> {
        let type_id = TypeId::of::<T>();
        let type_name = type_name::<T>();
        if self.entries.contains_key(&type_id) {
            return Err(RegistryError::DuplicateRegistration { type_name });
        }

        let descriptors: Box<[AttributeDescriptor]> = descriptors.into_iter().collect();
        let mut by_key = HashMap::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            if by_key.insert(Box::from(descriptor.key()), index).is_some() {
                return Err(RegistryError::DuplicateKey {
                    type_name,
                    key: Box::from(descriptor.key()),
                });
            }
        }

        log::debug!(
            "registered `{type_name}` with {} attribute(s)",
            descriptors.len()
        );
        self.entries.insert(
            type_id,
            TypeEntry {
                type_name,
                descriptors,
                by_key,
            },
        );
        Ok(())
    }

    /// Whether the type with the given [`TypeId`] has been registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains_key(&type_id)
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no type has been registered yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the descriptor for `key` on the given type, if registered.
    pub fn lookup(&self, type_id: TypeId, key: &str) -> Option<&AttributeDescriptor> {
        let entry = self.entries.get(&type_id)?;
        let index = *entry.by_key.get(key)?;
        entry.descriptors.get(index)
    }

    /// The type name recorded at registration time.
    pub fn type_name(&self, type_id: TypeId) -> Option<&'static str> {
        self.entries.get(&type_id).map(|entry| entry.type_name)
    }

    /// Descriptors of the given type in registration order; empty if the
    /// type is unregistered.
    pub fn attributes(&self, type_id: TypeId) -> impl Iterator<Item = &AttributeDescriptor> {
        self.entries
            .get(&type_id)
            .map(|entry| entry.descriptors.iter())
            .into_iter()
            .flatten()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.values().map(|entry| entry.type_name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::any::TypeId;

    use super::{RegistryError, TypeRegistry};
    use crate::descriptor::{AttributeDescriptor, AttributeKind};
    use crate::value::{ScalarKind, ValueBox};

    struct Pair {
        a: i64,
        b: i64,
    }

    fn descriptor(key: &'static str, getter: fn(&Pair) -> i64) -> AttributeDescriptor {
        AttributeDescriptor::read_only(key, AttributeKind::Scalar(ScalarKind::Int), move |p: &Pair| {
            ValueBox::from(getter(p))
        })
    }

    #[test]
    fn lookup_is_by_key() {
        let mut registry = TypeRegistry::new();
        registry
            .register::<Pair>([descriptor("a", |p| p.a), descriptor("b", |p| p.b)])
            .unwrap();

        let pair = Pair { a: 1, b: 2 };
        let found = registry.lookup(TypeId::of::<Pair>(), "b").unwrap();
        assert_eq!(found.get(&pair).as_int(), Some(2));
        assert!(registry.lookup(TypeId::of::<Pair>(), "c").is_none());
        assert!(registry.lookup(TypeId::of::<i32>(), "a").is_none());
    }

    #[test]
    fn re_registration_is_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register::<Pair>([descriptor("a", |p| p.a)]).unwrap();

        let err = registry
            .register::<Pair>([descriptor("b", |p| p.b)])
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));
        // The original entry survives untouched.
        assert!(registry.lookup(TypeId::of::<Pair>(), "a").is_some());
        assert!(registry.lookup(TypeId::of::<Pair>(), "b").is_none());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register::<Pair>([descriptor("a", |p| p.a), descriptor("a", |p| p.b)])
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { .. }));
        assert!(!registry.contains(TypeId::of::<Pair>()));
    }

    #[test]
    fn enumeration_follows_registration_order() {
        let mut registry = TypeRegistry::new();
        registry
            .register::<Pair>([descriptor("b", |p| p.b), descriptor("a", |p| p.a)])
            .unwrap();

        let keys: Vec<&str> = registry
            .attributes(TypeId::of::<Pair>())
            .map(|d| d.key())
            .collect();
        assert_eq!(keys, ["b", "a"]);
    }
}
