//! The top-level get/set engine: resolves keys and dotted key paths
//! against the registry and applies the coercion and fallback policy.

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::access::{AccessError, KeyPath};
use crate::descriptor::AttributeDescriptor;
use crate::registry::TypeRegistry;
use crate::value::{ObjectHandle, ValueBox};

// -----------------------------------------------------------------------------
// Unknown-key policy

/// What [`AccessEngine::get`] does when a key is not registered for the
/// resolved type. Fixed at engine build time.
///
/// `set` is unaffected: setting an unknown key always fails with
/// [`AccessError::UnknownKey`].
pub enum UnknownKeyPolicy {
    /// Fail with [`AccessError::UnknownKey`]. The default.
    Fail,
    /// Resolve to [`ValueBox::Null`] instead of failing.
    ReturnNull,
    /// Invoke a handler with the instance and the unknown key, and resolve
    /// to whatever it returns.
    Handler(Box<dyn Fn(&dyn Any, &str) -> ValueBox + Send + Sync>),
}

impl Default for UnknownKeyPolicy {
    #[inline]
    fn default() -> Self {
        Self::Fail
    }
}

impl fmt::Debug for UnknownKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => f.write_str("Fail"),
            Self::ReturnNull => f.write_str("ReturnNull"),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

// -----------------------------------------------------------------------------
// Get outcome

/// The defined outcome of a successful [`AccessEngine::get`].
///
/// `Undefined` is not an error: it marks a key path that intentionally
/// reaches nothing because an intermediate object reference was null. A
/// terminal attribute whose value *is* null resolves to
/// `Value(ValueBox::Null)`, keeping "reaches a null value" and "reaches
/// nothing" distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub enum GetResult {
    Value(ValueBox),
    Undefined,
}

impl GetResult {
    /// Whether the path short-circuited on a null link.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<&ValueBox> {
        match self {
            Self::Value(value) => Some(value),
            Self::Undefined => None,
        }
    }

    /// Consumes the resolved value, if any.
    pub fn into_value(self) -> Option<ValueBox> {
        match self {
            Self::Value(value) => Some(value),
            Self::Undefined => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Engine

/// Top-level get/set API over a [`TypeRegistry`].
///
/// Every call is a single synchronous resolve-and-act: the key or dotted
/// key path is parsed, each intermediate segment is resolved to an object
/// reference, and the terminal descriptor performs the actual get or set.
/// The engine introduces no locking of its own; concurrent mutation of a
/// shared instance is the caller's responsibility.
///
/// # Examples
///
/// ```
/// use kv_access::{
///     AccessEngine, AttributeDescriptor, AttributeKind, ScalarKind, TypeRegistry, ValueBox,
/// };
///
/// struct Lamp {
///     on: bool,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .register::<Lamp>([AttributeDescriptor::read_write(
///         "on",
///         AttributeKind::Scalar(ScalarKind::Bool),
///         |l: &Lamp| ValueBox::from(l.on),
///         |l: &mut Lamp, value| {
///             l.on = value.into_bool().unwrap_or_default();
///             Ok(())
///         },
///     )])
///     .unwrap();
///
/// let engine = AccessEngine::new(registry);
/// let mut lamp = Lamp { on: false };
///
/// engine.set(&mut lamp, "on", ValueBox::from(true)).unwrap();
/// let on = engine.get(&lamp, "on").unwrap();
/// assert_eq!(on.into_value().and_then(ValueBox::into_bool), Some(true));
/// ```
#[derive(Debug)]
pub struct AccessEngine {
    registry: TypeRegistry,
    on_unknown_key: UnknownKeyPolicy,
}

impl AccessEngine {
    /// Builds an engine over `registry` with the default
    /// [`UnknownKeyPolicy::Fail`].
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            on_unknown_key: UnknownKeyPolicy::Fail,
        }
    }

    /// Replaces the unknown-key policy.
    pub fn with_unknown_key_policy(mut self, policy: UnknownKeyPolicy) -> Self {
        self.on_unknown_key = policy;
        self
    }

    /// The underlying registry.
    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Resolves `key_or_path` against `instance` and returns the terminal
    /// value.
    ///
    /// A null object reference anywhere before the terminal segment
    /// short-circuits the whole resolution to [`GetResult::Undefined`].
    /// Unknown keys consult the configured [`UnknownKeyPolicy`] at every
    /// hop; structurally invalid requests fail with
    /// [`AccessError::MalformedKeyPath`] or [`AccessError::NotTraversable`].
    pub fn get(&self, instance: &dyn Any, key_or_path: &str) -> Result<GetResult, AccessError> {
        let path = KeyPath::parse(key_or_path)?;

        let mut current: Option<ObjectHandle> = None;
        for &segment in path.intermediates() {
            let link = match &current {
                None => self.fetch(instance, segment)?,
                Some(handle) => {
                    let guard = handle
                        .try_borrow()
                        .map_err(|_| AccessError::InstanceBorrowed {
                            segment: segment.to_string(),
                        })?;
                    self.fetch(&*guard, segment)?
                }
            };
            match link {
                ValueBox::ObjectRef(next) => current = Some(next),
                ValueBox::Null => {
                    log::trace!("null link at `{segment}`; `{key_or_path}` is undefined");
                    return Ok(GetResult::Undefined);
                }
                other => {
                    return Err(AccessError::NotTraversable {
                        segment: segment.to_string(),
                        kind: other.kind(),
                    });
                }
            }
        }

        let terminal = path.terminal();
        let value = match &current {
            None => self.fetch(instance, terminal)?,
            Some(handle) => {
                let guard = handle
                    .try_borrow()
                    .map_err(|_| AccessError::InstanceBorrowed {
                        segment: terminal.to_string(),
                    })?;
                self.fetch(&*guard, terminal)?
            }
        };
        Ok(GetResult::Value(value))
    }

    /// Resolves the terminal descriptor of `key_or_path` and writes
    /// `value` through it.
    ///
    /// Unlike [`get`](Self::get), a null intermediate link is an error
    /// here ([`AccessError::NotTraversable`]) and unknown keys always fail
    /// regardless of the configured policy.
    pub fn set(
        &self,
        instance: &mut dyn Any,
        key_or_path: &str,
        value: ValueBox,
    ) -> Result<(), AccessError> {
        let path = KeyPath::parse(key_or_path)?;

        let mut current: Option<ObjectHandle> = None;
        for &segment in path.intermediates() {
            let link = match &current {
                None => {
                    let shared: &dyn Any = &*instance;
                    self.require(shared.type_id(), segment)?.get(shared)
                }
                Some(handle) => {
                    let guard = handle
                        .try_borrow()
                        .map_err(|_| AccessError::InstanceBorrowed {
                            segment: segment.to_string(),
                        })?;
                    let shared: &dyn Any = &*guard;
                    self.require(shared.type_id(), segment)?.get(shared)
                }
            };
            match link {
                ValueBox::ObjectRef(next) => current = Some(next),
                other => {
                    return Err(AccessError::NotTraversable {
                        segment: segment.to_string(),
                        kind: other.kind(),
                    });
                }
            }
        }

        let terminal = path.terminal();
        match current {
            None => {
                let descriptor = {
                    let shared: &dyn Any = &*instance;
                    self.require(shared.type_id(), terminal)?
                };
                descriptor.set(instance, value)
            }
            Some(handle) => {
                let mut guard =
                    handle
                        .try_borrow_mut()
                        .map_err(|_| AccessError::InstanceBorrowed {
                            segment: terminal.to_string(),
                        })?;
                let target: &mut dyn Any = &mut *guard;
                let descriptor = self.require(Any::type_id(target), terminal)?;
                descriptor.set(target, value)
            }
        }
    }

    /// Registered attribute keys of `instance`'s type, in registration
    /// order. Empty for an unregistered type.
    pub fn keys(&self, instance: &dyn Any) -> impl Iterator<Item = &str> {
        self.registry
            .attributes(instance.type_id())
            .map(AttributeDescriptor::key)
    }

    /// Current values of every registered attribute of `instance`'s type,
    /// paired with their keys in registration order.
    pub fn snapshot(&self, instance: &dyn Any) -> Vec<(&str, ValueBox)> {
        self.registry
            .attributes(instance.type_id())
            .map(|descriptor| (descriptor.key(), descriptor.get(instance)))
            .collect()
    }

    /// Applies several single-key sets in order; the first failure aborts
    /// the remainder and is returned.
    pub fn set_many<K: AsRef<str>>(
        &self,
        instance: &mut dyn Any,
        entries: impl IntoIterator<Item = (K, ValueBox)>,
    ) -> Result<(), AccessError> {
        for (key, value) in entries {
            self.set(instance, key.as_ref(), value)?;
        }
        Ok(())
    }

    // Policy-aware single-key resolution, used by `get`.
    fn fetch(&self, instance: &dyn Any, key: &str) -> Result<ValueBox, AccessError> {
        let type_id = instance.type_id();
        match self.registry.lookup(type_id, key) {
            Some(descriptor) => Ok(descriptor.get(instance)),
            None => match &self.on_unknown_key {
                UnknownKeyPolicy::Fail => Err(self.unknown_key(type_id, key)),
                UnknownKeyPolicy::ReturnNull => Ok(ValueBox::Null),
                UnknownKeyPolicy::Handler(handler) => {
                    log::trace!("unknown key `{key}`; deferring to the configured handler");
                    Ok(handler(instance, key))
                }
            },
        }
    }

    // Strict single-key resolution, used by `set`.
    fn require(&self, type_id: TypeId, key: &str) -> Result<&AttributeDescriptor, AccessError> {
        self.registry
            .lookup(type_id, key)
            .ok_or_else(|| self.unknown_key(type_id, key))
    }

    fn unknown_key(&self, type_id: TypeId, key: &str) -> AccessError {
        AccessError::UnknownKey {
            type_name: self.registry.type_name(type_id).unwrap_or("<unregistered>"),
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{AccessEngine, GetResult, UnknownKeyPolicy};
    use crate::access::AccessError;
    use crate::descriptor::{AttributeDescriptor, AttributeKind};
    use crate::registry::TypeRegistry;
    use crate::value::{
        Composite, ObjectHandle, ScalarKind, ValueBox, ValueKind, object_handle,
    };

    // The demo data holder: a name, an immutable sequence, a mutable
    // sequence, an integer, a three-float composite, and an optional link
    // to another person.
    #[derive(Default)]
    struct ThreeFloats {
        x: f32,
        y: f32,
        z: f32,
    }

    struct Person {
        name: String,
        array: Vec<String>,
        m_array: Vec<String>,
        age: i32,
        three_floats: ThreeFloats,
        partner: Option<ObjectHandle>,
    }

    impl Person {
        fn named(name: &str, age: i32) -> Self {
            Self {
                name: name.to_string(),
                array: vec!["a".to_string(), "b".to_string()],
                m_array: vec!["m".to_string()],
                age,
                three_floats: ThreeFloats::default(),
                partner: None,
            }
        }
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register::<Person>([
                AttributeDescriptor::read_write(
                    "name",
                    AttributeKind::Scalar(ScalarKind::Str),
                    |p: &Person| ValueBox::from(p.name.as_str()),
                    |p: &mut Person, value| {
                        p.name = value.into_string().unwrap_or_default();
                        Ok(())
                    },
                ),
                AttributeDescriptor::read_only("array", AttributeKind::Sequence, |p: &Person| {
                    ValueBox::sequence(p.array.iter().map(|s| ValueBox::from(s.as_str())))
                }),
                AttributeDescriptor::read_write(
                    "mArray",
                    AttributeKind::MutableSequence,
                    |p: &Person| {
                        ValueBox::mutable_sequence(
                            p.m_array.iter().map(|s| ValueBox::from(s.as_str())),
                        )
                    },
                    |p: &mut Person, value| {
                        if let Some(items) = value.into_mutable_sequence() {
                            p.m_array =
                                items.into_iter().filter_map(ValueBox::into_string).collect();
                        }
                        Ok(())
                    },
                ),
                AttributeDescriptor::read_write(
                    "age",
                    AttributeKind::Scalar(ScalarKind::Int),
                    |p: &Person| ValueBox::from(i64::from(p.age)),
                    |p: &mut Person, value| {
                        p.age = value.into_int().unwrap_or_default() as i32;
                        Ok(())
                    },
                ),
                AttributeDescriptor::read_write(
                    "threeFloats",
                    AttributeKind::Composite,
                    |p: &Person| {
                        ValueBox::from(
                            Composite::new("ThreeFloats")
                                .with_field("x", p.three_floats.x)
                                .with_field("y", p.three_floats.y)
                                .with_field("z", p.three_floats.z),
                        )
                    },
                    |p: &mut Person, value| {
                        if let Some(composite) = value.into_composite() {
                            for (name, slot) in [
                                ("x", &mut p.three_floats.x),
                                ("y", &mut p.three_floats.y),
                                ("z", &mut p.three_floats.z),
                            ] {
                                if let Some(v) = composite.field(name).and_then(ValueBox::as_float)
                                {
                                    *slot = v as f32;
                                }
                            }
                        }
                        Ok(())
                    },
                ),
                AttributeDescriptor::read_write(
                    "partner",
                    AttributeKind::ObjectRef,
                    |p: &Person| match &p.partner {
                        Some(handle) => ValueBox::object(handle.clone()),
                        None => ValueBox::Null,
                    },
                    |p: &mut Person, value| {
                        p.partner = value.into_object();
                        Ok(())
                    },
                ),
            ])
            .unwrap();
        registry
    }

    fn engine() -> AccessEngine {
        AccessEngine::new(registry())
    }

    #[test]
    fn set_then_get_round_trips() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        engine.set(&mut person, "age", ValueBox::from(5_i64)).unwrap();
        let age = engine.get(&person, "age").unwrap();
        assert_eq!(age, GetResult::Value(ValueBox::from(5_i64)));

        engine.set(&mut person, "name", ValueBox::from("Zhai")).unwrap();
        assert_eq!(
            engine.get(&person, "name").unwrap(),
            GetResult::Value(ValueBox::from("Zhai"))
        );
    }

    #[test]
    fn read_only_sequence_rejects_set_and_keeps_state() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        let err = engine
            .set(&mut person, "array", ValueBox::sequence([]))
            .unwrap_err();
        assert!(matches!(err, AccessError::ReadOnlyAttribute { .. }));
        assert_eq!(person.array, ["a", "b"]);
    }

    #[test]
    fn unknown_key_fails_get_and_set() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        assert!(matches!(
            engine.get(&person, "unknown").unwrap_err(),
            AccessError::UnknownKey { .. }
        ));
        assert!(matches!(
            engine
                .set(&mut person, "unknown", ValueBox::from(1_i64))
                .unwrap_err(),
            AccessError::UnknownKey { .. }
        ));
    }

    #[test]
    fn unknown_key_error_names_the_type() {
        let engine = engine();
        let person = Person::named("Alan", 20);

        match engine.get(&person, "unknown").unwrap_err() {
            AccessError::UnknownKey { type_name, key } => {
                assert!(type_name.ends_with("Person"));
                assert_eq!(key, "unknown");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn return_null_policy_resolves_unknown_keys() {
        let engine = AccessEngine::new(registry())
            .with_unknown_key_policy(UnknownKeyPolicy::ReturnNull);
        let mut person = Person::named("Alan", 20);

        assert_eq!(
            engine.get(&person, "unknown").unwrap(),
            GetResult::Value(ValueBox::Null)
        );
        // The policy never applies to set.
        assert!(matches!(
            engine
                .set(&mut person, "unknown", ValueBox::from(1_i64))
                .unwrap_err(),
            AccessError::UnknownKey { .. }
        ));
    }

    #[test]
    fn handler_policy_supplies_the_value() {
        let engine = AccessEngine::new(registry()).with_unknown_key_policy(
            UnknownKeyPolicy::Handler(alloc::boxed::Box::new(|_, key| {
                ValueBox::from(key.len() as i64)
            })),
        );
        let person = Person::named("Alan", 20);

        assert_eq!(
            engine.get(&person, "missing").unwrap(),
            GetResult::Value(ValueBox::from(7_i64))
        );
    }

    #[test]
    fn null_intermediate_is_undefined_for_get() {
        let engine = engine();
        let person = Person::named("Alan", 20);

        assert!(engine.get(&person, "partner.name").unwrap().is_undefined());
        // Any path length >= 2 short-circuits the same way.
        assert!(engine
            .get(&person, "partner.partner.name")
            .unwrap()
            .is_undefined());
    }

    #[test]
    fn null_intermediate_fails_set_with_not_traversable() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        let err = engine
            .set(&mut person, "partner.name", ValueBox::from("X"))
            .unwrap_err();
        assert_eq!(
            err,
            AccessError::NotTraversable {
                segment: "partner".to_string(),
                kind: ValueKind::Null,
            }
        );
    }

    #[test]
    fn paths_traverse_object_references() {
        let engine = engine();
        let partner = object_handle(Person::named("Grace", 33));
        let mut person = Person::named("Alan", 20);
        person.partner = Some(partner.clone());

        assert_eq!(
            engine.get(&person, "partner.name").unwrap(),
            GetResult::Value(ValueBox::from("Grace"))
        );

        engine
            .set(&mut person, "partner.age", ValueBox::from(34_i64))
            .unwrap();
        assert_eq!(
            engine.get(&person, "partner.age").unwrap(),
            GetResult::Value(ValueBox::from(34_i64))
        );
        assert_eq!(partner.borrow().downcast_ref::<Person>().unwrap().age, 34);
    }

    #[test]
    fn non_object_intermediate_is_not_traversable() {
        let engine = engine();
        let person = Person::named("Alan", 20);

        let err = engine.get(&person, "age.digits").unwrap_err();
        assert_eq!(
            err,
            AccessError::NotTraversable {
                segment: "age".to_string(),
                kind: ValueKind::Scalar(ScalarKind::Int),
            }
        );
    }

    #[test]
    fn terminal_null_is_a_value_not_undefined() {
        let engine = engine();
        let person = Person::named("Alan", 20);

        assert_eq!(
            engine.get(&person, "partner").unwrap(),
            GetResult::Value(ValueBox::Null)
        );
    }

    #[test]
    fn malformed_paths_are_rejected() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        assert!(matches!(
            engine.get(&person, "").unwrap_err(),
            AccessError::MalformedKeyPath(_)
        ));
        assert!(matches!(
            engine
                .set(&mut person, "partner..name", ValueBox::Null)
                .unwrap_err(),
            AccessError::MalformedKeyPath(_)
        ));
    }

    #[test]
    fn scalar_coercion_applies_on_set() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        // Float into the int attribute truncates toward zero.
        engine.set(&mut person, "age", ValueBox::from(5.9)).unwrap();
        assert_eq!(person.age, 5);

        let err = engine
            .set(&mut person, "age", ValueBox::from("old"))
            .unwrap_err();
        assert!(matches!(err, AccessError::TypeMismatch { .. }));
    }

    #[test]
    fn composite_round_trips_with_field_order() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        let floats = Composite::new("ThreeFloats")
            .with_field("x", 1.0)
            .with_field("y", 2.0)
            .with_field("z", 3.0);
        engine
            .set(&mut person, "threeFloats", ValueBox::from(floats.clone()))
            .unwrap();

        let value = engine.get(&person, "threeFloats").unwrap();
        let composite = value.into_value().and_then(ValueBox::into_composite).unwrap();
        assert_eq!(composite, floats);
        let order: Vec<&str> = composite.fields().map(|(name, _)| name).collect();
        assert_eq!(order, ["x", "y", "z"]);
    }

    #[test]
    fn mutable_and_immutable_sequences_are_distinct_storage() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        engine
            .set(
                &mut person,
                "mArray",
                ValueBox::mutable_sequence([ValueBox::from("x"), ValueBox::from("y")]),
            )
            .unwrap();
        assert_eq!(person.m_array, ["x", "y"]);
        assert_eq!(person.array, ["a", "b"]);
    }

    #[test]
    fn sequence_value_kinds_do_not_cross() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        // An immutable sequence value cannot be written into the mutable
        // sequence attribute.
        let err = engine
            .set(&mut person, "mArray", ValueBox::sequence([ValueBox::from("x")]))
            .unwrap_err();
        assert!(matches!(err, AccessError::TypeMismatch { .. }));
    }

    #[test]
    fn keys_and_snapshot_follow_registration_order() {
        let engine = engine();
        let person = Person::named("Alan", 20);

        let keys: Vec<&str> = engine.keys(&person).collect();
        assert_eq!(
            keys,
            ["name", "array", "mArray", "age", "threeFloats", "partner"]
        );

        let snapshot = engine.snapshot(&person);
        let snapshot_keys: Vec<&str> = snapshot.iter().map(|(key, _)| *key).collect();
        assert_eq!(snapshot_keys, keys);
        assert_eq!(snapshot[0].1, ValueBox::from("Alan"));
    }

    #[test]
    fn set_many_applies_in_order_and_stops_on_failure() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);

        engine
            .set_many(
                &mut person,
                [
                    ("name", ValueBox::from("Zhai")),
                    ("age", ValueBox::from(21_i64)),
                ],
            )
            .unwrap();
        assert_eq!(person.name, "Zhai");
        assert_eq!(person.age, 21);

        let err = engine
            .set_many(
                &mut person,
                [
                    ("age", ValueBox::from(22_i64)),
                    ("array", ValueBox::sequence([])),
                    ("age", ValueBox::from(99_i64)),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, AccessError::ReadOnlyAttribute { .. }));
        // The failing entry aborted the remainder.
        assert_eq!(person.age, 22);
    }

    #[test]
    fn unregistered_instance_reports_unknown_key() {
        let engine = engine();
        let orphan = 5_u8;

        match engine.get(&orphan, "anything").unwrap_err() {
            AccessError::UnknownKey { type_name, .. } => {
                assert_eq!(type_name, "<unregistered>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(engine.keys(&orphan).count(), 0);
    }

    #[test]
    fn set_null_partner_then_paths_are_undefined_again() {
        let engine = engine();
        let mut person = Person::named("Alan", 20);
        person.partner = Some(object_handle(Person::named("Grace", 33)));

        engine.set(&mut person, "partner", ValueBox::Null).unwrap();
        assert!(person.partner.is_none());
        assert!(engine.get(&person, "partner.name").unwrap().is_undefined());
    }
}
