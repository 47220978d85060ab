//! Static attribute metadata: a key bound to getter/setter behavior and a
//! declared kind.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::{Any, type_name};
use core::fmt;

use crate::access::AccessError;
use crate::value::{ScalarKind, ValueBox, coerce_scalar};

// -----------------------------------------------------------------------------
// Kind

/// The declared semantic kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Scalar(ScalarKind),
    Composite,
    ObjectRef,
    Sequence,
    MutableSequence,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind} scalar"),
            Self::Composite => f.write_str("composite"),
            Self::ObjectRef => f.write_str("object reference"),
            Self::Sequence => f.write_str("sequence"),
            Self::MutableSequence => f.write_str("mutable sequence"),
        }
    }
}

// -----------------------------------------------------------------------------
// Descriptor

type BoxedGetter = Box<dyn Fn(&dyn Any) -> ValueBox + Send + Sync>;
type BoxedSetter = Box<dyn Fn(&mut dyn Any, ValueBox) -> Result<(), AccessError> + Send + Sync>;

/// Describes one named attribute of a type: its key, declared kind, and
/// bound getter/setter.
///
/// Descriptors are created once at registration time and are immutable
/// afterwards. An attribute without a setter is read-only; a set against
/// it fails with [`AccessError::ReadOnlyAttribute`].
///
/// # Examples
///
/// ```
/// use kv_access::{AttributeDescriptor, AttributeKind, ScalarKind, ValueBox};
///
/// struct Counter {
///     count: i64,
/// }
///
/// let descriptor = AttributeDescriptor::read_write(
///     "count",
///     AttributeKind::Scalar(ScalarKind::Int),
///     |c: &Counter| ValueBox::from(c.count),
///     |c: &mut Counter, value| {
///         c.count = value.into_int().unwrap_or_default();
///         Ok(())
///     },
/// );
///
/// let mut counter = Counter { count: 1 };
/// descriptor.set(&mut counter, ValueBox::from(5_i64)).unwrap();
/// assert_eq!(descriptor.get(&counter).as_int(), Some(5));
/// ```
pub struct AttributeDescriptor {
    key: Cow<'static, str>,
    kind: AttributeKind,
    getter: BoxedGetter,
    setter: Option<BoxedSetter>,
}

impl AttributeDescriptor {
    /// Builds a read-only attribute of type `T`.
    ///
    /// The getter never fails for a registered attribute on a live
    /// instance; invoking it against an instance that is not a `T`
    /// (possible only by bypassing the engine) yields [`ValueBox::Null`].
    pub fn read_only<T, G>(key: impl Into<Cow<'static, str>>, kind: AttributeKind, getter: G) -> Self
    where
        T: Any,
        G: Fn(&T) -> ValueBox + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            kind,
            getter: Box::new(move |instance| match instance.downcast_ref::<T>() {
                Some(instance) => getter(instance),
                None => ValueBox::Null,
            }),
            setter: None,
        }
    }

    /// Builds a read-write attribute of type `T`.
    ///
    /// The setter receives the value after kind validation and scalar
    /// coercion, so it only ever sees values of the declared kind (plus
    /// [`ValueBox::Null`] for nullable object references).
    pub fn read_write<T, G, S>(
        key: impl Into<Cow<'static, str>>,
        kind: AttributeKind,
        getter: G,
        setter: S,
    ) -> Self
    where
        T: Any,
        G: Fn(&T) -> ValueBox + Send + Sync + 'static,
        S: Fn(&mut T, ValueBox) -> Result<(), AccessError> + Send + Sync + 'static,
    {
        let mut this = Self::read_only(key, kind, getter);
        this.setter = Some(Box::new(move |instance: &mut dyn Any, value| {
            match instance.downcast_mut::<T>() {
                Some(instance) => setter(instance, value),
                None => Err(AccessError::WrongInstance {
                    expected: type_name::<T>(),
                }),
            }
        }));
        this
    }

    /// The key identifying this attribute.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The declared kind.
    #[inline]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Whether a setter is bound.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Reads the current value of this attribute on `instance`.
    pub fn get(&self, instance: &dyn Any) -> ValueBox {
        (self.getter)(instance)
    }

    /// Writes `value` to this attribute on `instance`.
    ///
    /// Validates the value's kind against the declared kind, applying
    /// scalar coercion where defined. Fails with
    /// [`AccessError::ReadOnlyAttribute`] when no setter is bound, or
    /// [`AccessError::TypeMismatch`] when the kinds are incompatible and
    /// not coercible; in both cases the instance is left untouched.
    pub fn set(&self, instance: &mut dyn Any, value: ValueBox) -> Result<(), AccessError> {
        let Some(setter) = &self.setter else {
            return Err(AccessError::ReadOnlyAttribute {
                key: self.key.clone(),
            });
        };
        let value = self.conform(value)?;
        setter(instance, value)
    }

    // Kind validation and coercion, ahead of the bound setter.
    fn conform(&self, value: ValueBox) -> Result<ValueBox, AccessError> {
        let actual = value.kind();
        match (self.kind, value) {
            (AttributeKind::Scalar(target), ValueBox::Scalar(scalar)) => {
                match coerce_scalar(scalar, target) {
                    Some(scalar) => Ok(ValueBox::Scalar(scalar)),
                    None => Err(AccessError::TypeMismatch {
                        expected: self.kind,
                        actual,
                    }),
                }
            }
            // Object references are nullable.
            (AttributeKind::ObjectRef, value @ (ValueBox::Null | ValueBox::ObjectRef(_))) => {
                Ok(value)
            }
            (AttributeKind::Composite, value @ ValueBox::Composite(_)) => Ok(value),
            (AttributeKind::Sequence, value @ ValueBox::Sequence(_)) => Ok(value),
            (AttributeKind::MutableSequence, value @ ValueBox::MutableSequence(_)) => Ok(value),
            (_, _) => Err(AccessError::TypeMismatch {
                expected: self.kind,
                actual,
            }),
        }
    }
}

impl fmt::Debug for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("writable", &self.is_writable())
            .finish()
    }
}
