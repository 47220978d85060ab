//! The type-erased attribute value carrier.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;
use core::fmt;

use crate::value::{Composite, ScalarKind, ScalarValue};

// -----------------------------------------------------------------------------
// Object handles

/// Shared-ownership handle to an instance reachable through an
/// [`ObjectRef`](ValueBox::ObjectRef) attribute.
pub type ObjectHandle = Rc<RefCell<dyn Any>>;

/// Wraps `value` in a fresh [`ObjectHandle`].
pub fn object_handle<T: Any>(value: T) -> ObjectHandle {
    Rc::new(RefCell::new(value))
}

// -----------------------------------------------------------------------------
// Kind

/// The kind tag of a [`ValueBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Scalar(ScalarKind),
    Composite,
    ObjectRef,
    Sequence,
    MutableSequence,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Scalar(kind) => write!(f, "{kind} scalar"),
            Self::Composite => f.write_str("composite"),
            Self::ObjectRef => f.write_str("object reference"),
            Self::Sequence => f.write_str("sequence"),
            Self::MutableSequence => f.write_str("mutable sequence"),
        }
    }
}

// -----------------------------------------------------------------------------
// ValueBox

/// Type-erased carrier for any attribute value.
///
/// The tag never changes after construction. Mutation is only reachable
/// through an attribute's declared setter; the carrier itself is a plain
/// value apart from [`ObjectRef`](Self::ObjectRef), which shares ownership
/// of the referenced instance.
///
/// # Examples
///
/// ```
/// use kv_access::{ValueBox, ValueKind, ScalarKind};
///
/// let age = ValueBox::from(30_i64);
/// assert_eq!(age.kind(), ValueKind::Scalar(ScalarKind::Int));
/// assert_eq!(age.as_int(), Some(30));
/// assert_eq!(age.as_float(), None);
/// ```
#[derive(Clone)]
pub enum ValueBox {
    /// The absence of a value.
    Null,
    /// A single scalar.
    Scalar(ScalarValue),
    /// A struct-like value with named, ordered fields.
    Composite(Composite),
    /// A shared reference to another registered instance.
    ObjectRef(ObjectHandle),
    /// An immutable ordered list.
    Sequence(Box<[ValueBox]>),
    /// An ordered list whose elements may be replaced in place.
    MutableSequence(Vec<ValueBox>),
}

impl ValueBox {
    /// Returns the kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Scalar(scalar) => ValueKind::Scalar(scalar.kind()),
            Self::Composite(_) => ValueKind::Composite,
            Self::ObjectRef(_) => ValueKind::ObjectRef,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::MutableSequence(_) => ValueKind::MutableSequence,
        }
    }

    /// Whether this is [`Null`](Self::Null).
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Collects `items` into an immutable [`Sequence`](Self::Sequence).
    pub fn sequence(items: impl IntoIterator<Item = ValueBox>) -> Self {
        Self::Sequence(items.into_iter().collect())
    }

    /// Collects `items` into a [`MutableSequence`](Self::MutableSequence).
    pub fn mutable_sequence(items: impl IntoIterator<Item = ValueBox>) -> Self {
        Self::MutableSequence(items.into_iter().collect())
    }

    /// Wraps an [`ObjectHandle`] in an [`ObjectRef`](Self::ObjectRef).
    #[inline]
    pub fn object(handle: ObjectHandle) -> Self {
        Self::ObjectRef(handle)
    }

    /// The boolean value, if this is a bool scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(ScalarValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// The integer value, if this is an int scalar. No coercion.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Scalar(ScalarValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// The float value, if this is a float scalar. No coercion.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Scalar(ScalarValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// The string value, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(ScalarValue::Str(v)) => Some(v),
            _ => None,
        }
    }

    /// The composite, if this is a [`Composite`](Self::Composite).
    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Self::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// The handle, if this is an [`ObjectRef`](Self::ObjectRef).
    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Self::ObjectRef(handle) => Some(handle),
            _ => None,
        }
    }

    /// The elements, if this is an immutable [`Sequence`](Self::Sequence).
    pub fn as_sequence(&self) -> Option<&[ValueBox]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The elements, if this is a [`MutableSequence`](Self::MutableSequence).
    pub fn as_mutable_sequence(&self) -> Option<&[ValueBox]> {
        match self {
            Self::MutableSequence(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable access to the elements of a
    /// [`MutableSequence`](Self::MutableSequence).
    pub fn as_mutable_sequence_mut(&mut self) -> Option<&mut Vec<ValueBox>> {
        match self {
            Self::MutableSequence(items) => Some(items),
            _ => None,
        }
    }

    /// Consumes an int scalar.
    pub fn into_int(self) -> Option<i64> {
        self.as_int()
    }

    /// Consumes a float scalar.
    pub fn into_float(self) -> Option<f64> {
        self.as_float()
    }

    /// Consumes a bool scalar.
    pub fn into_bool(self) -> Option<bool> {
        self.as_bool()
    }

    /// Consumes a string scalar.
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Scalar(ScalarValue::Str(v)) => Some(v),
            _ => None,
        }
    }

    /// Consumes a composite.
    pub fn into_composite(self) -> Option<Composite> {
        match self {
            Self::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// Consumes an object reference. `Null` yields `None`.
    pub fn into_object(self) -> Option<ObjectHandle> {
        match self {
            Self::ObjectRef(handle) => Some(handle),
            _ => None,
        }
    }

    /// Consumes an immutable sequence.
    pub fn into_sequence(self) -> Option<Box<[ValueBox]>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Consumes a mutable sequence.
    pub fn into_mutable_sequence(self) -> Option<Vec<ValueBox>> {
        match self {
            Self::MutableSequence(items) => Some(items),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

impl From<ScalarValue> for ValueBox {
    #[inline]
    fn from(value: ScalarValue) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for ValueBox {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Scalar(ScalarValue::Bool(value))
    }
}

impl From<i32> for ValueBox {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Scalar(ScalarValue::Int(i64::from(value)))
    }
}

impl From<i64> for ValueBox {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Scalar(ScalarValue::Int(value))
    }
}

impl From<f32> for ValueBox {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Scalar(ScalarValue::Float(f64::from(value)))
    }
}

impl From<f64> for ValueBox {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Scalar(ScalarValue::Float(value))
    }
}

impl From<&str> for ValueBox {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Scalar(ScalarValue::Str(String::from(value)))
    }
}

impl From<String> for ValueBox {
    #[inline]
    fn from(value: String) -> Self {
        Self::Scalar(ScalarValue::Str(value))
    }
}

impl From<Composite> for ValueBox {
    #[inline]
    fn from(value: Composite) -> Self {
        Self::Composite(value)
    }
}

// -----------------------------------------------------------------------------
// Equality and formatting

impl PartialEq for ValueBox {
    /// Structural equality, except [`ObjectRef`](Self::ObjectRef) which
    /// compares by handle identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Composite(a), Self::Composite(b)) => a == b,
            (Self::ObjectRef(a), Self::ObjectRef(b)) => Rc::ptr_eq(a, b),
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::MutableSequence(a), Self::MutableSequence(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ValueBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Scalar(scalar) => f.debug_tuple("Scalar").field(scalar).finish(),
            Self::Composite(composite) => f.debug_tuple("Composite").field(composite).finish(),
            Self::ObjectRef(handle) => f
                .debug_tuple("ObjectRef")
                .field(&Rc::as_ptr(handle))
                .finish(),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Self::MutableSequence(items) => {
                f.debug_tuple("MutableSequence").field(items).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{ValueBox, ValueKind, object_handle};
    use crate::value::ScalarKind;

    #[test]
    fn kind_tags() {
        assert_eq!(ValueBox::Null.kind(), ValueKind::Null);
        assert_eq!(ValueBox::from(true).kind(), ValueKind::Scalar(ScalarKind::Bool));
        assert_eq!(
            ValueBox::sequence([ValueBox::from(1_i64)]).kind(),
            ValueKind::Sequence
        );
        assert_eq!(
            ValueBox::mutable_sequence(vec![]).kind(),
            ValueKind::MutableSequence
        );
    }

    #[test]
    fn extraction_is_kind_checked() {
        let value = ValueBox::from(1.5);
        assert_eq!(value.as_float(), Some(1.5));
        assert_eq!(value.as_int(), None);
        assert_eq!(value.as_str(), None);
    }

    #[test]
    fn object_refs_compare_by_identity() {
        let a = object_handle(5_i32);
        let b = object_handle(5_i32);
        assert_eq!(ValueBox::object(a.clone()), ValueBox::object(a));
        assert_ne!(ValueBox::object(b), ValueBox::Null);
    }

    #[test]
    fn sequences_compare_structurally() {
        let a = ValueBox::sequence([ValueBox::from(1_i64), ValueBox::from(2_i64)]);
        let b = ValueBox::sequence([ValueBox::from(1_i64), ValueBox::from(2_i64)]);
        assert_eq!(a, b);
        // Tags are part of equality.
        let c = ValueBox::mutable_sequence([ValueBox::from(1_i64), ValueBox::from(2_i64)]);
        assert_ne!(a, c);
    }
}
