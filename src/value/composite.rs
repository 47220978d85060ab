//! Composite (struct-like) values with named, ordered fields.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::value::ValueBox;

/// A struct-like value: a type name plus an ordered list of named fields.
///
/// Field order is the declaration order given at construction and is
/// preserved by iteration (and by serialization when the `serde` feature
/// is enabled). Field names are unique; [`with_field`](Self::with_field)
/// replaces an existing field in place rather than appending a duplicate.
///
/// # Examples
///
/// ```
/// use kv_access::Composite;
///
/// let floats = Composite::new("ThreeFloats")
///     .with_field("x", 1.0)
///     .with_field("y", 2.0)
///     .with_field("z", 3.0);
///
/// assert_eq!(floats.len(), 3);
/// assert_eq!(floats.field("y").and_then(|v| v.as_float()), Some(2.0));
/// let names: Vec<&str> = floats.fields().map(|(name, _)| name).collect();
/// assert_eq!(names, ["x", "y", "z"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    type_name: Cow<'static, str>,
    fields: Vec<(Cow<'static, str>, ValueBox)>,
}

impl Composite {
    /// Creates an empty composite of the given struct type name.
    pub fn new(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a named field, or replaces its value in place if a field
    /// with the same name already exists.
    pub fn with_field(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<ValueBox>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// The struct type name this composite represents.
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns a reference to the named field's value.
    pub fn field(&self, name: &str) -> Option<&ValueBox> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Returns a mutable reference to the named field's value.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut ValueBox> {
        self.fields
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Iterates fields as `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ValueBox)> {
        self.fields.iter().map(|(name, value)| (name.as_ref(), value))
    }
}
