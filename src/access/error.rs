//! Typed failure outcomes for get/set resolution.

use alloc::borrow::Cow;
use alloc::string::String;
use core::{error, fmt};

use crate::access::PathParseError;
use crate::descriptor::AttributeKind;
use crate::value::ValueKind;

/// An error returned from a failed get or set.
///
/// Every failure is reported to the immediate caller as a value of this
/// type; nothing is retried and nothing is swallowed. A null link in the
/// middle of a key path is deliberately *not* an error for `get` (see
/// [`GetResult::Undefined`](crate::access::GetResult::Undefined)).
#[derive(Debug, Clone, PartialEq)]
pub enum AccessError {
    /// The resolved type has no attribute with the given key.
    UnknownKey {
        type_name: &'static str,
        key: String,
    },
    /// The key path was empty or contained an empty segment.
    MalformedKeyPath(PathParseError),
    /// An intermediate segment produced a value that cannot be traversed
    /// through. For `set`, a null link also lands here.
    NotTraversable { segment: String, kind: ValueKind },
    /// A set was attempted on an attribute with no bound setter.
    ReadOnlyAttribute { key: Cow<'static, str> },
    /// The value's kind is incompatible with the declared kind and no
    /// coercion applies.
    TypeMismatch {
        expected: AttributeKind,
        actual: ValueKind,
    },
    /// A descriptor was invoked against an instance of a different type
    /// than it was registered for.
    WrongInstance { expected: &'static str },
    /// An instance on the path was already mutably borrowed by the caller.
    InstanceBorrowed { segment: String },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey { type_name, key } => {
                write!(f, "the type `{type_name}` has no attribute for key `{key}`")
            }
            Self::MalformedKeyPath(err) => fmt::Display::fmt(err, f),
            Self::NotTraversable { segment, kind } => write!(
                f,
                "cannot traverse through segment `{segment}`: expected an object reference, found a {kind} value"
            ),
            Self::ReadOnlyAttribute { key } => {
                write!(f, "attribute `{key}` is read-only")
            }
            Self::TypeMismatch { expected, actual } => write!(
                f,
                "expected a {expected} value, found a non-coercible {actual} value"
            ),
            Self::WrongInstance { expected } => write!(
                f,
                "descriptor invoked against an instance that is not a `{expected}`"
            ),
            Self::InstanceBorrowed { segment } => write!(
                f,
                "the instance at segment `{segment}` is already mutably borrowed"
            ),
        }
    }
}

impl error::Error for AccessError {}

impl From<PathParseError> for AccessError {
    #[inline]
    fn from(value: PathParseError) -> Self {
        Self::MalformedKeyPath(value)
    }
}
