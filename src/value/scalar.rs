//! Scalar values and the numeric coercion policy.

use alloc::string::String;
use core::fmt;

// -----------------------------------------------------------------------------
// Kind

/// The kind tag of a [`ScalarValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("string"),
        }
    }
}

// -----------------------------------------------------------------------------
// Value

/// A single scalar attribute value.
///
/// Integers are carried as `i64` and floating point values as `f64`;
/// narrower native fields widen on read and narrow in their setter.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScalarValue {
    /// Returns the kind tag of this value.
    #[inline]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) => ScalarKind::Int,
            Self::Float(_) => ScalarKind::Float,
            Self::Str(_) => ScalarKind::Str,
        }
    }
}

// -----------------------------------------------------------------------------
// Coercion

// 2^63. Finite floats in `[-BOUND, BOUND)` truncate to a representable `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Attempts to convert `value` to the `target` kind.
///
/// A value already of the `target` kind passes through unchanged. Otherwise
/// only the numeric conversions are defined: `Int` widens exactly to
/// `Float`, and `Float` truncates toward zero to `Int`, failing for
/// non-finite values and values outside the `i64` range. `Bool` and `Str`
/// never convert. Returns `None` when no conversion applies.
pub fn coerce_scalar(value: ScalarValue, target: ScalarKind) -> Option<ScalarValue> {
    match (value, target) {
        (value, target) if value.kind() == target => Some(value),
        (ScalarValue::Int(v), ScalarKind::Float) => Some(ScalarValue::Float(v as f64)),
        (ScalarValue::Float(v), ScalarKind::Int)
            if v.is_finite() && v >= -I64_BOUND && v < I64_BOUND =>
        {
            // `as` truncates toward zero.
            Some(ScalarValue::Int(v as i64))
        }
        _ => None,
    }
}
