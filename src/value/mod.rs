//! The value model: type-erased carriers for attribute values.

mod composite;
mod scalar;
mod value_box;

pub use composite::Composite;
pub use scalar::{ScalarKind, ScalarValue, coerce_scalar};
pub use value_box::{ObjectHandle, ValueBox, ValueKind, object_handle};
