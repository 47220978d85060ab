#![doc = include_str!("../README.md")]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod access;
pub mod descriptor;
pub mod registry;
pub mod value;

#[cfg(feature = "serde")]
mod serde;

// -----------------------------------------------------------------------------
// Top-level exports

pub use access::{
    AccessEngine, AccessError, GetResult, KEY_PATH_DELIMITER, KeyPath, PathParseError,
    UnknownKeyPolicy,
};
pub use descriptor::{AttributeDescriptor, AttributeKind};
pub use registry::{RegistryError, TypeRegistry};
pub use value::{
    Composite, ObjectHandle, ScalarKind, ScalarValue, ValueBox, ValueKind, coerce_scalar,
    object_handle,
};

#[cfg(feature = "std")]
pub use registry::SharedRegistry;
