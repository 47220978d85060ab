//! Type registration and descriptor lookup.

mod type_registry;

#[cfg(feature = "std")]
mod shared;

pub use type_registry::{RegistryError, TypeRegistry};

#[cfg(feature = "std")]
pub use shared::SharedRegistry;
