//! Shared, lock-guarded registry handle.

use alloc::sync::Arc;
use core::fmt;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::registry::TypeRegistry;

/// A clonable, thread-shared [`TypeRegistry`] handle.
///
/// Registration happens in a single-threaded initialization phase through
/// [`write`](Self::write); afterwards any number of threads may take read
/// locks for lookups. A poisoned lock is recovered rather than propagated:
/// the registry is append-only, so a panicking writer cannot leave an
/// entry half-built behind a completed insert.
#[derive(Clone, Default)]
pub struct SharedRegistry {
    internal: Arc<RwLock<TypeRegistry>>,
}

impl SharedRegistry {
    /// Wraps an already-built registry.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying registry.
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying registry.
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}
