//! Persistence backends for RAG indexes.
//!
//! This module provides the [`Persistence`] trait and the [`RkyvPersistence`]
//! implementation for saving and loading index snapshots.

mod rkyv_backend;

pub use rkyv_backend::RkyvPersistence;

use crate::error::Result;
use crate::index::VectorIndex;
use std::path::Path;

/// Trait for persistence backends.
///
/// A backend owns one storage location and holds at most one index there. Saving
/// replaces the previous index atomically.
pub trait Persistence: Send + Sync {
    /// Saves the index, replacing whatever was stored before.
    fn save(&self, index: &VectorIndex) -> Result<()>;

    /// Loads the stored index.
    ///
    /// Fails with [`crate::RagError::IndexNotFound`] if nothing has been saved.
    fn load(&self) -> Result<VectorIndex>;

    /// Returns `true` if an index has been saved.
    fn exists(&self) -> bool;

    /// Deletes the stored index. Returns `false` if there was nothing to delete.
    fn remove(&self) -> Result<bool>;

    /// Returns the storage path.
    fn path(&self) -> &Path;
}
