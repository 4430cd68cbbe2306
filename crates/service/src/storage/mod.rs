//! Storage abstractions for the service layer
//!
//! `KvStore` is the seam the session marker talks to. Two backends live
//! here: a JSON file store for real use and an in-memory map for tests.

pub mod json_map_store;
pub mod memory;

use crate::errors::StoreError;

pub use json_map_store::JsonFileStore;
pub use memory::MemoryStore;

/// Synchronous string key-value store.
/// Implementations can be file-backed, in-memory, or anything else that
/// offers atomic single-key get/set/remove.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a key that does not exist is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
