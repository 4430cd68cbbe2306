//! Service layer for the console session marker.
//! - `storage`: the key-value store seam and its backends.
//! - `session`: sign-in / sign-out / current-user bookkeeping over a store.

pub mod errors;
pub mod runtime;
pub mod session;
pub mod storage;

pub use errors::StoreError;
pub use session::{SessionMarker, SessionState, USER_KEY};
pub use storage::{JsonFileStore, KvStore, MemoryStore};
