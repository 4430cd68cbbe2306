//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binaries can open a session store
//! through `service` alone.

use std::{path::Path, sync::Arc};

use tracing::debug;

use crate::session::SessionMarker;
use crate::storage::JsonFileStore;

/// Ensure the store directory exists, open the JSON store and wrap it in a marker.
pub fn open_marker(store_path: &Path) -> anyhow::Result<SessionMarker> {
    common::env::ensure_store_dir(store_path)?;
    let store = JsonFileStore::open(store_path)?;
    debug!(store = %store.path().display(), "session store ready");
    Ok(SessionMarker::new(Arc::new(store)))
}
