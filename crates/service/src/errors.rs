use thiserror::Error;

/// Failures raised by a key-value store backend.
///
/// The session marker never wraps or rewrites these; callers see exactly
/// what the backend reported.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(String),
    #[error("storage file is corrupt: {0}")]
    Corrupt(String),
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error("storage lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io(format!("{}: {}", path.display(), err))
    }
}
