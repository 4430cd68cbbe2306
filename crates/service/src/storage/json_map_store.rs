use std::{
    collections::HashMap,
    ffi::OsString,
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tracing::debug;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::storage::KvStore;

/// JSON file-backed string map, the on-disk analogue of browser local storage.
///
/// Nothing is cached: every operation takes an advisory lock on a sibling
/// `<name>.lock` file, reads the current map from disk and, for mutations,
/// writes it back. Several handles or processes can therefore share one file
/// and each key follows last-write-wins. Writes go to a uniquely named
/// temporary file which is renamed over the target, so readers never see a
/// partial file.
#[derive(Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
    lock_path: PathBuf,
}

/// Held for the duration of one operation; closing the file releases the lock.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn shared(path: &Path) -> Result<Self, StoreError> {
        let file = open_lock_file(path)?;
        FileExt::lock_shared(&file).map_err(|e| StoreError::io(path, e))?;
        Ok(Self { _file: file })
    }

    fn exclusive(path: &Path) -> Result<Self, StoreError> {
        let file = open_lock_file(path)?;
        FileExt::lock_exclusive(&file).map_err(|e| StoreError::io(path, e))?;
        Ok(Self { _file: file })
    }
}

fn open_lock_file(path: &Path) -> Result<File, StoreError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| StoreError::io(path, e))
}

impl JsonFileStore {
    /// Open the store at `path`. Creates parent directories and an empty map
    /// file if missing; a file that is not a JSON string map is rejected.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let store = Self { lock_path: sibling(&file_path, ".lock"), file_path };

        let _lock = FileLock::exclusive(&store.lock_path)?;
        let entries = match fs::metadata(&store.file_path) {
            Ok(_) => store.read_map()?.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                store.write_map(&HashMap::new())?;
                0
            }
            Err(e) => return Err(StoreError::io(&store.file_path, e)),
        };
        debug!(path = %store.file_path.display(), entries, "opened json store");

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// List all entries as `(key, value)` pairs.
    pub fn list(&self) -> Result<Vec<(String, String)>, StoreError> {
        let _lock = FileLock::shared(&self.lock_path)?;
        Ok(self.read_map()?.into_iter().collect())
    }

    /// A file removed from under us reads as an empty map.
    fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        let bytes = match fs::read(&self.file_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(StoreError::io(&self.file_path, e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(HashMap::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.file_path.display(), e)))
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(map).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let tmp = sibling(&self.file_path, &format!(".{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, data) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&self.file_path, e));
        }
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _lock = FileLock::shared(&self.lock_path)?;
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _lock = FileLock::exclusive(&self.lock_path)?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        debug!(%key, path = %self.file_path.display(), "persisted key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _lock = FileLock::exclusive(&self.lock_path)?;
        let mut map = self.read_map()?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)?;
        debug!(%key, path = %self.file_path.display(), "removed key");
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
