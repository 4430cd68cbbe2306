use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_STORE_PATH: &str = "data/session.json";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_STORE_PATH) }

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Load from `CONFIG_PATH` or `config.toml`. A missing default file yields
/// defaults; a missing file named explicitly through `CONFIG_PATH` is an error.
pub fn load_default() -> Result<AppConfig> {
    match std::env::var("CONFIG_PATH") {
        Ok(path) => load_from_file(&path),
        Err(_) if !Path::new(DEFAULT_CONFIG_PATH).exists() => Ok(AppConfig::default()),
        Err(_) => load_from_file(DEFAULT_CONFIG_PATH),
    }
}

pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from an explicit path if given, otherwise via `load_default`.
    /// Nothing is validated yet so callers can layer overrides first.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => load_from_file(p),
            None => load_default(),
        }
    }

    /// Load, then apply overrides in increasing precedence: TOML,
    /// `SESSION_STORE_PATH`, `store_override`. Validation runs last.
    pub fn load_and_validate(path: Option<&Path>, store_override: Option<PathBuf>) -> Result<Self> {
        let mut cfg = Self::load(path)?;
        cfg.normalize_and_validate(store_override)?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self, store_override: Option<PathBuf>) -> Result<()> {
        self.storage.normalize_from_env();
        if let Some(store) = store_override {
            self.storage.path = store;
        }
        self.storage.validate()
    }
}

impl StorageConfig {
    /// `SESSION_STORE_PATH` takes precedence over the TOML value.
    pub fn normalize_from_env(&mut self) {
        if let Ok(path) = std::env::var("SESSION_STORE_PATH") {
            if !path.trim().is_empty() {
                self.path = PathBuf::from(path.trim());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() || self.path.to_string_lossy().trim().is_empty() {
            return Err(anyhow!("storage.path is empty; set it in config.toml or SESSION_STORE_PATH"));
        }
        if self.path.is_dir() {
            return Err(anyhow!("storage.path {} is a directory", self.path.display()));
        }
        Ok(())
    }
}
