pub mod admin;
pub mod branding;
pub mod config;
pub mod feedback;

pub use admin::{AdminStore, AuthError};
pub use branding::{BrandingError, BrandingStore};
pub use config::ConfigStore;
pub use feedback::FeedbackStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Local single-device key space: one JSON document per key, all inside one
/// data directory. Persistence is best effort; a failed write fails the
/// operation that attempted it and nothing is retried automatically.
#[derive(Clone, Debug)]
pub struct Keyspace {
    dir: PathBuf,
}

impl Keyspace {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Returns None when the key has never been written.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        std::fs::write(self.path(key), bytes)?;
        Ok(())
    }
}
