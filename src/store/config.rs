use crate::domain::models::PostgresConfig;
use crate::store::{Keyspace, StoreError};

const KEY: &str = "db_config";

/// Persisted directory connection parameters. Saved only on an explicit
/// save action; the live connection state is never written here.
pub struct ConfigStore {
    keyspace: Keyspace,
}

impl ConfigStore {
    pub fn new(keyspace: Keyspace) -> Self {
        Self { keyspace }
    }

    pub fn load(&self) -> Result<PostgresConfig, StoreError> {
        Ok(self.keyspace.load(KEY)?.unwrap_or_default())
    }

    pub fn save(&self, config: &PostgresConfig) -> Result<(), StoreError> {
        self.keyspace.save(KEY, config)
    }
}
