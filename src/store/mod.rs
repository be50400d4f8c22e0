pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub profiles: sled::Tree,
    pub attempts: sled::Tree,
    pub events: sled::Tree,
    pub daily_activity: sled::Tree,
    pub config_versions: sled::Tree,
    // Secondary index trees
    pub attempts_by_time: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        Ok(Self {
            profiles: db.open_tree(trees::PROFILES)?,
            attempts: db.open_tree(trees::ATTEMPTS)?,
            events: db.open_tree(trees::EVENTS)?,
            daily_activity: db.open_tree(trees::DAILY_ACTIVITY)?,
            config_versions: db.open_tree(trees::CONFIG_VERSIONS)?,
            attempts_by_time: db.open_tree(trees::ATTEMPTS_BY_TIME)?,
            db,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn raw_db(&self) -> &Db {
        &self.db
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
