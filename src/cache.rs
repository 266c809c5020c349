use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

const DATABASE_KEY: &[u8] = b"database";

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    bytes: Vec<u8>,
    uploaded_at: DateTime<Local>,
}

/// Persistence for the last uploaded database
#[cfg_attr(test, mockall::automock)]
pub trait UploadCache: Send + Sync {
    /// Replace the stored database, stamping it with the current time
    fn save(&self, bytes: &[u8]) -> Result<DateTime<Local>>;

    /// The stored database bytes, if any
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// When the stored database was saved
    fn last_uploaded(&self) -> Result<Option<DateTime<Local>>>;

    /// Forget the stored database
    fn clear(&self) -> Result<()>;
}

/// Keeps the last uploaded database in sled so it survives a restart
pub struct DatabaseCache {
    db: sled::Db,
}

impl DatabaseCache {
    /// Open (or create) the cache under `cache_dir`
    pub fn open(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)?;
        let db = sled::open(cache_dir)?;
        Ok(Self { db })
    }

    /// Whether a database is stored
    pub fn has_stored_database(&self) -> Result<bool> {
        Ok(self.db.contains_key(DATABASE_KEY)?)
    }

    fn entry(&self) -> Result<Option<CacheEntry>> {
        match self.db.get(DATABASE_KEY)? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }
}

impl UploadCache for DatabaseCache {
    fn save(&self, bytes: &[u8]) -> Result<DateTime<Local>> {
        let uploaded_at = Local::now();
        let entry = CacheEntry {
            bytes: bytes.to_vec(),
            uploaded_at,
        };

        let data = bincode::serialize(&entry)?;
        self.db.insert(DATABASE_KEY, data)?;
        self.db.flush()?;
        debug!(size_bytes = bytes.len(), "Database cached");

        Ok(uploaded_at)
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.entry()?.map(|entry| entry.bytes))
    }

    fn last_uploaded(&self) -> Result<Option<DateTime<Local>>> {
        Ok(self.entry()?.map(|entry| entry.uploaded_at))
    }

    fn clear(&self) -> Result<()> {
        self.db.remove(DATABASE_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}
