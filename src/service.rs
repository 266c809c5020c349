use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::aggregate::Overview;
use crate::cache::{DatabaseCache, UploadCache};
use crate::config::AppConfig;
use crate::db::RecordStore;
use crate::error::Result;
use crate::validation::InputValidator;

/// One user's view of one Kobo database.
///
/// Owns the record store and the persisted upload, and keeps the two in step:
/// a successful upload replaces both, a failed one replaces neither, clearing
/// empties both.
pub struct KoboSession {
    store: RecordStore,
    cache: Box<dyn UploadCache>,
    soft_size_limit_mb: u64,
}

impl KoboSession {
    /// Open a session over the configured cache directory
    pub fn open(config: &AppConfig) -> Result<Self> {
        let cache = DatabaseCache::open(&config.cache_dir())?;
        Ok(Self::with_cache(cache, config.storage.soft_size_limit_mb))
    }

    /// Build a session around an existing cache
    #[must_use]
    pub fn with_cache(cache: impl UploadCache + 'static, soft_size_limit_mb: u64) -> Self {
        Self {
            store: RecordStore::new(),
            cache: Box::new(cache),
            soft_size_limit_mb,
        }
    }

    /// The record store backing this session
    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Load the persisted database, if any. Returns whether one was loaded.
    pub async fn restore(&self) -> Result<bool> {
        let Some(bytes) = self.cache.load()? else {
            info!("No stored database to restore");
            return Ok(false);
        };

        self.store.load(bytes).await?;
        info!("Restored stored database");
        Ok(true)
    }

    /// Parse an upload, persist it, then make it current.
    ///
    /// When parsing or persisting fails the previously loaded database and
    /// its stored copy both stay in place.
    pub async fn upload(&self, bytes: Vec<u8>) -> Result<DateTime<Local>> {
        InputValidator::validate_database_bytes(&bytes, self.soft_size_limit_mb)?;

        let size = bytes.len();
        let persisted = bytes.clone();
        let snapshot = self.store.parse(bytes).await?;
        let uploaded_at = self.cache.save(&persisted)?;
        self.store.install(snapshot).await;

        info!(size_bytes = size, "Database uploaded");
        Ok(uploaded_at)
    }

    /// Drop the loaded database and forget the persisted copy
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await;
        if let Err(err) = self.cache.clear() {
            warn!(error = %err, "Failed to clear stored database");
            return Err(err);
        }
        Ok(())
    }

    /// When the persisted database was uploaded
    pub fn last_uploaded(&self) -> Result<Option<DateTime<Local>>> {
        self.cache.last_uploaded()
    }

    /// Counts and size of the loaded database
    pub async fn overview(&self) -> Result<Overview> {
        Overview::collect(&self.store, self.last_uploaded()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MockUploadCache;
    use crate::error::KoboError;
    use crate::models::Table;
    use mockall::Sequence;
    use rusqlite::Connection;

    fn kobo_bytes(words: &[&str]) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("KoboReader.sqlite");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE WordList (Text TEXT PRIMARY KEY, VolumeId TEXT, DictSuffix TEXT, DateCreated TEXT);
                 CREATE TABLE Bookmark (
                    BookmarkID TEXT PRIMARY KEY, VolumeID TEXT NOT NULL, ContentID TEXT NOT NULL,
                    StartContainerPath TEXT NOT NULL, StartContainerChildIndex INTEGER NOT NULL, StartOffset INTEGER NOT NULL,
                    EndContainerPath TEXT NOT NULL, EndContainerChildIndex INTEGER NOT NULL, EndOffset INTEGER NOT NULL,
                    Text TEXT, Annotation TEXT, ContextString TEXT, Type TEXT,
                    DateCreated TEXT, DateModified TEXT, ChapterProgress REAL);
                 CREATE TABLE content (ContentID TEXT PRIMARY KEY, BookID TEXT, Title TEXT, BookTitle TEXT, Attribution TEXT);",
            )
            .unwrap();
            for word in words {
                conn.execute("INSERT INTO WordList (Text) VALUES (?)", [word]).unwrap();
            }
        }
        std::fs::read(&path).unwrap()
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_database() {
        let first_saved = Local::now();
        let mut cache = MockUploadCache::new();
        let mut seq = Sequence::new();
        cache
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(first_saved));
        cache
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(KoboError::Cache("disk full".to_string())));
        cache.expect_last_uploaded().returning(move || Ok(Some(first_saved)));

        let session = KoboSession::with_cache(cache, 50);
        session.upload(kobo_bytes(&["one"])).await.unwrap();

        let err = session.upload(kobo_bytes(&["two", "three"])).await.unwrap_err();
        assert!(matches!(err, KoboError::Cache(_)));

        assert_eq!(session.store().count(Table::Words).await.unwrap(), 1);
        let overview = session.overview().await.unwrap();
        assert_eq!(overview.word_count, 1);
        assert_eq!(overview.last_uploaded, Some(first_saved));
    }

    #[tokio::test]
    async fn test_malformed_upload_is_never_saved() {
        let mut cache = MockUploadCache::new();
        cache.expect_save().never();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.sqlite");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE WordList (Text TEXT PRIMARY KEY);").unwrap();
        }
        let bytes = std::fs::read(&path).unwrap();

        let session = KoboSession::with_cache(cache, 50);
        assert!(matches!(
            session.upload(bytes).await,
            Err(KoboError::MalformedDatabase(_))
        ));
        assert!(!session.store().is_loaded().await);
    }
}
