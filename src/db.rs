//! In-memory record store over a loaded Kobo database.
//!
//! Uploaded bytes are parsed once with rusqlite into a [`Snapshot`] of typed
//! rows. The snapshot is replaced wholesale on every load and dropped on
//! clear; nothing is ever written back.

use std::collections::HashSet;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use rusqlite::{Connection, Row};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{KoboError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{
    AnnotationEntry, AnnotationKey, ContentKey, ContentRecord, Position, Table, WordEntry, WordKey,
};
use crate::resolver::ContentLookup;
use crate::schema::{bookmark, content, word_list, REQUIRED_TABLES};

/// Typed rows read from one database file
#[derive(Debug, Default)]
pub struct Snapshot {
    generation: u64,
    size_bytes: usize,
    words: Vec<WordEntry>,
    annotations: Vec<AnnotationEntry>,
    content: Vec<ContentRecord>,
}

impl Snapshot {
    /// Parse raw database bytes.
    ///
    /// Blocking: the bytes are copied to a scratch file so SQLite can open
    /// them. Any SQLite failure here means the upload is unusable and is
    /// reported as [`KoboError::MalformedDatabase`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut scratch = tempfile::NamedTempFile::new()?;
        scratch.write_all(bytes)?;
        scratch.flush()?;

        let conn = Connection::open(scratch.path()).map_err(malformed)?;
        let mut snapshot = Self::from_connection(&conn)?;
        snapshot.size_bytes = bytes.len();
        Ok(snapshot)
    }

    /// Read the three Kobo tables from an open connection
    pub fn from_connection(conn: &Connection) -> Result<Self> {
        ensure_tables(conn)?;

        let words = read_rows(conn, &word_query(), map_word).map_err(malformed)?;
        let annotations = read_rows(conn, &annotation_query(), map_annotation).map_err(malformed)?;
        let content = read_rows(conn, &content_query(), map_content).map_err(malformed)?;

        Ok(Self {
            generation: 0,
            size_bytes: 0,
            words,
            annotations,
            content,
        })
    }

    /// Size of the file this snapshot was parsed from
    #[must_use]
    pub const fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Row count of a logical table
    #[must_use]
    pub fn count(&self, table: Table) -> usize {
        match table {
            Table::Words => self.words.len(),
            Table::Annotations => self.annotations.len(),
            Table::Content => self.content.len(),
        }
    }
}

fn malformed(err: rusqlite::Error) -> KoboError {
    KoboError::MalformedDatabase(err.to_string())
}

fn ensure_tables(conn: &Connection) -> Result<()> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
        .map_err(malformed)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(malformed)?
        .map(|name| name.map(|n| n.to_lowercase()))
        .collect::<rusqlite::Result<HashSet<_>>>()
        .map_err(malformed)?;

    let missing: Vec<&str> = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|table| !names.contains(&table.to_lowercase()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(KoboError::MalformedDatabase(format!(
            "missing tables: {}",
            missing.join(", ")
        )))
    }
}

fn read_rows<T>(
    conn: &Connection,
    query: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(query)?;
    let rows = stmt.query_map([], map)?;
    rows.collect()
}

fn word_query() -> String {
    format!(
        "SELECT {}, {}, {}, {} FROM {}",
        word_list::TEXT,
        word_list::VOLUME_ID,
        word_list::DICT_SUFFIX,
        word_list::DATE_CREATED,
        word_list::TABLE
    )
}

fn annotation_query() -> String {
    let columns = [
        bookmark::BOOKMARK_ID,
        bookmark::VOLUME_ID,
        bookmark::CONTENT_ID,
        bookmark::START_CONTAINER_PATH,
        bookmark::START_CONTAINER_CHILD_INDEX,
        bookmark::START_OFFSET,
        bookmark::END_CONTAINER_PATH,
        bookmark::END_CONTAINER_CHILD_INDEX,
        bookmark::END_OFFSET,
        bookmark::TEXT,
        bookmark::ANNOTATION,
        bookmark::CONTEXT_STRING,
        bookmark::TYPE,
        bookmark::DATE_CREATED,
        bookmark::DATE_MODIFIED,
        bookmark::CHAPTER_PROGRESS,
    ];
    format!("SELECT {} FROM {}", columns.join(", "), bookmark::TABLE)
}

fn content_query() -> String {
    format!(
        "SELECT {}, {}, {}, {}, {} FROM {}",
        content::CONTENT_ID,
        content::BOOK_ID,
        content::TITLE,
        content::BOOK_TITLE,
        content::ATTRIBUTION,
        content::TABLE
    )
}

fn map_word(row: &Row<'_>) -> rusqlite::Result<WordEntry> {
    Ok(WordEntry {
        text: row.get(word_list::TEXT)?,
        volume_id: row.get(word_list::VOLUME_ID)?,
        dict_suffix: row.get(word_list::DICT_SUFFIX)?,
        date_created: row.get(word_list::DATE_CREATED)?,
    })
}

fn map_annotation(row: &Row<'_>) -> rusqlite::Result<AnnotationEntry> {
    Ok(AnnotationEntry {
        bookmark_id: row.get(bookmark::BOOKMARK_ID)?,
        volume_id: row.get(bookmark::VOLUME_ID)?,
        content_id: row.get(bookmark::CONTENT_ID)?,
        start: Position {
            container_path: row.get(bookmark::START_CONTAINER_PATH)?,
            container_child_index: row.get(bookmark::START_CONTAINER_CHILD_INDEX)?,
            offset: row.get(bookmark::START_OFFSET)?,
        },
        end: Position {
            container_path: row.get(bookmark::END_CONTAINER_PATH)?,
            container_child_index: row.get(bookmark::END_CONTAINER_CHILD_INDEX)?,
            offset: row.get(bookmark::END_OFFSET)?,
        },
        text: row.get(bookmark::TEXT)?,
        annotation: row.get(bookmark::ANNOTATION)?,
        context_string: row.get(bookmark::CONTEXT_STRING)?,
        kind: row.get(bookmark::TYPE)?,
        date_created: row.get(bookmark::DATE_CREATED)?,
        date_modified: row.get(bookmark::DATE_MODIFIED)?,
        chapter_progress: row.get(bookmark::CHAPTER_PROGRESS)?,
    })
}

fn map_content(row: &Row<'_>) -> rusqlite::Result<ContentRecord> {
    Ok(ContentRecord {
        content_id: row.get(content::CONTENT_ID)?,
        book_id: row.get(content::BOOK_ID)?,
        title: row.get(content::TITLE)?,
        book_title: row.get(content::BOOK_TITLE)?,
        attribution: row.get(content::ATTRIBUTION)?,
    })
}

/// A row type held in a [`Snapshot`]
pub trait Record: Clone + Send + Sync + 'static {
    /// Columns this row can be looked up by
    type Key: Copy + Send + Sync;

    /// Logical table the rows come from
    const TABLE: Table;

    /// All rows of this type, in storage order
    fn rows(snapshot: &Snapshot) -> &[Self];

    /// Value of a lookup column, `None` when the column is null
    fn key(&self, key: Self::Key) -> Option<&str>;
}

impl Record for WordEntry {
    type Key = WordKey;
    const TABLE: Table = Table::Words;

    fn rows(snapshot: &Snapshot) -> &[Self] {
        &snapshot.words
    }

    fn key(&self, key: WordKey) -> Option<&str> {
        match key {
            WordKey::Text => Some(&self.text),
            WordKey::VolumeId => self.volume_id.as_deref(),
        }
    }
}

impl Record for AnnotationEntry {
    type Key = AnnotationKey;
    const TABLE: Table = Table::Annotations;

    fn rows(snapshot: &Snapshot) -> &[Self] {
        &snapshot.annotations
    }

    fn key(&self, key: AnnotationKey) -> Option<&str> {
        match key {
            AnnotationKey::BookmarkId => Some(&self.bookmark_id),
            AnnotationKey::VolumeId => Some(&self.volume_id),
            AnnotationKey::ContentId => Some(&self.content_id),
        }
    }
}

impl Record for ContentRecord {
    type Key = ContentKey;
    const TABLE: Table = Table::Content;

    fn rows(snapshot: &Snapshot) -> &[Self] {
        &snapshot.content
    }

    fn key(&self, key: ContentKey) -> Option<&str> {
        match key {
            ContentKey::ContentId => Some(&self.content_id),
            ContentKey::BookId => self.book_id.as_deref(),
        }
    }
}

/// Holder of the currently loaded database.
///
/// Single writer (load/clear), many readers. Every load or clear bumps a
/// generation counter so readers pinned to an older snapshot fail instead of
/// returning stale rows.
#[derive(Debug, Default)]
pub struct RecordStore {
    current: RwLock<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
    metrics: MetricsCollector,
}

impl RecordStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `bytes` and make them the current database
    pub async fn load(&self, bytes: Vec<u8>) -> Result<()> {
        let snapshot = self.parse(bytes).await?;
        self.install(snapshot).await;
        Ok(())
    }

    /// Parse `bytes` on a blocking thread without touching the current database
    pub async fn parse(&self, bytes: Vec<u8>) -> Result<Snapshot> {
        let started = Instant::now();
        let size = bytes.len();
        let parsed = tokio::task::spawn_blocking(move || Snapshot::from_bytes(&bytes)).await?;

        match parsed {
            Ok(snapshot) => {
                self.metrics.record_database_load(size, started.elapsed());
                Ok(snapshot)
            },
            Err(err) => {
                self.metrics.record_error("malformed_database", "load");
                Err(err)
            },
        }
    }

    /// Make a parsed snapshot the current database, invalidating pinned readers
    pub async fn install(&self, mut snapshot: Snapshot) {
        let mut current = self.current.write().await;
        snapshot.generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            generation = snapshot.generation,
            size_bytes = snapshot.size_bytes,
            words = snapshot.words.len(),
            annotations = snapshot.annotations.len(),
            content = snapshot.content.len(),
            "Database loaded"
        );
        *current = Some(Arc::new(snapshot));
    }

    /// Drop the current database, invalidating pinned readers
    pub async fn clear(&self) {
        let mut current = self.current.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *current = None;
        info!("Database cleared");
    }

    /// Whether a database is currently loaded
    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Pin the current snapshot for a batch of reads
    pub async fn reader(&self) -> Result<StoreReader<'_>> {
        let snapshot = self
            .current
            .read()
            .await
            .clone()
            .ok_or(KoboError::StorageUnavailable)?;
        Ok(StoreReader {
            store: self,
            snapshot,
        })
    }

    /// Every row of `T`'s table
    pub async fn load_all<T: Record>(&self) -> Result<Vec<T>> {
        self.reader().await?.load_all()
    }

    /// First row of `T`'s table whose `key` column equals `value`
    pub async fn find_by_identifier<T: Record>(&self, key: T::Key, value: &str) -> Result<Option<T>> {
        self.reader().await?.find_by_identifier(key, value)
    }

    /// Row count of a logical table
    pub async fn count(&self, table: Table) -> Result<usize> {
        Ok(self.reader().await?.snapshot()?.count(table))
    }

    /// Size in bytes of the loaded file
    pub async fn size_bytes(&self) -> Result<usize> {
        Ok(self.reader().await?.snapshot()?.size_bytes())
    }
}

/// Read access pinned to one snapshot generation
#[derive(Debug)]
pub struct StoreReader<'a> {
    store: &'a RecordStore,
    snapshot: Arc<Snapshot>,
}

impl StoreReader<'_> {
    /// The pinned snapshot, if it is still the current one
    pub fn snapshot(&self) -> Result<&Snapshot> {
        if self.store.generation.load(Ordering::SeqCst) == self.snapshot.generation {
            Ok(&self.snapshot)
        } else {
            debug!(generation = self.snapshot.generation, "Rejecting read from stale snapshot");
            Err(KoboError::StorageUnavailable)
        }
    }

    /// Every row of `T`'s table
    pub fn load_all<T: Record>(&self) -> Result<Vec<T>> {
        Ok(T::rows(self.snapshot()?).to_vec())
    }

    /// First row of `T`'s table whose `key` column equals `value`
    pub fn find_by_identifier<T: Record>(&self, key: T::Key, value: &str) -> Result<Option<T>> {
        Ok(T::rows(self.snapshot()?)
            .iter()
            .find(|row| row.key(key) == Some(value))
            .cloned())
    }
}

#[async_trait]
impl ContentLookup for StoreReader<'_> {
    async fn find_content(&self, key: ContentKey, value: &str) -> Result<Option<ContentRecord>> {
        tokio::task::yield_now().await;
        self.find_by_identifier(key, value)
    }
}
