//! Counts and filter facets derived from the record store.
//!
//! Nothing here is cached; every call recomputes from the current snapshot.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Local};

use crate::db::RecordStore;
use crate::dict_suffixes;
use crate::error::Result;
use crate::models::{Enriched, Table, WordEntry};

/// Row count of a logical table
pub async fn count(store: &RecordStore, table: Table) -> Result<usize> {
    store.count(table).await
}

/// Canonical dictionary suffixes present in the word list.
///
/// Null and empty suffixes are skipped, a single leading `-` is stripped, and
/// values missing from the catalog are dropped.
pub async fn distinct_dict_suffixes(store: &RecordStore) -> Result<BTreeSet<String>> {
    let words = store.load_all::<WordEntry>().await?;
    Ok(dict_suffix_facet(&words))
}

/// Facet computation over already loaded words
#[must_use]
pub fn dict_suffix_facet(words: &[WordEntry]) -> BTreeSet<String> {
    words
        .iter()
        .filter_map(|word| word.dict_suffix.as_deref())
        .filter(|suffix| !suffix.is_empty())
        .filter_map(dict_suffixes::lookup_raw)
        .map(|entry| entry.locale.to_string())
        .collect()
}

/// Word list filter: text query plus selected dictionaries
#[derive(Debug, Clone, Default)]
pub struct WordFilter {
    query: Option<String>,
    suffixes: HashSet<String>,
}

impl WordFilter {
    /// A filter that keeps every row
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows whose text contains `query`, ignoring case
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        let trimmed = query.trim().to_lowercase();
        self.query = (!trimmed.is_empty()).then_some(trimmed);
        self
    }

    /// Keep rows looked up in one of `suffixes` (canonical form)
    #[must_use]
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `word` passes the filter
    #[must_use]
    pub fn matches(&self, word: &WordEntry) -> bool {
        if let Some(query) = &self.query {
            if !word.text.to_lowercase().contains(query.as_str()) {
                return false;
            }
        }

        if self.suffixes.is_empty() {
            return true;
        }
        let suffix = word.dict_suffix.as_deref().map_or("", dict_suffixes::normalize);
        self.suffixes.contains(suffix)
    }

    /// Apply the filter to an enriched word list, keeping order
    #[must_use]
    pub fn apply(&self, rows: Vec<Enriched<WordEntry>>) -> Vec<Enriched<WordEntry>> {
        rows.into_iter().filter(|row| self.matches(&row.entry)).collect()
    }
}

/// Dashboard summary of the loaded database
#[derive(Debug, Clone)]
pub struct Overview {
    /// Rows in `WordList`
    pub word_count: usize,
    /// Rows in `Bookmark`
    pub bookmark_count: usize,
    /// Size of the loaded file
    pub database_size_bytes: usize,
    /// When the database was last uploaded, if known
    pub last_uploaded: Option<DateTime<Local>>,
}

impl Overview {
    /// Collect counts from the store
    pub async fn collect(store: &RecordStore, last_uploaded: Option<DateTime<Local>>) -> Result<Self> {
        let reader = store.reader().await?;
        let snapshot = reader.snapshot()?;
        Ok(Self {
            word_count: snapshot.count(Table::Words),
            bookmark_count: snapshot.count(Table::Annotations),
            database_size_bytes: snapshot.size_bytes(),
            last_uploaded,
        })
    }
}
