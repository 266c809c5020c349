use async_trait::async_trait;

use crate::db::RecordStore;
use crate::error::Result;
use crate::join;
use crate::models::{AnnotationEntry, Enriched, Table, WordEntry};

/// Query surface the presentation layer consumes
#[async_trait]
pub trait KoboRepository: Send + Sync {
    /// Every saved word with the metadata of its book
    async fn wordlist_with_book_meta(&self) -> Result<Vec<Enriched<WordEntry>>>;
    /// Every bookmark with the metadata of its book
    async fn bookmarks_with_book_meta(&self) -> Result<Vec<Enriched<AnnotationEntry>>>;
    /// Raw bookmarks
    async fn bookmarks(&self) -> Result<Vec<AnnotationEntry>>;
    /// Number of saved words
    async fn wordlist_count(&self) -> Result<usize>;
    /// Number of bookmarks
    async fn bookmarks_count(&self) -> Result<usize>;
}

#[async_trait]
impl KoboRepository for RecordStore {
    async fn wordlist_with_book_meta(&self) -> Result<Vec<Enriched<WordEntry>>> {
        // Rows and lookups come from the same pinned snapshot.
        let reader = self.reader().await?;
        let words = reader.load_all::<WordEntry>()?;
        join::enrich(&reader, words).await
    }

    async fn bookmarks_with_book_meta(&self) -> Result<Vec<Enriched<AnnotationEntry>>> {
        let reader = self.reader().await?;
        let bookmarks = reader.load_all::<AnnotationEntry>()?;
        join::enrich(&reader, bookmarks).await
    }

    async fn bookmarks(&self) -> Result<Vec<AnnotationEntry>> {
        self.load_all().await
    }

    async fn wordlist_count(&self) -> Result<usize> {
        self.count(Table::Words).await
    }

    async fn bookmarks_count(&self) -> Result<usize> {
        self.count(Table::Annotations).await
    }
}
