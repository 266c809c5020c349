//! Volume identifier resolution against the content catalog.
//!
//! The `content` table mixes whole books and their chapters, so a volume id
//! may equal one row's `ContentID` and another row's `BookID` at the same
//! time. A direct `ContentID` match always wins; a `BookID` match is the
//! fallback.

use async_trait::async_trait;
use tracing::trace;

use crate::error::Result;
use crate::models::{BookMeta, ContentKey, ContentRecord};

/// Point lookups into the content catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentLookup: Send + Sync {
    /// First content row whose `key` column equals `value`
    async fn find_content(&self, key: ContentKey, value: &str) -> Result<Option<ContentRecord>>;
}

/// Find the content row that best describes `volume_id`.
///
/// Returns `Ok(None)` when nothing matches; errors only come from the lookup
/// itself.
pub async fn resolve_content<L>(lookup: &L, volume_id: &str) -> Result<Option<ContentRecord>>
where
    L: ContentLookup + ?Sized,
{
    if let Some(record) = lookup.find_content(ContentKey::ContentId, volume_id).await? {
        trace!(volume_id, content_id = %record.content_id, "Resolved by content id");
        return Ok(Some(record));
    }

    let fallback = lookup.find_content(ContentKey::BookId, volume_id).await?;
    if let Some(record) = &fallback {
        trace!(volume_id, content_id = %record.content_id, "Resolved by book id");
    }
    Ok(fallback)
}

/// Resolve `volume_id` straight to [`BookMeta`], unknown when unmatched
pub async fn resolve<L>(lookup: &L, volume_id: &str) -> Result<BookMeta>
where
    L: ContentLookup + ?Sized,
{
    Ok(resolve_content(lookup, volume_id)
        .await?
        .as_ref()
        .map_or_else(BookMeta::unknown, BookMeta::from_content))
}
