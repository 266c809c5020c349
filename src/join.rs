//! Batch enrichment of raw rows with book metadata.
//!
//! Word lists and bookmarks outnumber the volumes they reference by orders of
//! magnitude, so each batch first resolves every distinct volume once into a
//! call-scoped cache and then attaches the cached metadata row by row.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::models::{BookMeta, Enriched, VolumeRef};
use crate::resolver::{self, ContentLookup};

/// Volume id to metadata, built once per [`enrich`] call
#[derive(Debug, Default)]
pub struct BookMetaCache {
    entries: HashMap<String, BookMeta>,
}

impl BookMetaCache {
    /// Resolve every distinct volume referenced by `rows`.
    ///
    /// Stops at the first lookup failure; a partially built cache is never
    /// returned.
    pub async fn build<T, L>(lookup: &L, rows: &[T]) -> Result<Self>
    where
        T: VolumeRef,
        L: ContentLookup + ?Sized,
    {
        let mut entries = HashMap::new();

        for volume_id in rows.iter().filter_map(volume_key) {
            if entries.contains_key(volume_id) {
                continue;
            }
            let meta = resolver::resolve(lookup, volume_id).await?;
            entries.insert(volume_id.to_string(), meta);
        }

        Ok(Self { entries })
    }

    /// Metadata for a volume; unknown for absent or uncached volumes
    #[must_use]
    pub fn get(&self, volume_id: Option<&str>) -> BookMeta {
        volume_id
            .filter(|id| !id.is_empty())
            .and_then(|id| self.entries.get(id))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of distinct volumes resolved
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no volume was resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Empty ids never reach the resolver, same as null ones.
fn volume_key<T: VolumeRef>(row: &T) -> Option<&str> {
    row.volume_id().filter(|id| !id.is_empty())
}

/// Attach [`BookMeta`] to every row.
///
/// Output has the same length and order as `rows`. Rows sharing a volume get
/// identical metadata. Any lookup failure fails the whole batch.
pub async fn enrich<T, L>(lookup: &L, rows: Vec<T>) -> Result<Vec<Enriched<T>>>
where
    T: VolumeRef,
    L: ContentLookup + ?Sized,
{
    let started = Instant::now();
    let cache = BookMetaCache::build(lookup, &rows).await?;

    let batch_size = rows.len();
    let enriched: Vec<Enriched<T>> = rows
        .into_iter()
        .map(|entry| {
            let meta = cache.get(entry.volume_id());
            Enriched { entry, meta }
        })
        .collect();

    debug!(
        rows = batch_size,
        distinct_volumes = cache.len(),
        duration_ms = started.elapsed().as_millis(),
        "Enriched batch"
    );
    MetricsCollector.record_enrich(batch_size, cache.len(), started.elapsed());

    Ok(enriched)
}
