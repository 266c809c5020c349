//! Loading, resolution and enrichment against real SQLite files.

mod common;

use std::collections::BTreeSet;

use common::KoboFixture;
use kobo_reader_rust::aggregate;
use kobo_reader_rust::join;
use kobo_reader_rust::models::{ContentKey, Table, WordKey};
use kobo_reader_rust::resolver;
use kobo_reader_rust::{ContentRecord, KoboError, KoboRepository, RecordStore, WordEntry};

async fn store_with(bytes: Vec<u8>) -> RecordStore {
    let store = RecordStore::new();
    store.load(bytes).await.expect("Failed to load database");
    store
}

#[tokio::test]
async fn test_empty_database() {
    let store = store_with(KoboFixture::new().bytes()).await;

    assert_eq!(aggregate::count(&store, Table::Words).await.unwrap(), 0);
    assert_eq!(aggregate::count(&store, Table::Annotations).await.unwrap(), 0);
    assert!(aggregate::distinct_dict_suffixes(&store).await.unwrap().is_empty());

    let reader = store.reader().await.unwrap();
    let enriched = join::enrich::<WordEntry, _>(&reader, Vec::new()).await.unwrap();
    assert!(enriched.is_empty());
    assert!(store.wordlist_with_book_meta().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unmatched_volume_has_no_meta() {
    let bytes = KoboFixture::new()
        .word("hello", Some("vol1"), Some("en"), Some("2024-01-01"))
        .bytes();
    let store = store_with(bytes).await;

    let words = store.wordlist_with_book_meta().await.unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].entry.text, "hello");
    assert_eq!(words[0].meta.book_title, None);
    assert_eq!(words[0].meta.book_author, None);
}

#[tokio::test]
async fn test_book_id_fallback() {
    let bytes = KoboFixture::new()
        .content("c1", Some("vol1"), None, Some("My Book"), Some("Jane Doe"))
        .word("hello", Some("vol1"), Some("en"), None)
        .bytes();
    let store = store_with(bytes).await;

    let words = store.wordlist_with_book_meta().await.unwrap();
    assert_eq!(words[0].meta.book_title.as_deref(), Some("My Book"));
    assert_eq!(words[0].meta.book_author.as_deref(), Some("Jane Doe"));
}

#[tokio::test]
async fn test_content_id_match_beats_book_id_match() {
    let bytes = KoboFixture::new()
        .content("other2", Some("vol1"), None, Some("Wrong Title"), None)
        .content("vol1", Some("other"), Some("Chapter Title"), None, None)
        .word("hello", Some("vol1"), None, None)
        .bytes();
    let store = store_with(bytes).await;

    let words = store.wordlist_with_book_meta().await.unwrap();
    assert_eq!(words[0].meta.book_title.as_deref(), Some("Chapter Title"));

    let reader = store.reader().await.unwrap();
    let direct = resolver::resolve_content(&reader, "vol1").await.unwrap().unwrap();
    assert_eq!(direct.content_id, "vol1");
}

#[tokio::test]
async fn test_book_id_lookup_returns_first_row_in_storage_order() {
    let bytes = KoboFixture::new()
        .content("book!ch1", Some("book"), Some("Chapter 1"), Some("The Book"), Some("A"))
        .content("book!ch2", Some("book"), Some("Chapter 2"), Some("The Book"), Some("A"))
        .bytes();
    let store = store_with(bytes).await;

    let first = store
        .find_by_identifier::<ContentRecord>(ContentKey::BookId, "book")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.content_id, "book!ch1");
}

#[tokio::test]
async fn test_batch_matches_individual_resolution() {
    let bytes = KoboFixture::new()
        .content("v1", None, Some("Book One"), None, Some("Author One"))
        .content("v2!ch", Some("v2"), Some(""), Some("Book Two"), None)
        .word("alpha", Some("v1"), None, None)
        .word("beta", Some("v2"), None, None)
        .word("gamma", Some("v3"), None, None)
        .word("delta", None, None, None)
        .word("epsilon", Some("v1"), None, None)
        .bytes();
    let store = store_with(bytes).await;

    let enriched = store.wordlist_with_book_meta().await.unwrap();
    assert_eq!(enriched.len(), 5);

    let reader = store.reader().await.unwrap();
    for row in &enriched {
        let expected = match row.entry.volume_id.as_deref() {
            Some(volume_id) => resolver::resolve(&reader, volume_id).await.unwrap(),
            None => kobo_reader_rust::BookMeta::unknown(),
        };
        assert_eq!(row.meta, expected, "mismatch for {}", row.entry.text);
    }

    let beta = enriched.iter().find(|row| row.entry.text == "beta").unwrap();
    assert_eq!(beta.meta.book_title.as_deref(), Some("Book Two"));

    let by_volume: Vec<_> = enriched
        .iter()
        .filter(|row| row.entry.volume_id.as_deref() == Some("v1"))
        .map(|row| &row.meta)
        .collect();
    assert_eq!(by_volume.len(), 2);
    assert_eq!(by_volume[0], by_volume[1]);
}

#[tokio::test]
async fn test_bookmarks_are_enriched() {
    let bytes = KoboFixture::new()
        .content("book-1", None, Some("Dune"), None, Some("Frank Herbert"))
        .bookmark("bm1", "book-1", Some("Fear is the mind-killer."), None)
        .bookmark("bm2", "book-1", Some("The spice must flow."), Some("classic"))
        .bookmark("bm3", "unknown-book", None, Some("orphan note"))
        .bytes();
    let store = store_with(bytes).await;

    assert_eq!(store.bookmarks_count().await.unwrap(), 3);
    let raw = store.bookmarks().await.unwrap();
    assert_eq!(raw[1].annotation.as_deref(), Some("classic"));
    assert_eq!(raw[0].end.offset, 12);

    let enriched = store.bookmarks_with_book_meta().await.unwrap();
    let ids: Vec<&str> = enriched.iter().map(|row| row.entry.bookmark_id.as_str()).collect();
    assert_eq!(ids, ["bm1", "bm2", "bm3"]);
    assert_eq!(enriched[0].meta.book_title.as_deref(), Some("Dune"));
    assert_eq!(enriched[1].meta.book_author.as_deref(), Some("Frank Herbert"));
    assert!(enriched[2].meta.is_unknown());
}

#[tokio::test]
async fn test_dict_suffix_facet() {
    let bytes = KoboFixture::new()
        .word("one", None, Some("-en"), None)
        .word("two", None, Some("de-en"), None)
        .word("three", None, Some("-xx"), None)
        .word("four", None, Some(""), None)
        .word("five", None, None, None)
        .bytes();
    let store = store_with(bytes).await;

    let facet = aggregate::distinct_dict_suffixes(&store).await.unwrap();
    let expected: BTreeSet<String> = ["de-en", "en"].iter().map(ToString::to_string).collect();
    assert_eq!(facet, expected);
}

#[tokio::test]
async fn test_find_word_by_text() {
    let bytes = KoboFixture::new().word("serendipity", Some("v1"), Some("en"), None).bytes();
    let store = store_with(bytes).await;

    let found = store
        .find_by_identifier::<WordEntry>(WordKey::Text, "serendipity")
        .await
        .unwrap();
    assert_eq!(found.and_then(|word| word.volume_id).as_deref(), Some("v1"));
    assert!(store
        .find_by_identifier::<WordEntry>(WordKey::Text, "missing")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_clear_invalidates_store_and_readers() {
    let store = store_with(KoboFixture::new().word("hello", Some("v1"), None, None).bytes()).await;
    let reader = store.reader().await.unwrap();

    store.clear().await;

    assert!(matches!(reader.load_all::<WordEntry>(), Err(KoboError::StorageUnavailable)));
    assert!(matches!(
        store.count(Table::Words).await,
        Err(KoboError::StorageUnavailable)
    ));
    assert!(matches!(
        store.wordlist_with_book_meta().await,
        Err(KoboError::StorageUnavailable)
    ));
}

#[tokio::test]
async fn test_reload_invalidates_pinned_reader() {
    let store = store_with(KoboFixture::new().word("old", Some("v1"), None, None).bytes()).await;
    let stale = store.reader().await.unwrap();

    store
        .load(KoboFixture::new().word("new", Some("v2"), None, None).bytes())
        .await
        .unwrap();

    let words = vec![WordEntry {
        text: "old".to_string(),
        volume_id: Some("v1".to_string()),
        dict_suffix: None,
        date_created: None,
    }];
    assert!(matches!(
        join::enrich(&stale, words).await,
        Err(KoboError::StorageUnavailable)
    ));

    let current = store.load_all::<WordEntry>().await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].text, "new");
}

#[tokio::test]
async fn test_malformed_uploads_are_rejected() {
    let store = RecordStore::new();

    let err = store.load(b"not a database at all".repeat(10)).await.unwrap_err();
    assert!(matches!(err, KoboError::MalformedDatabase(_)));

    let err = store.load(common::words_only_database()).await.unwrap_err();
    assert!(matches!(err, KoboError::MalformedDatabase(_)));
    assert!(!store.is_loaded().await);
}
