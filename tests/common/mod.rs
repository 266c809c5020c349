//! Builds small Kobo databases on disk for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::{params, Connection};
use tempfile::TempDir;

const KOBO_SCHEMA: &str = "
    CREATE TABLE WordList (
        Text TEXT NOT NULL PRIMARY KEY,
        VolumeId TEXT,
        DictSuffix TEXT,
        DateCreated TEXT
    );
    CREATE TABLE Bookmark (
        BookmarkID TEXT NOT NULL PRIMARY KEY,
        VolumeID TEXT NOT NULL,
        ContentID TEXT NOT NULL,
        StartContainerPath TEXT NOT NULL,
        StartContainerChildIndex INTEGER NOT NULL,
        StartOffset INTEGER NOT NULL,
        EndContainerPath TEXT NOT NULL,
        EndContainerChildIndex INTEGER NOT NULL,
        EndOffset INTEGER NOT NULL,
        Text TEXT,
        Annotation TEXT,
        ExtraAnnotationData BLOB,
        DateCreated TEXT,
        ChapterProgress REAL NOT NULL DEFAULT 0,
        Hidden BOOL NOT NULL DEFAULT 0,
        Version TEXT,
        DateModified TEXT,
        Creator TEXT,
        UUID TEXT,
        UserID TEXT,
        SyncTime TEXT,
        Published BIT DEFAULT false,
        ContextString TEXT,
        Type TEXT
    );
    CREATE TABLE content (
        ContentID TEXT NOT NULL PRIMARY KEY,
        ContentType TEXT NOT NULL DEFAULT '6',
        MimeType TEXT NOT NULL DEFAULT 'application/epub+zip',
        BookID TEXT,
        BookTitle TEXT,
        Title TEXT,
        Attribution TEXT
    );
    CREATE TABLE Event (EventType INTEGER NOT NULL, ContentID TEXT NOT NULL);
";

/// A Kobo database under construction in a temporary directory
pub struct KoboFixture {
    dir: TempDir,
    path: PathBuf,
    conn: Connection,
}

impl KoboFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("KoboReader.sqlite");
        let conn = Connection::open(&path).expect("Failed to create database");
        conn.execute_batch(KOBO_SCHEMA).expect("Failed to create schema");
        Self { dir, path, conn }
    }

    pub fn word(self, text: &str, volume_id: Option<&str>, dict_suffix: Option<&str>, date_created: Option<&str>) -> Self {
        self.conn
            .execute(
                "INSERT INTO WordList (Text, VolumeId, DictSuffix, DateCreated) VALUES (?, ?, ?, ?)",
                params![text, volume_id, dict_suffix, date_created],
            )
            .expect("Failed to insert word");
        self
    }

    pub fn content(
        self,
        content_id: &str,
        book_id: Option<&str>,
        title: Option<&str>,
        book_title: Option<&str>,
        attribution: Option<&str>,
    ) -> Self {
        self.conn
            .execute(
                "INSERT INTO content (ContentID, BookID, Title, BookTitle, Attribution) VALUES (?, ?, ?, ?, ?)",
                params![content_id, book_id, title, book_title, attribution],
            )
            .expect("Failed to insert content");
        self
    }

    pub fn bookmark(self, bookmark_id: &str, volume_id: &str, text: Option<&str>, annotation: Option<&str>) -> Self {
        self.conn
            .execute(
                "INSERT INTO Bookmark (
                    BookmarkID, VolumeID, ContentID,
                    StartContainerPath, StartContainerChildIndex, StartOffset,
                    EndContainerPath, EndContainerChildIndex, EndOffset,
                    Text, Annotation, DateCreated, Type
                ) VALUES (?, ?, ?, 'span#kobo\\.1\\.1', 1, 0, 'span#kobo\\.1\\.2', 1, 12, ?, ?, '2024-02-01T09:00:00.000', 'highlight')",
                params![bookmark_id, volume_id, format!("{volume_id}!chapter1"), text, annotation],
            )
            .expect("Failed to insert bookmark");
        self
    }

    /// Close the database and return its bytes
    pub fn bytes(self) -> Vec<u8> {
        let Self { dir, path, conn } = self;
        drop(conn);
        let bytes = std::fs::read(&path).expect("Failed to read database file");
        drop(dir);
        bytes
    }
}

/// A file with only a word list table
pub fn words_only_database() -> Vec<u8> {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("partial.sqlite");
    {
        let conn = Connection::open(&path).expect("Failed to create database");
        conn.execute_batch("CREATE TABLE WordList (Text TEXT PRIMARY KEY, VolumeId TEXT, DictSuffix TEXT, DateCreated TEXT);")
            .expect("Failed to create schema");
    }
    std::fs::read(&path).expect("Failed to read database file")
}
