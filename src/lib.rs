//! Kobo Reader - Word List and Bookmark Reconciliation
//!
//! A Rust library for reading a Kobo e-reader database (`KoboReader.sqlite`)
//! and joining saved words and bookmarks with the book metadata stored in the
//! same file.
//!
//! # Features
//!
//! - Load a database from raw bytes into an in-memory record store
//! - Resolve volume identifiers against the content catalog
//! - Batch enrichment with one lookup per distinct volume
//! - Counts and dictionary filter facets
//! - Export to CSV and JSON

/// Counts and filter facets
pub mod aggregate;
/// Persisted copy of the uploaded database
pub mod cache;
/// Configuration management
pub mod config;
/// In-memory record store
pub mod db;
/// Dictionary suffix catalog
pub mod dict_suffixes;
/// Error types
pub mod error;
/// CSV and JSON export
pub mod file_writer;
/// Batch enrichment
pub mod join;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Repository pattern for data access
pub mod repository;
/// Volume identifier resolution
pub mod resolver;
/// Kobo database schema definitions
pub mod schema;
/// Session lifecycle: upload, restore, clear
pub mod service;
/// Formatting helpers
pub mod utils;
/// Input validation
pub mod validation;

// Re-export key components for easier access
pub use db::RecordStore;
pub use error::{KoboError, Result};
pub use models::{AnnotationEntry, BookMeta, ContentRecord, Enriched, OutputFormat, WordEntry};
pub use repository::KoboRepository;
pub use service::KoboSession;
