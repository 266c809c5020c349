//! Data models for Kobo records and their enriched views
//!
//! Raw rows mirror the three Kobo tables the crate reads. [`Enriched`] pairs
//! any raw row with the [`BookMeta`] resolved for its volume.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KoboError;
use crate::schema;

/// A saved dictionary lookup from the `WordList` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    /// The looked-up word, unique across the table
    pub text: String,
    /// Volume the word was looked up in
    pub volume_id: Option<String>,
    /// Dictionary used for the lookup, sometimes with a leading `-`
    pub dict_suffix: Option<String>,
    /// Lookup timestamp as stored on the device
    pub date_created: Option<String>,
}

/// Location of one end of a bookmark inside a content document.
///
/// Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Container path within the document
    pub container_path: String,
    /// Child index inside the container
    pub container_child_index: i64,
    /// Character offset
    pub offset: i64,
}

/// A bookmark, highlight or note from the `Bookmark` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationEntry {
    /// Device-generated primary key
    pub bookmark_id: String,
    /// Volume the bookmark belongs to
    pub volume_id: String,
    /// Content unit the bookmark points into
    pub content_id: String,
    /// Start of the selection
    pub start: Position,
    /// End of the selection
    pub end: Position,
    /// Selected text
    pub text: Option<String>,
    /// User note
    pub annotation: Option<String>,
    /// Text surrounding the selection
    pub context_string: Option<String>,
    /// Bookmark type as stored (`highlight`, `note`, `dogear`)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Creation timestamp
    pub date_created: Option<String>,
    /// Modification timestamp
    pub date_modified: Option<String>,
    /// Progress through the chapter, 0.0 to 1.0
    pub chapter_progress: Option<f64>,
}

/// A row of the `content` catalog: a whole book or one of its sub-units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Primary key
    pub content_id: String,
    /// Parent book, set on sub-units
    pub book_id: Option<String>,
    /// Title of this unit
    pub title: Option<String>,
    /// Title of the containing book
    pub book_title: Option<String>,
    /// Author string
    pub attribution: Option<String>,
}

/// Book metadata resolved for a volume identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMeta {
    /// Resolved book title
    pub book_title: Option<String>,
    /// Resolved author
    pub book_author: Option<String>,
}

impl BookMeta {
    /// Metadata used when a volume matches no content row
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            book_title: None,
            book_author: None,
        }
    }

    /// Derive metadata from a matched content row.
    ///
    /// The unit's own title wins when it is non-empty; otherwise the
    /// containing book's title is used.
    #[must_use]
    pub fn from_content(record: &ContentRecord) -> Self {
        let book_title = record
            .title
            .as_ref()
            .filter(|title| !title.is_empty())
            .or(record.book_title.as_ref())
            .cloned();

        Self {
            book_title,
            book_author: record.attribution.clone(),
        }
    }

    /// True when neither title nor author is known
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.book_title.is_none() && self.book_author.is_none()
    }
}

/// A raw row augmented with the metadata of its book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enriched<T> {
    /// The raw row
    #[serde(flatten)]
    pub entry: T,
    /// Metadata resolved from the row's volume identifier
    #[serde(flatten)]
    pub meta: BookMeta,
}

/// Rows that reference a volume
pub trait VolumeRef {
    /// The referenced volume, if any
    fn volume_id(&self) -> Option<&str>;
}

impl VolumeRef for WordEntry {
    fn volume_id(&self) -> Option<&str> {
        self.volume_id.as_deref()
    }
}

impl VolumeRef for AnnotationEntry {
    fn volume_id(&self) -> Option<&str> {
        Some(self.volume_id.as_str())
    }
}

/// Logical tables held by the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `WordList`
    Words,
    /// `Bookmark`
    Annotations,
    /// `content`
    Content,
}

impl Table {
    /// Table name in the Kobo schema
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Words => schema::word_list::TABLE,
            Self::Annotations => schema::bookmark::TABLE,
            Self::Content => schema::content::TABLE,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup keys for [`WordEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKey {
    /// `Text`
    Text,
    /// `VolumeId`
    VolumeId,
}

/// Lookup keys for [`AnnotationEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKey {
    /// `BookmarkID`
    BookmarkId,
    /// `VolumeID`
    VolumeId,
    /// `ContentID`
    ContentId,
}

/// Lookup keys for [`ContentRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKey {
    /// `ContentID`
    ContentId,
    /// `BookID`
    BookId,
}

/// Output format for exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values format
    Csv,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = KoboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(KoboError::InvalidInput(format!(
                "Unknown output format: {other}. Must be one of: csv, json"
            ))),
        }
    }
}
