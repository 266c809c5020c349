//! Database schema definitions
//!
//! Table and column names of the Kobo `KoboReader.sqlite` database, for the
//! three tables this crate reads. The device schema has many more tables and
//! columns; everything not listed here is ignored.

/// Saved dictionary lookups
pub mod word_list {
    /// Table name
    pub const TABLE: &str = "WordList";
    /// Looked-up word, primary key
    pub const TEXT: &str = "Text";
    /// Volume the lookup was made from
    pub const VOLUME_ID: &str = "VolumeId";
    /// Dictionary suffix, e.g. `-en` or `de-en`
    pub const DICT_SUFFIX: &str = "DictSuffix";
    /// Lookup timestamp column
    pub const DATE_CREATED: &str = "DateCreated";
}

/// Bookmarks, highlights and notes
pub mod bookmark {
    /// Table name
    pub const TABLE: &str = "Bookmark";
    /// Primary key column
    pub const BOOKMARK_ID: &str = "BookmarkID";
    /// Volume the bookmark belongs to
    pub const VOLUME_ID: &str = "VolumeID";
    /// Content unit (chapter) the bookmark points into
    pub const CONTENT_ID: &str = "ContentID";
    /// Start container path
    pub const START_CONTAINER_PATH: &str = "StartContainerPath";
    /// Start container child index
    pub const START_CONTAINER_CHILD_INDEX: &str = "StartContainerChildIndex";
    /// Start offset
    pub const START_OFFSET: &str = "StartOffset";
    /// End container path
    pub const END_CONTAINER_PATH: &str = "EndContainerPath";
    /// End container child index
    pub const END_CONTAINER_CHILD_INDEX: &str = "EndContainerChildIndex";
    /// End offset
    pub const END_OFFSET: &str = "EndOffset";
    /// Highlighted text
    pub const TEXT: &str = "Text";
    /// User note
    pub const ANNOTATION: &str = "Annotation";
    /// Creation timestamp
    pub const DATE_CREATED: &str = "DateCreated";
    /// Modification timestamp
    pub const DATE_MODIFIED: &str = "DateModified";
    /// Reading progress within the chapter
    pub const CHAPTER_PROGRESS: &str = "ChapterProgress";
    /// Surrounding text
    pub const CONTEXT_STRING: &str = "ContextString";
    /// Bookmark type (`highlight`, `note`, `dogear`)
    pub const TYPE: &str = "Type";
}

/// Content catalog: books and their sub-units
pub mod content {
    /// Table name
    pub const TABLE: &str = "content";
    /// Primary key column
    pub const CONTENT_ID: &str = "ContentID";
    /// Parent book of a sub-unit
    pub const BOOK_ID: &str = "BookID";
    /// Title of the containing book
    pub const BOOK_TITLE: &str = "BookTitle";
    /// Title of this unit
    pub const TITLE: &str = "Title";
    /// Author
    pub const ATTRIBUTION: &str = "Attribution";
}

/// Tables that must exist for a file to count as a Kobo database
pub const REQUIRED_TABLES: [&str; 3] = [word_list::TABLE, bookmark::TABLE, content::TABLE];
