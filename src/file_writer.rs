//! Export of enriched word lists and bookmarks.
//!
//! CSV output quotes a field only when it contains a comma, a double quote,
//! `\n` or `\r`, doubling embedded quotes. Null fields are empty. Rows are
//! separated by `\n` with no trailing newline.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use tracing::info;

use crate::error::{KoboError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{AnnotationEntry, Enriched, OutputFormat, WordEntry};
use crate::utils::format_date;
use crate::validation::InputValidator;

/// Header row of the word list CSV
pub const WORDLIST_HEADERS: [&str; 5] = ["Word", "Book Title", "Author", "Dictionary", "Date Created"];

/// Header row of the bookmark CSV
pub const BOOKMARK_HEADERS: [&str; 6] = ["Text", "Annotation", "Book Title", "Author", "Type", "Date Created"];

fn csv_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner()?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| KoboError::InvalidInput(format!("CSV output is not UTF-8: {e}")))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn field(value: Option<&String>) -> &str {
    value.map_or("", String::as_str)
}

fn date_field(value: Option<&String>) -> String {
    value.map(|raw| format_date(raw)).unwrap_or_default()
}

/// Render a word list as CSV
pub fn wordlist_to_csv(rows: &[Enriched<WordEntry>]) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(WORDLIST_HEADERS)?;

    for row in rows {
        let date = date_field(row.entry.date_created.as_ref());
        writer.write_record([
            row.entry.text.as_str(),
            field(row.meta.book_title.as_ref()),
            field(row.meta.book_author.as_ref()),
            field(row.entry.dict_suffix.as_ref()),
            date.as_str(),
        ])?;
    }

    finish(writer)
}

/// Render bookmarks as CSV
pub fn bookmarks_to_csv(rows: &[Enriched<AnnotationEntry>]) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(BOOKMARK_HEADERS)?;

    for row in rows {
        let date = date_field(row.entry.date_created.as_ref());
        writer.write_record([
            field(row.entry.text.as_ref()),
            field(row.entry.annotation.as_ref()),
            field(row.meta.book_title.as_ref()),
            field(row.meta.book_author.as_ref()),
            field(row.entry.kind.as_ref()),
            date.as_str(),
        ])?;
    }

    finish(writer)
}

/// Render any enriched rows as a pretty-printed JSON array
pub fn to_json<T: Serialize>(rows: &[Enriched<T>]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Render a word list in `format`
pub fn render_wordlist(rows: &[Enriched<WordEntry>], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => wordlist_to_csv(rows),
        OutputFormat::Json => to_json(rows),
    }
}

/// Render bookmarks in `format`
pub fn render_bookmarks(rows: &[Enriched<AnnotationEntry>], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => bookmarks_to_csv(rows),
        OutputFormat::Json => to_json(rows),
    }
}

/// Write a word list export to `file_path`
pub fn write_wordlist_to_file(rows: &[Enriched<WordEntry>], format: OutputFormat, file_path: &Path) -> Result<()> {
    let contents = render_wordlist(rows, format)?;
    write_export(&contents, file_path)?;
    MetricsCollector.record_export(format.extension(), rows.len());
    info!(rows = rows.len(), path = %file_path.display(), "Exported word list");
    Ok(())
}

/// Write a bookmark export to `file_path`
pub fn write_bookmarks_to_file(
    rows: &[Enriched<AnnotationEntry>],
    format: OutputFormat,
    file_path: &Path,
) -> Result<()> {
    let contents = render_bookmarks(rows, format)?;
    write_export(&contents, file_path)?;
    MetricsCollector.record_export(format.extension(), rows.len());
    info!(rows = rows.len(), path = %file_path.display(), "Exported bookmarks");
    Ok(())
}

fn write_export(contents: &str, file_path: &Path) -> Result<()> {
    InputValidator::validate_file_path(file_path)?;
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(file_path)?);
    writer.write_all(contents.as_bytes())?;
    writer.flush()?;
    Ok(())
}
