use std::path::Path;

use tracing::warn;

use crate::error::{KoboError, Result};

/// First bytes of every SQLite 3 database file
pub const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Validation utilities for uploads and export targets
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Check that `bytes` look like a SQLite database.
    ///
    /// Files above `soft_limit_mb` are accepted with a warning.
    pub fn validate_database_bytes(bytes: &[u8], soft_limit_mb: u64) -> Result<()> {
        if bytes.is_empty() {
            return Err(KoboError::MalformedDatabase("file is empty".to_string()));
        }

        if !bytes.starts_with(SQLITE_HEADER) {
            return Err(KoboError::MalformedDatabase(
                "file does not start with the SQLite header".to_string(),
            ));
        }

        let soft_limit = soft_limit_mb.saturating_mul(1024 * 1024);
        if bytes.len() as u64 > soft_limit {
            warn!(
                size_bytes = bytes.len(),
                soft_limit_mb, "Database is larger than the recommended size"
            );
        }

        Ok(())
    }

    /// Validate an export file path
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.is_empty() {
            return Err(KoboError::InvalidInput("File path cannot be empty".to_string()));
        }

        if path_str.contains('\0') {
            return Err(KoboError::InvalidInput(
                "File path contains invalid characters".to_string(),
            ));
        }

        if path_str.len() > 4096 {
            return Err(KoboError::InvalidInput(
                "File path too long (max 4096 characters)".to_string(),
            ));
        }

        if path.is_dir() {
            return Err(KoboError::InvalidInput(format!(
                "File path is a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }
}
