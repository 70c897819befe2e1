//! Error types for pvr-extract
//!
//! This module provides the error handling for the library:
//! - A top-level [`Error`] returned by every fallible public operation
//! - Domain-specific error types for persistence and extraction
//! - Context information (config key, archive path, download ID)
//!
//! None of these errors are raised into the host's event dispatch. The event
//! loop logs them and moves on to the next download.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pvr-extract operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pvr-extract
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "use_name_folder")
        key: Option<String>,
    },

    /// No extraction program for any known archive format was found on the host
    ///
    /// This is fatal for the whole feature and is reported once at startup.
    #[error("no archive extracting programs found, extraction is disabled")]
    NoExtractors,

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Extraction error (destination, external tool)
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// The host download manager rejected or failed an accessor call
    #[error("host error: {0}")]
    Host(String),

    /// Download not known to the host
    #[error("download not found: {0}")]
    NotFound(String),

    /// External tool execution failed (could not be spawned, killed by signal, etc.)
    #[error("external tool error: {0}")]
    ExternalTool(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Extraction errors scoped to a single download
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The destination folder could not be created
    ///
    /// Aborts dispatch of the remaining archives of the download.
    #[error("error creating destination folder {}: {source}", .path.display())]
    DestinationCreateFailed {
        /// The folder that could not be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The destination path exists but is not a directory
    #[error("destination {} exists and is not a directory", .path.display())]
    DestinationNotDirectory {
        /// The conflicting path
        path: PathBuf,
    },

    /// The extraction program exited unsuccessfully
    #[error("extraction failed for {} (exit code {code:?}): {stderr}", .archive.display())]
    ToolFailed {
        /// The archive being extracted
        archive: PathBuf,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error output
        stderr: String,
    },
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
