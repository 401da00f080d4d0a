//! Error types for Plugpack.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Plugpack operations.
pub type Result<T> = std::result::Result<T, PackError>;

/// Main error type for Plugpack.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("Failed to read manifest: {path}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest is not valid JSON: {0}")]
    ManifestMalformed(String),

    #[error("Invalid manifest field `{field}`: {constraint}")]
    ManifestInvalid { field: String, constraint: String },

    #[error("Invalid project metadata: {0}")]
    MetadataInvalid(String),

    #[error("Missing {field} target: {path}")]
    MissingTarget { field: &'static str, path: PathBuf },

    #[error("Packaging command failed: {command}")]
    PackagingTool {
        command: String,
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    #[error("Failed to finalize artifact: {0}")]
    Finalization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
