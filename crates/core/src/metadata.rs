//! Project metadata read from the package manifest next to the plugin manifest.

use serde::{Deserialize, Serialize};

/// Authoritative name/version pair read from the project's `package.json`.
///
/// When present, metadata is the source of truth: `name` overwrites the
/// descriptor's `id` and `version` overwrites the descriptor's `version`.
/// The sync is one-way; the descriptor never writes back into metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Package name.
    pub name: String,

    /// Package version.
    pub version: String,
}
