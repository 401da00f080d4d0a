//! Artifact finalization: canonical naming and stale-artifact replacement.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use plugpack_core::{PackError, PluginDescriptor, Result};

/// File extension of the final distributable artifact.
pub const ARTIFACT_EXTENSION: &str = "ppk";

/// Returns the canonical artifact file name for a descriptor.
pub fn artifact_name(descriptor: &PluginDescriptor) -> String {
    format!(
        "{}-{}.{}",
        descriptor.id, descriptor.version, ARTIFACT_EXTENSION
    )
}

/// Renames the raw archiver output to the canonical artifact name.
///
/// Any stale artifact of the same name is deleted first; a missing stale
/// artifact is not an error, any other deletion failure is. On failure the
/// raw archive stays on disk for inspection.
pub fn finalize(
    working_dir: &Path,
    descriptor: &PluginDescriptor,
    archive: &Path,
) -> Result<PathBuf> {
    if !archive.exists() {
        return Err(PackError::Finalization(format!(
            "packaging tool output not found: {}",
            archive.display()
        )));
    }

    let artifact = working_dir.join(artifact_name(descriptor));

    match fs::remove_file(&artifact) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(PackError::Finalization(format!(
                "cannot replace stale artifact {}: {e}",
                artifact.display()
            )));
        }
    }

    fs::rename(archive, &artifact).map_err(|e| {
        PackError::Finalization(format!(
            "cannot rename {} to {}: {e}",
            archive.display(),
            artifact.display()
        ))
    })?;

    Ok(artifact)
}
