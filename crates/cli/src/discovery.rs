//! Plugin manifest discovery logic.

use std::path::{Path, PathBuf};

use miette::{Result, miette};

/// Default plugin manifest name.
const MANIFEST_NAME: &str = "plugin.json";

/// Finds the plugin manifest by searching from the current directory upwards.
pub fn find_manifest() -> Result<PathBuf> {
    find_manifest_from(
        &std::env::current_dir().map_err(|e| miette!("Cannot get current directory: {}", e))?,
    )
}

/// Finds the plugin manifest starting from the given directory.
pub fn find_manifest_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let manifest = current.join(MANIFEST_NAME);

        if manifest.exists() && manifest.is_file() {
            return Ok(manifest);
        }

        // Try parent directory
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                return Err(miette!(
                    "{} not found in {} or any parent directory",
                    MANIFEST_NAME,
                    start.display()
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_manifest_in_current() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("plugin.json");
        fs::write(&manifest, "{}").unwrap();

        let result = find_manifest_from(dir.path()).unwrap();
        assert_eq!(result, manifest);
    }

    #[test]
    fn test_find_manifest_in_parent() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("plugin.json");
        fs::write(&manifest, "{}").unwrap();

        let subdir = dir.path().join("src");
        fs::create_dir(&subdir).unwrap();

        let result = find_manifest_from(&subdir).unwrap();
        assert_eq!(result, manifest);
    }

    #[test]
    fn test_find_manifest_not_found() {
        // Searching from / should fail as there's no plugin.json at the root
        let result = find_manifest_from(Path::new("/"));
        assert!(result.is_err());
    }
}
