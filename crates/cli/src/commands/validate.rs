//! Validate command implementation.

use std::path::Path;

use miette::{Result, miette};
use serde_json::Value;

use crate::output;

/// Validates the plugin manifest.
pub async fn execute(manifest_path: &Path) -> Result<()> {
    output::info(&format!("Validating {}...", manifest_path.display()));

    let text = tokio::fs::read_to_string(manifest_path)
        .await
        .map_err(|e| miette!("Cannot read {}: {}", manifest_path.display(), e))?;

    let value: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            output::error(&format!("Parse error: {}", e));
            return Err(miette!("Validation failed: {}", e));
        }
    };

    let descriptor = match plugpack_manifest::validate(&value) {
        Ok(d) => d,
        Err(e) => {
            output::error(&e.to_string());
            return Err(miette!("Validation failed: {}", e));
        }
    };

    output::success(&format!(
        "Manifest is valid ({} v{}, {} settings)",
        descriptor.id,
        descriptor.version,
        descriptor.settings.len()
    ));

    Ok(())
}
