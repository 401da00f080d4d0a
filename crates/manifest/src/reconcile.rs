//! One-way reconciliation of project metadata onto the plugin manifest.

use plugpack_core::{PackError, PluginDescriptor, ProjectMetadata, Result};
use serde_json::Value;

use crate::schema;

/// Validates a raw `package.json` value against the metadata schema.
///
/// Metadata failures are distinct from descriptor validation failures: a
/// malformed `package.json` aborts the pipeline with [`PackError::MetadataInvalid`].
pub fn parse_metadata(value: &Value) -> Result<ProjectMetadata> {
    let object = value
        .as_object()
        .ok_or_else(|| PackError::MetadataInvalid("expected a JSON object".to_string()))?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| PackError::MetadataInvalid("missing or non-string `name`".to_string()))?;

    let version = object
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| PackError::MetadataInvalid("missing or non-string `version`".to_string()))?;

    semver::Version::parse(version).map_err(|e| {
        PackError::MetadataInvalid(format!("`version` is not a valid semantic version: {e}"))
    })?;

    Ok(ProjectMetadata {
        name: name.to_string(),
        version: version.to_string(),
    })
}

/// Overlays authoritative metadata onto the raw manifest and re-validates.
///
/// Only `id` and `version` are ever overwritten; the sync is one-way and
/// idempotent. Mutating the raw value rather than re-serializing the typed
/// descriptor preserves any extra fields the manifest carries. The caller is
/// responsible for persisting the mutated value.
///
/// A re-validation failure surfaces as a descriptor validation error, not a
/// metadata error.
pub fn reconcile(raw: &mut Value, metadata: &ProjectMetadata) -> Result<PluginDescriptor> {
    let object = raw.as_object_mut().ok_or_else(|| PackError::ManifestInvalid {
        field: "manifest".to_string(),
        constraint: "expected a JSON object".to_string(),
    })?;

    object.insert("id".to_string(), Value::String(metadata.name.clone()));
    object.insert(
        "version".to_string(),
        Value::String(metadata.version.clone()),
    );

    schema::validate(raw)
}
