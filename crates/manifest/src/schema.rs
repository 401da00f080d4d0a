//! Declarative validation of a raw manifest JSON value.

use std::collections::BTreeMap;

use plugpack_core::{PackError, PluginDescriptor, Result, SettingDef};
use serde_json::{Map, Value};

/// Maximum length for identity, path and label fields.
pub const MAX_FIELD_LEN: usize = 100;

/// Maximum length for string setting fallbacks.
pub const MAX_FALLBACK_LEN: usize = 1024;

/// Validates a raw JSON value against the plugin manifest schema.
///
/// Validation is total and upfront: the returned descriptor has passed every
/// constraint. On failure the error names the first violated field in
/// declaration order. Pure function; no side effects.
pub fn validate(value: &Value) -> Result<PluginDescriptor> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid("manifest", "expected a JSON object"))?;

    let id = required_string(object, "id")?;
    let name = required_string(object, "name")?;
    let version = required_string(object, "version")?;
    check_version(&version)?;
    let author = required_string(object, "author")?;
    let main = required_string(object, "main")?;
    let dev = optional_string(object, "dev")?;
    let remote = optional_string(object, "remote")?;
    let icon = optional_string(object, "icon")?;
    let remote_icon = optional_string(object, "remoteIcon")?;
    let settings = validate_settings(object.get("settings"))?;

    Ok(PluginDescriptor {
        id,
        name,
        version,
        author,
        main,
        dev,
        remote,
        icon,
        remote_icon,
        settings,
    })
}

fn invalid(field: impl Into<String>, constraint: impl Into<String>) -> PackError {
    PackError::ManifestInvalid {
        field: field.into(),
        constraint: constraint.into(),
    }
}

fn required_string(object: &Map<String, Value>, key: &str) -> Result<String> {
    let value = object
        .get(key)
        .ok_or_else(|| invalid(key, "required field is missing"))?;
    let text = value
        .as_str()
        .ok_or_else(|| invalid(key, "expected a string"))?;
    check_bounds(key, text)?;
    Ok(text.to_string())
}

fn optional_string(object: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let text = value
                .as_str()
                .ok_or_else(|| invalid(key, "expected a string"))?;
            check_bounds(key, text)?;
            Ok(Some(text.to_string()))
        }
    }
}

fn check_bounds(key: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(invalid(key, "must not be empty"));
    }
    if text.chars().count() > MAX_FIELD_LEN {
        return Err(invalid(
            key,
            format!("must be at most {MAX_FIELD_LEN} characters"),
        ));
    }
    Ok(())
}

fn check_version(version: &str) -> Result<()> {
    semver::Version::parse(version)
        .map(|_| ())
        .map_err(|e| invalid("version", format!("not a valid semantic version: {e}")))
}

fn validate_settings(value: Option<&Value>) -> Result<BTreeMap<String, SettingDef>> {
    let Some(value) = value else {
        return Ok(BTreeMap::new());
    };
    if value.is_null() {
        return Ok(BTreeMap::new());
    }

    let entries = value
        .as_object()
        .ok_or_else(|| invalid("settings", "expected an object"))?;

    let mut settings = BTreeMap::new();
    for (key, entry) in entries {
        let field = format!("settings.{key}");

        if !entry.is_object() {
            return Err(invalid(&field, "expected an object"));
        }
        if entry.get("type").is_none() {
            return Err(invalid(&field, "setting has no type"));
        }

        let definition: SettingDef = serde_json::from_value(entry.clone())
            .map_err(|e| invalid(&field, e.to_string()))?;
        check_setting(&field, &definition)?;
        settings.insert(key.clone(), definition);
    }

    Ok(settings)
}

fn check_setting(field: &str, definition: &SettingDef) -> Result<()> {
    let label = definition.label();
    if label.is_empty() {
        return Err(invalid(format!("{field}.label"), "must not be empty"));
    }
    if label.chars().count() > MAX_FIELD_LEN {
        return Err(invalid(
            format!("{field}.label"),
            format!("must be at most {MAX_FIELD_LEN} characters"),
        ));
    }

    match definition {
        SettingDef::Text(s)
        | SettingDef::Password(s)
        | SettingDef::Status(s)
        | SettingDef::Button(s) => {
            if let Some(fallback) = &s.fallback {
                if fallback.chars().count() > MAX_FALLBACK_LEN {
                    return Err(invalid(
                        format!("{field}.fallback"),
                        format!("must be at most {MAX_FALLBACK_LEN} characters"),
                    ));
                }
            }
        }
        SettingDef::Toggle(_) | SettingDef::Integer(_) | SettingDef::Slider(_) => {}
    }

    Ok(())
}
