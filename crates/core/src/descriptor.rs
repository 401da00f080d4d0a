//! Plugin descriptor describing a plugin's identity, entry points and settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A plugin manifest.
///
/// A descriptor is only usable by the packaging pipeline after it has passed
/// full schema validation; any single invalid field invalidates the whole
/// descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Stable plugin identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Semantic version of the plugin.
    pub version: String,

    /// Plugin author.
    pub author: String,

    /// Relative path to the plugin entry file.
    pub main: String,

    /// Dev-time entry file or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<String>,

    /// Remote entry URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    /// Relative path to the plugin icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Remote icon URL.
    #[serde(default, rename = "remoteIcon", skip_serializing_if = "Option::is_none")]
    pub remote_icon: Option<String>,

    /// Configurable settings exposed by the plugin, keyed by setting key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, SettingDef>,
}

/// A single setting definition, discriminated by its `type` field.
///
/// Unknown discriminator values are rejected during deserialization rather
/// than falling through permissively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SettingDef {
    Text(TextSetting),
    Password(TextSetting),
    Status(TextSetting),
    Button(TextSetting),
    Toggle(ToggleSetting),
    Integer(RangeSetting),
    Slider(RangeSetting),
}

impl SettingDef {
    /// Returns the user-facing label of the setting.
    pub fn label(&self) -> &str {
        match self {
            SettingDef::Text(s)
            | SettingDef::Password(s)
            | SettingDef::Status(s)
            | SettingDef::Button(s) => &s.label,
            SettingDef::Toggle(s) => &s.label,
            SettingDef::Integer(s) | SettingDef::Slider(s) => &s.label,
        }
    }
}

/// Payload for `text`, `password`, `status` and `button` settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSetting {
    /// User-facing label.
    pub label: String,

    /// Whether the user must provide a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Default value when the user provides none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// Payload for `toggle` settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleSetting {
    /// User-facing label.
    pub label: String,

    /// Whether the user must provide a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Default state when the user provides none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

/// Payload for `integer` and `slider` settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSetting {
    /// User-facing label.
    pub label: String,

    /// Whether the user must provide a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Lower bound of accepted values.
    pub min: f64,

    /// Upper bound of accepted values.
    pub max: f64,

    /// Default value when the user provides none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let json = r#"{
            "id": "clock",
            "name": "Clock",
            "version": "1.2.0",
            "author": "someone",
            "main": "index.js",
            "remoteIcon": "https://example.com/icon.png",
            "settings": {
                "enabled": { "type": "toggle", "label": "Enabled", "fallback": true },
                "interval": { "type": "slider", "label": "Interval", "min": 1, "max": 60 }
            }
        }"#;

        let descriptor: PluginDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.id, "clock");
        assert_eq!(descriptor.remote_icon.as_deref(), Some("https://example.com/icon.png"));
        assert_eq!(descriptor.settings.len(), 2);

        match &descriptor.settings["interval"] {
            SettingDef::Slider(range) => {
                assert_eq!(range.min, 1.0);
                assert_eq!(range.max, 60.0);
            }
            other => panic!("expected a slider, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_setting_type_rejected() {
        let json = r#"{ "type": "dropdown", "label": "Choice" }"#;
        let result: Result<SettingDef, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let descriptor = PluginDescriptor {
            id: "clock".to_string(),
            name: "Clock".to_string(),
            version: "1.0.0".to_string(),
            author: "someone".to_string(),
            main: "index.js".to_string(),
            dev: None,
            remote: None,
            icon: None,
            remote_icon: Some("https://example.com/icon.png".to_string()),
            settings: BTreeMap::new(),
        };

        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("remoteIcon"));
        assert!(!json.contains("\"dev\""));
        assert!(!json.contains("\"settings\""));
    }
}
