//! Plugpack Core - Core types for the Plugpack plugin packager.

mod descriptor;
mod error;
mod metadata;

pub use descriptor::{PluginDescriptor, RangeSetting, SettingDef, TextSetting, ToggleSetting};
pub use error::{PackError, Result};
pub use metadata::ProjectMetadata;
