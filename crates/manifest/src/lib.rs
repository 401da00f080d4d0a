//! Plugpack Manifest - Schema validation and metadata reconciliation.
//!
//! This crate turns raw manifest JSON into a validated [`PluginDescriptor`]
//! and overlays authoritative project metadata onto it.
//!
//! [`PluginDescriptor`]: plugpack_core::PluginDescriptor

mod reconcile;
mod schema;

pub use reconcile::{parse_metadata, reconcile};
pub use schema::{MAX_FALLBACK_LEN, MAX_FIELD_LEN, validate};
