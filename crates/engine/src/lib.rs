//! Plugpack Engine - The packaging pipeline for Plugpack.

mod archiver;
mod finalize;
mod pipeline;

pub use archiver::{Archiver, NpmArchiver};
pub use finalize::{ARTIFACT_EXTENSION, artifact_name, finalize};
pub use pipeline::{
    METADATA_FILE, PackReport, Pipeline, Stage, StageEvent, StageStatus,
};
