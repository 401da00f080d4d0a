//! Pack command implementation.

use std::path::Path;

use indicatif::ProgressBar;
use miette::{Result, miette};
use plugpack_engine::{NpmArchiver, Pipeline, StageEvent, StageStatus};

use crate::output;

/// Runs the packaging pipeline against a manifest.
pub async fn execute(manifest_path: &Path, dry_run: bool) -> Result<()> {
    let archiver = NpmArchiver::locate().map_err(|e| miette!("{}", e))?;

    let pipeline = Pipeline::new(manifest_path, archiver).with_dry_run(dry_run);

    if dry_run {
        output::info("Dry run mode - no archive will be produced");
    }

    output::info(&format!("Packaging {}", manifest_path.display()));

    let mut spinner: Option<ProgressBar> = None;
    let report = pipeline
        .run_with(|event| match event {
            StageEvent::Started(stage) => {
                spinner = Some(output::stage_spinner(stage.label()));
            }
            StageEvent::Finished(stage, status) => {
                if let Some(spinner) = spinner.take() {
                    match status {
                        StageStatus::Passed => output::spinner_success(&spinner, stage.label()),
                        StageStatus::Skipped => output::spinner_skipped(&spinner, stage.label()),
                        StageStatus::Failed => output::spinner_failure(&spinner, stage.label()),
                    }
                }
            }
        })
        .await;

    if let Some(error) = &report.error {
        output::error(&error.to_string());
        output::summary(false, "packaging aborted", report.duration_ms);
        return Err(miette!("Packaging failed"));
    }

    if let Some(metadata) = &report.metadata {
        output::info(&format!(
            "Synced {} v{} from package.json",
            metadata.name, metadata.version
        ));
    }

    match &report.artifact {
        Some(artifact) => output::summary(
            true,
            &format!("produced {}", artifact.display()),
            report.duration_ms,
        ),
        None => output::summary(true, "dry run, no artifact produced", report.duration_ms),
    }

    Ok(())
}
