//! Sequential packaging pipeline.

use std::path::{Path, PathBuf};
use std::time::Instant;

use plugpack_core::{PackError, PluginDescriptor, ProjectMetadata, Result};
use serde_json::Value;

use crate::archiver::Archiver;
use crate::finalize;

/// Conventional file name of the project metadata file.
pub const METADATA_FILE: &str = "package.json";

/// One ordered, fail-fast step of the packaging pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Validate,
    Reconcile,
    VerifyTargets,
    Archive,
    Finalize,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Load,
        Stage::Validate,
        Stage::Reconcile,
        Stage::VerifyTargets,
        Stage::Archive,
        Stage::Finalize,
    ];

    /// Human-readable stage label for progress reporting.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Load => "Load manifest",
            Stage::Validate => "Validate manifest",
            Stage::Reconcile => "Sync project metadata",
            Stage::VerifyTargets => "Verify targets",
            Stage::Archive => "Produce archive",
            Stage::Finalize => "Finalize artifact",
        }
    }
}

/// Completion status of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Passed,
    Skipped,
    Failed,
}

/// Progress events emitted while the pipeline runs.
#[derive(Debug, Clone, Copy)]
pub enum StageEvent {
    /// The stage is about to run.
    Started(Stage),

    /// The stage finished with the given status.
    Finished(Stage, StageStatus),
}

/// Report of a single pipeline run.
#[derive(Debug)]
pub struct PackReport {
    /// Stages in the order they were attempted, with their outcome.
    pub stages: Vec<(Stage, StageStatus)>,

    /// Canonical artifact path, present only after a fully successful run.
    pub artifact: Option<PathBuf>,

    /// Project metadata synced onto the manifest, when reconciliation ran.
    pub metadata: Option<ProjectMetadata>,

    /// The originating error of the first failed stage, if any.
    pub error: Option<PackError>,

    /// Total run time in milliseconds.
    pub duration_ms: u64,
}

impl PackReport {
    /// Returns true when every attempted stage passed or was skipped.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Pipeline-scoped state threaded through the stages.
///
/// Owned exclusively by a single run and discarded when the run completes
/// or fails.
#[derive(Default)]
struct PackContext {
    raw_text: Option<String>,
    raw: Option<Value>,
    descriptor: Option<PluginDescriptor>,
    metadata: Option<ProjectMetadata>,
    archive: Option<PathBuf>,
    artifact: Option<PathBuf>,
}

/// Runs the ordered packaging stages against a plugin manifest.
///
/// The pipeline is fail-fast: the first stage failure aborts all later
/// stages, and already-completed stages are not rolled back. In particular a
/// manifest rewritten during reconciliation stays rewritten even when a
/// later stage fails.
pub struct Pipeline<A> {
    /// Path to the plugin manifest.
    manifest_path: PathBuf,

    /// Directory containing the manifest. Targets resolve against it and
    /// the archiver runs inside it.
    working_dir: PathBuf,

    /// External archiver collaborator.
    archiver: A,

    /// Dry-run mode: verify everything but produce and rewrite nothing.
    dry_run: bool,
}

impl<A: Archiver> Pipeline<A> {
    /// Creates a pipeline for a manifest path.
    pub fn new(manifest_path: impl Into<PathBuf>, archiver: A) -> Self {
        let manifest_path = manifest_path.into();
        let working_dir = manifest_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            manifest_path,
            working_dir,
            archiver,
            dry_run: false,
        }
    }

    /// Enables or disables dry-run mode.
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Runs all stages in order, stopping at the first failure.
    pub async fn run(&self) -> PackReport {
        self.run_with(|_| {}).await
    }

    /// Runs all stages, emitting a [`StageEvent`] for each transition.
    pub async fn run_with<F>(&self, mut observer: F) -> PackReport
    where
        F: FnMut(StageEvent),
    {
        let started = Instant::now();
        let mut ctx = PackContext::default();
        let mut report = PackReport {
            stages: Vec::new(),
            artifact: None,
            metadata: None,
            error: None,
            duration_ms: 0,
        };

        for stage in Stage::ALL {
            observer(StageEvent::Started(stage));

            let result = match stage {
                Stage::Load => self.load(&mut ctx).await,
                Stage::Validate => self.validate(&mut ctx),
                Stage::Reconcile => self.reconcile(&mut ctx).await,
                Stage::VerifyTargets => self.verify_targets(&ctx),
                Stage::Archive => self.archive(&mut ctx).await,
                Stage::Finalize => self.finalize(&mut ctx),
            };

            match result {
                Ok(status) => {
                    observer(StageEvent::Finished(stage, status));
                    report.stages.push((stage, status));
                }
                Err(e) => {
                    observer(StageEvent::Finished(stage, StageStatus::Failed));
                    report.stages.push((stage, StageStatus::Failed));
                    report.error = Some(e);
                    break;
                }
            }
        }

        report.artifact = ctx.artifact.take();
        report.metadata = ctx.metadata.take();
        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }

    /// Reads the raw manifest bytes.
    async fn load(&self, ctx: &mut PackContext) -> Result<StageStatus> {
        let text = tokio::fs::read_to_string(&self.manifest_path)
            .await
            .map_err(|source| PackError::ManifestUnreadable {
                path: self.manifest_path.clone(),
                source,
            })?;

        ctx.raw_text = Some(text);
        Ok(StageStatus::Passed)
    }

    /// Parses the manifest and validates it against the schema.
    fn validate(&self, ctx: &mut PackContext) -> Result<StageStatus> {
        let text = ctx
            .raw_text
            .as_ref()
            .expect("manifest loaded before validation");

        let raw: Value =
            serde_json::from_str(text).map_err(|e| PackError::ManifestMalformed(e.to_string()))?;
        let descriptor = plugpack_manifest::validate(&raw)?;

        ctx.raw = Some(raw);
        ctx.descriptor = Some(descriptor);
        Ok(StageStatus::Passed)
    }

    /// Overlays project metadata onto the manifest when metadata exists.
    ///
    /// On success the reconciled manifest is persisted back to the manifest
    /// path so that subsequent tooling reading it sees the synced identity
    /// and version. Dry-run skips the persistence but still validates.
    async fn reconcile(&self, ctx: &mut PackContext) -> Result<StageStatus> {
        let metadata_path = self.working_dir.join(METADATA_FILE);
        if !metadata_path.exists() {
            return Ok(StageStatus::Skipped);
        }

        let text = tokio::fs::read_to_string(&metadata_path)
            .await
            .map_err(|e| {
                PackError::MetadataInvalid(format!("cannot read {}: {e}", metadata_path.display()))
            })?;
        let value: Value =
            serde_json::from_str(&text).map_err(|e| PackError::MetadataInvalid(e.to_string()))?;
        let metadata = plugpack_manifest::parse_metadata(&value)?;

        let raw = ctx.raw.as_mut().expect("manifest validated before reconciliation");
        let descriptor = plugpack_manifest::reconcile(raw, &metadata)?;

        if !self.dry_run {
            let mut serialized =
                serde_json::to_string_pretty(raw).map_err(std::io::Error::other)?;
            serialized.push('\n');
            tokio::fs::write(&self.manifest_path, serialized).await?;
        }

        ctx.descriptor = Some(descriptor);
        ctx.metadata = Some(metadata);
        Ok(StageStatus::Passed)
    }

    /// Confirms the manifest's local targets exist on disk.
    fn verify_targets(&self, ctx: &PackContext) -> Result<StageStatus> {
        let descriptor = ctx
            .descriptor
            .as_ref()
            .expect("manifest validated before target verification");

        let main = self.working_dir.join(&descriptor.main);
        if !main.exists() {
            return Err(PackError::MissingTarget {
                field: "main",
                path: main,
            });
        }

        // dev, remote and remoteIcon may point at URLs or dev-time-only
        // references; only main and icon are guaranteed-local.
        if let Some(icon) = &descriptor.icon {
            let icon = self.working_dir.join(icon);
            if !icon.exists() {
                return Err(PackError::MissingTarget {
                    field: "icon",
                    path: icon,
                });
            }
        }

        Ok(StageStatus::Passed)
    }

    /// Delegates to the external archiver.
    async fn archive(&self, ctx: &mut PackContext) -> Result<StageStatus> {
        if self.dry_run {
            return Ok(StageStatus::Skipped);
        }

        let archive = self.archiver.produce_archive(&self.working_dir).await?;
        ctx.archive = Some(archive);
        Ok(StageStatus::Passed)
    }

    /// Renames the raw archive to the canonical artifact name.
    fn finalize(&self, ctx: &mut PackContext) -> Result<StageStatus> {
        if self.dry_run {
            return Ok(StageStatus::Skipped);
        }

        let descriptor = ctx
            .descriptor
            .as_ref()
            .expect("manifest validated before finalization");
        let archive = ctx.archive.as_ref().expect("archive produced before finalization");

        let artifact = finalize::finalize(&self.working_dir, descriptor, archive)?;
        ctx.artifact = Some(artifact);
        Ok(StageStatus::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    struct FakeArchiver;

    impl Archiver for FakeArchiver {
        async fn produce_archive(&self, working_dir: &Path) -> Result<PathBuf> {
            let path = working_dir.join("pkg-0.0.1.tgz");
            fs::write(&path, b"archive")?;
            Ok(path)
        }
    }

    struct FailingArchiver;

    impl Archiver for FailingArchiver {
        async fn produce_archive(&self, _working_dir: &Path) -> Result<PathBuf> {
            Err(PackError::PackagingTool {
                command: "npm pack".to_string(),
                exit_code: Some(1),
                stderr: Some("boom".to_string()),
            })
        }
    }

    /// Claims an output path without creating the file.
    struct VanishingArchiver;

    impl Archiver for VanishingArchiver {
        async fn produce_archive(&self, working_dir: &Path) -> Result<PathBuf> {
            Ok(working_dir.join("pkg-0.0.1.tgz"))
        }
    }

    fn write_project(dir: &Path) -> PathBuf {
        let manifest = serde_json::json!({
            "id": "clock",
            "name": "Clock",
            "version": "1.0.0",
            "author": "someone",
            "main": "index.js"
        });
        let path = dir.join("plugin.json");
        fs::write(&path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
        fs::write(dir.join("index.js"), "module.exports = {};").unwrap();
        path
    }

    fn artifacts_in(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "ppk"))
            .collect()
    }

    #[tokio::test]
    async fn test_pack_produces_canonical_artifact() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;

        assert!(report.is_success(), "{:?}", report.error);
        assert_eq!(report.artifact, Some(dir.path().join("clock-1.0.0.ppk")));
        assert!(dir.path().join("clock-1.0.0.ppk").exists());
        assert!(!dir.path().join("pkg-0.0.1.tgz").exists());
    }

    #[tokio::test]
    async fn test_reconcile_skipped_without_metadata() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;

        assert!(report
            .stages
            .contains(&(Stage::Reconcile, StageStatus::Skipped)));
    }

    #[tokio::test]
    async fn test_missing_main_fails_verify_without_artifact() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());
        fs::remove_file(dir.path().join("index.js")).unwrap();

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;

        assert!(matches!(
            report.error,
            Some(PackError::MissingTarget { field: "main", .. })
        ));
        assert!(report
            .stages
            .contains(&(Stage::VerifyTargets, StageStatus::Failed)));
        // The archiver never ran and no artifact was produced.
        assert_eq!(report.stages.len(), 4);
        assert!(artifacts_in(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_icon_fails_verify() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());
        let manifest = serde_json::json!({
            "id": "clock",
            "name": "Clock",
            "version": "1.0.0",
            "author": "someone",
            "main": "index.js",
            "icon": "assets/icon.png"
        });
        fs::write(&manifest_path, manifest.to_string()).unwrap();

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;
        assert!(matches!(
            report.error,
            Some(PackError::MissingTarget { field: "icon", .. })
        ));

        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/icon.png"), b"png").unwrap();

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;
        assert!(report.is_success(), "{:?}", report.error);
    }

    #[tokio::test]
    async fn test_failed_rerun_preserves_artifact() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;
        assert!(report.is_success(), "{:?}", report.error);
        let artifact = dir.path().join("clock-1.0.0.ppk");
        let packaged = fs::read(&artifact).unwrap();

        fs::remove_file(dir.path().join("index.js")).unwrap();

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;
        assert!(matches!(
            report.error,
            Some(PackError::MissingTarget { field: "main", .. })
        ));
        // The artifact from the earlier run is untouched.
        assert_eq!(fs::read(&artifact).unwrap(), packaged);
    }

    #[tokio::test]
    async fn test_rerun_leaves_single_artifact() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());

        let pipeline = Pipeline::new(&manifest_path, FakeArchiver);
        assert!(pipeline.run().await.is_success());
        assert!(pipeline.run().await.is_success());

        assert_eq!(artifacts_in(dir.path()).len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_rewrites_manifest() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "clock-plugin", "version": "2.0.0" }"#,
        )
        .unwrap();

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;

        assert!(report.is_success(), "{:?}", report.error);
        assert_eq!(
            report.artifact,
            Some(dir.path().join("clock-plugin-2.0.0.ppk"))
        );
        assert_eq!(
            report.metadata,
            Some(ProjectMetadata {
                name: "clock-plugin".to_string(),
                version: "2.0.0".to_string(),
            })
        );

        // The manifest on disk now carries the synced identity and version.
        let rewritten: Value =
            serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
        assert_eq!(rewritten["id"], "clock-plugin");
        assert_eq!(rewritten["version"], "2.0.0");
        assert_eq!(rewritten["name"], "Clock");
    }

    #[tokio::test]
    async fn test_invalid_metadata_aborts() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "clock-plugin", "version": "2.0" }"#,
        )
        .unwrap();

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;

        assert!(matches!(report.error, Some(PackError::MetadataInvalid(_))));
        assert!(artifacts_in(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_archiver_failure_surfaces() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());

        let report = Pipeline::new(&manifest_path, FailingArchiver).run().await;

        assert!(matches!(
            report.error,
            Some(PackError::PackagingTool { exit_code: Some(1), .. })
        ));
        assert!(artifacts_in(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_archive_output_fails_finalize() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());

        let report = Pipeline::new(&manifest_path, VanishingArchiver).run().await;

        assert!(matches!(report.error, Some(PackError::Finalization(_))));
        assert!(report
            .stages
            .contains(&(Stage::Finalize, StageStatus::Failed)));
    }

    #[tokio::test]
    async fn test_unreadable_manifest() {
        let dir = tempdir().unwrap();
        let manifest_path = dir.path().join("plugin.json");

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;

        assert!(matches!(
            report.error,
            Some(PackError::ManifestUnreadable { .. })
        ));
        assert_eq!(report.stages.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_manifest() {
        let dir = tempdir().unwrap();
        let manifest_path = dir.path().join("plugin.json");
        fs::write(&manifest_path, "{ not json").unwrap();

        let report = Pipeline::new(&manifest_path, FakeArchiver).run().await;

        assert!(matches!(
            report.error,
            Some(PackError::ManifestMalformed(_))
        ));
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());
        let original = fs::read_to_string(&manifest_path).unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "clock-plugin", "version": "2.0.0" }"#,
        )
        .unwrap();

        let report = Pipeline::new(&manifest_path, FakeArchiver)
            .with_dry_run(true)
            .run()
            .await;

        assert!(report.is_success(), "{:?}", report.error);
        assert!(report.artifact.is_none());
        assert!(report.stages.contains(&(Stage::Archive, StageStatus::Skipped)));
        assert!(report.stages.contains(&(Stage::Finalize, StageStatus::Skipped)));
        assert!(artifacts_in(dir.path()).is_empty());
        // The manifest was not rewritten.
        assert_eq!(fs::read_to_string(&manifest_path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_events_reported_in_stage_order() {
        let dir = tempdir().unwrap();
        let manifest_path = write_project(dir.path());

        let mut finished = Vec::new();
        let report = Pipeline::new(&manifest_path, FakeArchiver)
            .run_with(|event| {
                if let StageEvent::Finished(stage, _) = event {
                    finished.push(stage);
                }
            })
            .await;

        assert!(report.is_success(), "{:?}", report.error);
        assert_eq!(finished, Stage::ALL.to_vec());
    }
}
