//! External archiver collaborators.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use plugpack_core::{PackError, Result};
use tokio::process::Command as TokioCommand;

/// Produces a compressed archive of the project in a working directory.
///
/// Implementations leave exactly one archive file in the working directory on
/// success and return its path. The pipeline invokes an archiver exactly once
/// per run and surfaces its failures verbatim.
pub trait Archiver {
    /// Runs the archiving step inside `working_dir`.
    fn produce_archive(&self, working_dir: &Path) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Archiver backed by `npm pack`.
///
/// npm produces a `<package-name>-<package-version>.tgz` tarball in the
/// working directory and prints its file name as the last line of stdout.
pub struct NpmArchiver {
    /// Resolved path to the npm executable.
    program: PathBuf,
}

impl NpmArchiver {
    /// Resolves npm from PATH.
    pub fn locate() -> Result<Self> {
        let program = which::which("npm").map_err(|e| PackError::PackagingTool {
            command: "npm pack".to_string(),
            exit_code: None,
            stderr: Some(e.to_string()),
        })?;

        Ok(Self { program })
    }

    /// Uses an explicit program path instead of a PATH lookup.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Archiver for NpmArchiver {
    async fn produce_archive(&self, working_dir: &Path) -> Result<PathBuf> {
        let output = TokioCommand::new(&self.program)
            .arg("pack")
            .current_dir(working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| PackError::PackagingTool {
                command: "npm pack".to_string(),
                exit_code: None,
                stderr: Some(e.to_string()),
            })?;

        if !output.status.success() {
            return Err(PackError::PackagingTool {
                command: "npm pack".to_string(),
                exit_code: output.status.code(),
                stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let tarball = tarball_from_stdout(&stdout).ok_or_else(|| PackError::PackagingTool {
            command: "npm pack".to_string(),
            exit_code: output.status.code(),
            stderr: Some("npm pack did not report an output file".to_string()),
        })?;

        Ok(working_dir.join(tarball))
    }
}

/// Extracts the tarball file name npm prints as its last stdout line.
fn tarball_from_stdout(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
}
