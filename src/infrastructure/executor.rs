use crate::core::interfaces::{BundleExecutor, Invocation};
use crate::core::models::ExecutionResult;
use crate::utils::{Logger, PackError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const WORKSPACE_PREFIX: &str = "lambda-pack-";

/// A fresh, uniquely named output directory owned by one build.
///
/// The directory outlives the process on purpose: deployment tooling reads
/// the bundle from it after the build returns.
#[derive(Debug)]
pub struct BuildWorkspace {
    output_dir: PathBuf,
}

impl BuildWorkspace {
    /// Creates the directory under `parent`, or the system temp root when `None`.
    pub fn allocate_in(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        }
        .keep();
        let output_dir = dir.canonicalize().unwrap_or(dir);
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes a build-only file (configuration, stand-in module) into the directory.
    pub fn stage(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Removes the whole directory; used when the build stops before the bundler runs.
    pub fn discard(self) {
        if let Err(e) = std::fs::remove_dir_all(&self.output_dir) {
            Logger::warn(&format!("Could not remove {}: {}", self.output_dir.display(), e));
        }
    }

    /// Best-effort removal of staged files once they are no longer needed.
    pub fn discard_staged(&self, names: &[&str]) {
        for name in names {
            let path = self.output_dir.join(name);
            if path.exists() {
                if let Err(e) = std::fs::remove_file(&path) {
                    Logger::warn(&format!("Could not remove {}: {}", path.display(), e));
                }
            }
        }
    }
}

/// Runs the bundler as a child process and waits for it.
pub struct ProcessBundleExecutor;

#[async_trait]
impl BundleExecutor for ProcessBundleExecutor {
    async fn execute(&self, output_dir: &Path, invocation: &Invocation) -> Result<ExecutionResult> {
        let config_path = output_dir.join(&invocation.config_file_name);
        tokio::fs::write(&config_path, &invocation.config_text).await?;

        Logger::bundler_spawned(&invocation.program, output_dir);

        // The output directory is the working directory so no project-level
        // bundler configuration gets picked up implicitly.
        let output = Command::new(&invocation.program)
            .arg(&invocation.config_flag)
            .arg(&config_path)
            .current_dir(output_dir)
            .output()
            .await
            .map_err(|source| PackError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let output_lines: Vec<String> = stdout
            .lines()
            .chain(stderr.lines())
            .map(str::to_string)
            .collect();

        for line in &output_lines {
            Logger::debug(line);
        }

        Ok(ExecutionResult {
            exit_code: output.status.code(),
            output_lines,
        })
    }
}
