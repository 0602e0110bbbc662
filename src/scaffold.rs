//! The one blocking invocation of the scaffolding tool.
//!
//! The tool's exit status is checked before any rewrite begins; a non-zero
//! exit means no generated tree exists worth touching.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

use crate::config::ProjectConfig;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("failed to launch scaffolder {tool}: {source}")]
    Spawn { tool: PathBuf, source: io::Error },

    #[error("scaffolder exited with {status}\n{stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Run `android create project` for the configured target/package/activity.
pub fn generate(tool: &Path, cfg: &ProjectConfig) -> Result<(), ScaffoldError> {
    let output = Command::new(tool)
        .arg("create")
        .arg("project")
        .args(["--target", &cfg.target()])
        .args(["--package", cfg.package()])
        .args(["--activity", cfg.activity()])
        .args(["--name", &cfg.name])
        .arg("--path")
        .arg(&cfg.dest)
        .output()
        .map_err(|source| ScaffoldError::Spawn {
            tool: tool.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        return Err(ScaffoldError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(())
}
