//! Tree surgery around the rewrites: source flattening, the ignore file,
//! and shared-config symlinks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::config::ProjectConfig;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

fn io_err(path: &Path, source: io::Error) -> LayoutError {
    LayoutError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Move every `.java` file out of the package-derived directory chain up to
/// `src/`, then prune the now-empty directories. Returns the moved files'
/// new paths.
pub fn flatten_sources(src_dir: &Path, package: &str) -> Result<Vec<PathBuf>, LayoutError> {
    let mut package_dir = src_dir.to_path_buf();
    for segment in package.split('.') {
        package_dir.push(segment);
    }

    let mut moved = Vec::new();
    if package_dir.is_dir() {
        // collect before moving; renaming files out from under a live walk
        // is not portable
        let mut sources = Vec::new();
        for entry in WalkDir::new(&package_dir) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("java")
            {
                sources.push(entry.path().to_path_buf());
            }
        }

        for source in sources {
            let target = src_dir.join(source.file_name().unwrap_or_default());
            fs::rename(&source, &target).map_err(|e| io_err(&source, e))?;
            moved.push(target);
        }

        // remove_dir refuses non-empty directories, which is exactly the
        // stopping condition we want while walking back up
        let mut dir = package_dir.as_path();
        while dir != src_dir && fs::remove_dir(dir).is_ok() {
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }

    Ok(moved)
}

/// Collect every `.xml` file under the project, depth-first, for the
/// whitespace pass.
pub fn collect_markup_files(project_dir: &Path) -> Result<Vec<PathBuf>, LayoutError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(project_dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("xml")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Write the project's `.gitignore`. Conditional entry groups are omitted
/// entirely when their feature flag is off.
pub fn write_ignore_file(project_dir: &Path, cfg: &ProjectConfig) -> Result<PathBuf, LayoutError> {
    let mut entries: Vec<&str> = vec!["bin/", "gen/", "proguard/", "local.properties"];
    if cfg.native_build {
        entries.extend(["obj/", "libs/"]);
    }
    if cfg.custom_build {
        entries.push("ant.properties");
    }

    let path = project_dir.join(".gitignore");
    let mut content = entries.join("\n");
    content.push('\n');
    fs::write(&path, content).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

/// Replace a per-project config file with a symlink to the shared copy.
///
/// Two-step (unlink, then symlink); safe only because it runs after every
/// rewrite has already committed. Returns `false` when the shared copy does
/// not exist, or on platforms without symlinks, leaving the project copy in
/// place.
#[cfg(unix)]
pub fn relink_shared(project_file: &Path, shared_file: &Path) -> Result<bool, LayoutError> {
    if !shared_file.exists() {
        return Ok(false);
    }
    match fs::remove_file(project_file) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(project_file, e)),
    }
    std::os::unix::fs::symlink(shared_file, project_file)
        .map_err(|e| io_err(project_file, e))?;
    Ok(true)
}

#[cfg(not(unix))]
pub fn relink_shared(_project_file: &Path, _shared_file: &Path) -> Result<bool, LayoutError> {
    Ok(false)
}

/// Delete a file the feature flags declared unwanted; missing is fine.
pub fn remove_if_present(path: &Path) -> Result<bool, LayoutError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(path, e)),
    }
}
