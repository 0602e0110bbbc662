//! Orchestrates a project build: scaffold, flatten, rewrite, tidy, link.
//!
//! Strictly sequential and fail-fast. Each file's rewrite is atomic on its
//! own; there is no rollback across files - an integrity failure leaves
//! earlier files committed and later files untouched, and the run exits
//! non-zero.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ConfigError, ProjectConfig};
use crate::customize;
use crate::layout::{self, LayoutError};
use crate::rewrite::RewriteError;
use crate::rules;
use crate::scaffold::{self, ScaffoldError};
use crate::sdk::{EnvError, SdkEnv, SharedConfig};

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// One committed rewrite, with the pre-image kept for diff display.
#[derive(Debug)]
pub struct RewrittenFile {
    pub path: PathBuf,
    pub before: String,
}

/// What a run did, for the CLI layer to render.
#[derive(Default, Debug)]
pub struct CreateReport {
    pub rewritten: Vec<RewrittenFile>,
    pub tidied: usize,
    pub linked: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub ignore_file: Option<PathBuf>,
}

/// Scaffold a new project and customize the generated tree.
///
/// Configuration and environment are validated up front; the scaffolder's
/// exit status is checked before any file is rewritten.
pub fn create(cfg: &ProjectConfig, sdk: &SdkEnv) -> Result<CreateReport, ProjectError> {
    cfg.validate()?;

    let tool = sdk.android_tool()?;
    if cfg.native_build {
        sdk.ndk_build()?;
    }

    let shared = SharedConfig::beside(&cfg.dest);
    if cfg.custom_build {
        shared.require(shared.keystore_properties())?;
    }
    if cfg.drop_properties {
        shared.require(shared.ant_properties())?;
    }

    scaffold::generate(&tool, cfg)?;

    customize_tree(cfg, &shared)
}

/// Apply every customization pass to an already-generated tree.
///
/// Split from [`create`] so the rewrite pipeline can run against a
/// pre-generated fixture without an SDK installation.
pub fn customize_tree(
    cfg: &ProjectConfig,
    shared: &SharedConfig,
) -> Result<CreateReport, ProjectError> {
    let dest = cfg.dest.as_path();
    let mut report = CreateReport::default();

    layout::flatten_sources(&dest.join("src"), cfg.package())?;

    rewrite_step(&mut report, dest.join("res").join("values").join("strings.xml"), |p| {
        customize::set_app_title(p, &cfg.title)
    })?;

    rewrite_step(&mut report, dest.join("AndroidManifest.xml"), |p| {
        customize::declare_sdk_versions(p, cfg.api_level)
    })?;

    if cfg.custom_build {
        rewrite_step(&mut report, dest.join("build.xml"), |p| {
            customize::customize_build_script(p, cfg)
        })?;
        if !cfg.drop_properties {
            rewrite_step(&mut report, dest.join("ant.properties"), |p| {
                customize::strip_properties_boilerplate(p)
            })?;
        }
    } else if cfg.drop_build_props {
        rewrite_step(&mut report, dest.join("build.xml"), |p| {
            customize::strip_build_properties_block(p)
        })?;
    }

    if cfg.drop_proguard {
        let proguard = dest.join("proguard-project.txt");
        if layout::remove_if_present(&proguard)? {
            report.removed.push(proguard);
        }
        rewrite_step(&mut report, dest.join("project.properties"), |p| {
            customize::strip_proguard_config(p)
        })?;
    }

    for markup in layout::collect_markup_files(dest)? {
        rules::tidy_markup(&markup)?;
        report.tidied += 1;
    }

    report.ignore_file = Some(layout::write_ignore_file(dest, cfg)?);

    let local = dest.join("local.properties");
    if layout::relink_shared(&local, &shared.local_properties())? {
        report.linked.push(local);
    }

    if cfg.drop_properties {
        let ant = dest.join("ant.properties");
        if layout::remove_if_present(&ant)? {
            report.removed.push(ant.clone());
        }
        if layout::relink_shared(&ant, &shared.ant_properties())? {
            report.linked.push(ant);
        }
    }

    Ok(report)
}

fn rewrite_step<F>(
    report: &mut CreateReport,
    path: PathBuf,
    apply: F,
) -> Result<(), ProjectError>
where
    F: FnOnce(&Path) -> Result<(), RewriteError>,
{
    let before = fs::read_to_string(&path).map_err(|source| ProjectError::Io {
        path: path.clone(),
        source,
    })?;
    apply(&path)?;
    report.rewritten.push(RewrittenFile { path, before });
    Ok(())
}
