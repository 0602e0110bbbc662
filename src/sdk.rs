//! SDK/NDK discovery and the shared-config file layout.
//!
//! Resolution order mirrors the usual tooling conventions: explicit
//! environment variables first, then well-known locations under the home
//! directory.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Android SDK not found; set ANDROID_SDK_ROOT or install under ~/Android/Sdk")]
    SdkNotFound,

    #[error("Android NDK not found; set ANDROID_NDK_ROOT (required for native builds)")]
    NdkNotFound,

    #[error("required tool missing: {path}")]
    ToolMissing { path: PathBuf },

    #[error("shared properties file missing: {path}")]
    SharedFileMissing { path: PathBuf },
}

/// Resolved SDK and (optional) NDK roots.
#[derive(Debug, Clone)]
pub struct SdkEnv {
    sdk_root: PathBuf,
    ndk_root: Option<PathBuf>,
}

impl SdkEnv {
    /// Resolve roots from `ANDROID_SDK_ROOT` / `ANDROID_HOME`, falling back
    /// to `~/Android/Sdk` and `~/android-sdk`. The NDK comes from
    /// `ANDROID_NDK_ROOT` or `<sdk>/ndk-bundle` and may be absent.
    pub fn discover() -> Result<Self, EnvError> {
        let sdk_root = env_dir("ANDROID_SDK_ROOT")
            .or_else(|| env_dir("ANDROID_HOME"))
            .or_else(|| home_dir_candidate("Android/Sdk"))
            .or_else(|| home_dir_candidate("android-sdk"))
            .ok_or(EnvError::SdkNotFound)?;

        let ndk_root = env_dir("ANDROID_NDK_ROOT").or_else(|| {
            let bundled = sdk_root.join("ndk-bundle");
            bundled.is_dir().then_some(bundled)
        });

        Ok(SdkEnv { sdk_root, ndk_root })
    }

    /// Build an environment from explicit roots (tests, doctor overrides).
    pub fn from_roots(sdk_root: impl Into<PathBuf>, ndk_root: Option<PathBuf>) -> Self {
        SdkEnv {
            sdk_root: sdk_root.into(),
            ndk_root,
        }
    }

    pub fn sdk_root(&self) -> &Path {
        &self.sdk_root
    }

    pub fn ndk_root(&self) -> Option<&Path> {
        self.ndk_root.as_deref()
    }

    /// Path to the scaffolding tool; errors if it is not present.
    pub fn android_tool(&self) -> Result<PathBuf, EnvError> {
        let path = self.sdk_root.join("tools").join("android");
        if path.is_file() {
            Ok(path)
        } else {
            Err(EnvError::ToolMissing { path })
        }
    }

    /// Path to `ndk-build`; errors if no NDK was resolved or the tool is
    /// missing from it.
    pub fn ndk_build(&self) -> Result<PathBuf, EnvError> {
        let root = self.ndk_root.as_ref().ok_or(EnvError::NdkNotFound)?;
        let path = root.join("ndk-build");
        if path.is_file() {
            Ok(path)
        } else {
            Err(EnvError::ToolMissing { path })
        }
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    let value = env::var_os(var)?;
    let path = PathBuf::from(value);
    path.is_dir().then_some(path)
}

fn home_dir_candidate(relative: &str) -> Option<PathBuf> {
    let path = home::home_dir()?.join(relative);
    path.is_dir().then_some(path)
}

/// Shared config files, one copy per project family, living in the
/// destination's parent directory so sibling projects can symlink them.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    dir: PathBuf,
}

impl SharedConfig {
    pub fn beside(dest: &Path) -> Self {
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        SharedConfig { dir }
    }

    /// SDK location (`sdk.dir`), machine-specific.
    pub fn local_properties(&self) -> PathBuf {
        self.dir.join("local.properties")
    }

    /// Ant overrides shared across sibling projects.
    pub fn ant_properties(&self) -> PathBuf {
        self.dir.join("ant.properties")
    }

    /// Keystore settings loaded by the custom-build targets.
    pub fn keystore_properties(&self) -> PathBuf {
        self.dir.join("keystore.properties")
    }

    /// Assert a shared file exists before any rewrite depends on it.
    pub fn require(&self, path: PathBuf) -> Result<PathBuf, EnvError> {
        if path.is_file() {
            Ok(path)
        } else {
            Err(EnvError::SharedFileMissing { path })
        }
    }
}
