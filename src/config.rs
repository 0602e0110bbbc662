//! Operator configuration, validated once before any filesystem work.

use std::fmt;
use std::path::PathBuf;

/// Platform API levels the scaffolder ships templates for. An unknown level
/// would only fail later, inside the subprocess, with a worse message.
pub const KNOWN_API_LEVELS: &[u32] = &[
    10, 14, 15, 16, 17, 18, 19, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34,
];

/// Everything the orchestrator needs, fully resolved.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Target platform API level (becomes `android-<level>`).
    pub api_level: u32,
    /// Fully-qualified main activity class, e.g. `com.example.app.Main`.
    pub main_class: String,
    /// Human-readable application title injected into the string resources.
    pub title: String,
    /// Project name handed to the scaffolder.
    pub name: String,
    /// File name of the signed release artifact.
    pub artifact: String,
    /// Destination directory for the generated project.
    pub dest: PathBuf,
    /// Inject ndk-build hooks into the build script.
    pub native_build: bool,
    /// Inject custom targets and share the ant properties file.
    pub custom_build: bool,
    /// Strip the marked ant.properties block from the build script instead.
    pub drop_build_props: bool,
    /// Remove the per-project ant.properties copy.
    pub drop_properties: bool,
    /// Remove the proguard stub and its dead config line.
    pub drop_proguard: bool,
}

impl ProjectConfig {
    /// Package path: everything before the last `.` of the main class.
    pub fn package(&self) -> &str {
        match self.main_class.rfind('.') {
            Some(idx) => &self.main_class[..idx],
            None => &self.main_class,
        }
    }

    /// Bare activity class name: the last segment of the main class.
    pub fn activity(&self) -> &str {
        match self.main_class.rfind('.') {
            Some(idx) => &self.main_class[idx + 1..],
            None => &self.main_class,
        }
    }

    /// Target identifier the scaffolder expects.
    pub fn target(&self) -> String {
        format!("android-{}", self.api_level)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();

        if !KNOWN_API_LEVELS.contains(&self.api_level) {
            issues.push(ConfigIssue::UnknownApiLevel(self.api_level));
        }

        if !is_dotted_class_path(&self.main_class) {
            issues.push(ConfigIssue::BadMainClass(self.main_class.clone()));
        }

        if self.title.trim().is_empty() {
            issues.push(ConfigIssue::MissingField("title"));
        }
        if self.name.trim().is_empty() {
            issues.push(ConfigIssue::MissingField("name"));
        }
        if self.artifact.trim().is_empty() {
            issues.push(ConfigIssue::MissingField("artifact"));
        }

        if self.custom_build && self.drop_build_props {
            issues.push(ConfigIssue::ConflictingFlags(
                "custom-build rewrites the build script; drop-build-props strips it",
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { issues })
        }
    }
}

/// At least two dot-separated Java identifiers, e.g. `com.example.Main`.
fn is_dotted_class_path(value: &str) -> bool {
    let segments: Vec<&str> = value.split('.').collect();
    if segments.len() < 2 {
        return false;
    }
    segments.iter().all(|seg| {
        let mut chars = seg.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub issues: Vec<ConfigIssue>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub enum ConfigIssue {
    UnknownApiLevel(u32),
    BadMainClass(String),
    MissingField(&'static str),
    ConflictingFlags(&'static str),
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::UnknownApiLevel(level) => {
                write!(f, "unknown target API level {level}")
            }
            ConfigIssue::BadMainClass(value) => {
                write!(
                    f,
                    "main class '{value}' is not a fully-qualified class name (expected e.g. com.example.app.Main)"
                )
            }
            ConfigIssue::MissingField(field) => write!(f, "missing required value '{field}'"),
            ConfigIssue::ConflictingFlags(message) => {
                write!(f, "conflicting flags: {message}")
            }
        }
    }
}
