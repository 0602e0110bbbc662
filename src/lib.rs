//! mkdroid: scaffold Android SDK projects and customize the generated tree.
//!
//! # Architecture
//!
//! Every customization compiles down to a single primitive: the
//! [`RewriteSession`], a transactional line-by-line rewrite that asserts an
//! exact number of structural edits and publishes its result through one
//! atomic rename. Intelligence lives in the per-file rule tables
//! ([`customize`]), not in the application logic.
//!
//! # Safety
//!
//! - Every rewrite asserts its expected edit count before publication
//! - Atomic file writes (shadow file + fsync + rename)
//! - A failed or aborted session leaves the original byte-identical
//! - Marker-not-found is a hard error, never a silent skip
//!
//! # Example
//!
//! ```no_run
//! use mkdroid::RewriteSession;
//!
//! # fn main() -> Result<(), mkdroid::RewriteError> {
//! let (mut session, stream) = RewriteSession::begin("build.xml", "version tag", 1)?;
//! for line in stream {
//!     let line = line?;
//!     if line.contains("version-tag:") {
//!         session.emit("<!-- version-tag: custom -->")?;
//!         session.record_edit();
//!     } else {
//!         session.emit(&line)?;
//!     }
//! }
//! session.commit()
//! # }
//! ```

pub mod config;
pub mod customize;
pub mod layout;
pub mod marker;
pub mod project;
pub mod rewrite;
pub mod rules;
pub mod scaffold;
pub mod sdk;

// Re-exports
pub use config::{ConfigError, ProjectConfig, KNOWN_API_LEVELS};
pub use layout::LayoutError;
pub use marker::{escape_xml, unescape_xml, Marker};
pub use project::{create, customize_tree, CreateReport, ProjectError, RewrittenFile};
pub use rewrite::{LineStream, RewriteError, RewriteSession};
pub use rules::{Action, EditRule, RuleSet};
pub use scaffold::ScaffoldError;
pub use sdk::{EnvError, SdkEnv, SharedConfig};
