//! Transactional line rewrites.
//!
//! A [`RewriteSession`] streams one file's lines through caller-supplied edit
//! logic into a shadow file, counting structural edits as they happen. The
//! session only publishes the result if the observed edit count equals the
//! count fixed at [`RewriteSession::begin`], and publication is a single
//! atomic rename - no other process ever sees a partially-written file.
//!
//! A scaffolder upgrade that changes the generated markup must surface as a
//! hard [`RewriteError::MissingEdits`] rather than silently producing a
//! half-customized project, so "marker not found" is fatal and the original
//! file is left byte-identical.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    /// The rule set required more edits than the file yielded. The original
    /// file has not been modified.
    #[error("{what} ({missing}) not found in {path}")]
    MissingEdits {
        what: String,
        missing: usize,
        path: PathBuf,
    },

    /// A marker matched more often than the rule set allows. The original
    /// file has not been modified.
    #[error("{what} matched {surplus} more time(s) than expected in {path}")]
    SurplusEdits {
        what: String,
        surplus: usize,
        path: PathBuf,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

impl RewriteError {
    fn io(path: &Path, source: io::Error) -> Self {
        RewriteError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Lazy, forward-only stream of the original file's lines.
///
/// Consumed exactly once per session; every line must be explicitly
/// forwarded, transformed, or dropped by the caller.
#[derive(Debug)]
pub struct LineStream {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl Iterator for LineStream {
    type Item = Result<String, RewriteError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines
            .next()
            .map(|res| res.map_err(|e| RewriteError::io(&self.path, e)))
    }
}

/// One file's atomic rewrite: `Open -> {Committed | Aborted}`.
///
/// The shadow file lives in the target's own directory so the final rename
/// never crosses a filesystem boundary. Dropping the session on any path
/// other than a successful [`commit`](RewriteSession::commit) deletes the
/// shadow and leaves the original untouched.
#[derive(Debug)]
pub struct RewriteSession {
    path: PathBuf,
    shadow: BufWriter<NamedTempFile>,
    what: String,
    expected: usize,
    observed: usize,
}

impl RewriteSession {
    /// Open `path` for reading and create the shadow file next to it.
    ///
    /// `what` names the edit for the integrity error message; `expected` is
    /// the exact number of [`record_edit`](RewriteSession::record_edit)
    /// calls [`commit`](RewriteSession::commit) will require.
    pub fn begin(
        path: impl AsRef<Path>,
        what: impl Into<String>,
        expected: usize,
    ) -> Result<(Self, LineStream), RewriteError> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).map_err(|e| RewriteError::io(&path, e))?;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let shadow = NamedTempFile::new_in(parent).map_err(|e| RewriteError::io(&path, e))?;

        let stream = LineStream {
            path: path.clone(),
            lines: BufReader::new(file).lines(),
        };
        let session = RewriteSession {
            path,
            shadow: BufWriter::new(shadow),
            what: what.into(),
            expected,
            observed: 0,
        };
        Ok((session, stream))
    }

    /// Append `text` to the shadow output, newline-terminated.
    ///
    /// May be called zero or more times per input line; inserting a block is
    /// just several `emit` calls (or one call with embedded newlines).
    pub fn emit(&mut self, text: &str) -> Result<(), RewriteError> {
        writeln!(self.shadow, "{text}").map_err(|e| RewriteError::io(&self.path, e))
    }

    /// Record one successful structural edit.
    pub fn record_edit(&mut self) {
        self.observed += 1;
    }

    pub fn observed_edits(&self) -> usize {
        self.observed
    }

    pub fn expected_edits(&self) -> usize {
        self.expected
    }

    /// Validate the edit count and atomically replace the original.
    ///
    /// On a count mismatch the shadow is discarded and the original file is
    /// untouched. On success the shadow is flushed, fsynced, and renamed
    /// over the original, then the mtime is bumped so downstream build
    /// tools notice the change.
    pub fn commit(self) -> Result<(), RewriteError> {
        let RewriteSession {
            path,
            shadow,
            what,
            expected,
            observed,
        } = self;

        match observed.cmp(&expected) {
            Ordering::Less => {
                return Err(RewriteError::MissingEdits {
                    what,
                    missing: expected - observed,
                    path,
                });
            }
            Ordering::Greater => {
                return Err(RewriteError::SurplusEdits {
                    what,
                    surplus: observed - expected,
                    path,
                });
            }
            Ordering::Equal => {}
        }

        let shadow = shadow
            .into_inner()
            .map_err(|e| RewriteError::io(&path, e.into_error()))?;

        shadow
            .as_file()
            .sync_all()
            .map_err(|e| RewriteError::io(&path, e))?;

        shadow
            .persist(&path)
            .map_err(|e| RewriteError::io(&path, e.error))?;

        let now = filetime::FileTime::now();
        filetime::set_file_mtime(&path, now).map_err(|e| RewriteError::io(&path, e))?;

        Ok(())
    }
}
