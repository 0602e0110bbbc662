//! Edit rules: the (trigger, action, counted) tables a rewrite streams
//! through.
//!
//! "Exactly once" is enforced by the session's count gate rather than by
//! muting a rule after its first hit - a marker that shows up twice in a
//! generated file is corruption, and the commit surfaces it as a surplus.

use std::path::Path;

use crate::marker::Marker;
use crate::rewrite::{RewriteError, RewriteSession};

/// What to do with a line once its marker fires.
#[derive(Debug, Clone)]
pub enum Action {
    /// Emit `text` in place of the line.
    Replace(String),
    /// Replace the marker's capture group 1 with `text`, keeping the rest of
    /// the line byte-for-byte.
    SubstituteCapture(String),
    /// Emit a block, then the line.
    InsertBefore(String),
    /// Emit the line, then a block.
    InsertAfter(String),
    /// Emit nothing.
    Drop,
}

/// One structural transformation within a rule set.
#[derive(Debug, Clone)]
pub struct EditRule {
    marker: Marker,
    action: Action,
    counted: bool,
}

impl EditRule {
    /// A rule whose firing counts toward the session's expected total.
    pub fn counted(marker: Marker, action: Action) -> Self {
        EditRule {
            marker,
            action,
            counted: true,
        }
    }

    /// A rule applied for its side effect only.
    pub fn uncounted(marker: Marker, action: Action) -> Self {
        EditRule {
            marker,
            action,
            counted: false,
        }
    }
}

/// An ordered rule table evaluated in a single pass over one file.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<EditRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<EditRule>) -> Self {
        RuleSet { rules }
    }

    /// Sum of expected edits: each counted rule must fire exactly once.
    pub fn expected_edits(&self) -> usize {
        self.rules.iter().filter(|r| r.counted).count()
    }

    /// Run the table against `path` in one rewrite session.
    ///
    /// `what` names the transformation for the integrity error message.
    pub fn run(&self, path: &Path, what: &str) -> Result<(), RewriteError> {
        let (mut session, stream) = RewriteSession::begin(path, what, self.expected_edits())?;
        for line in stream {
            let line = line?;
            self.apply_line(&line, &mut session)?;
        }
        session.commit()
    }

    /// Apply the first firing rule to `line`; forward it verbatim when no
    /// rule fires.
    fn apply_line(&self, line: &str, session: &mut RewriteSession) -> Result<(), RewriteError> {
        for rule in &self.rules {
            if !rule.marker.fires(line) {
                continue;
            }
            match &rule.action {
                Action::Replace(text) => session.emit(text)?,
                Action::SubstituteCapture(text) => {
                    match rule.marker.substitute_capture(line, text) {
                        Some(rewritten) => session.emit(&rewritten)?,
                        // fires() passed, so this only happens for a
                        // substring marker misused with this action
                        None => session.emit(line)?,
                    }
                }
                Action::InsertBefore(block) => {
                    session.emit(block)?;
                    session.emit(line)?;
                }
                Action::InsertAfter(block) => {
                    session.emit(line)?;
                    session.emit(block)?;
                }
                Action::Drop => {}
            }
            if rule.counted {
                session.record_edit();
            }
            return Ok(());
        }
        session.emit(line)
    }
}

/// Drop each line matching an ordered list of phrases, one line per phrase,
/// in order. Only the next unconsumed phrase is eligible, so a file with the
/// phrases shuffled fails the count gate.
pub fn drop_phrases(path: &Path, what: &str, phrases: &[&str]) -> Result<(), RewriteError> {
    let (mut session, stream) = RewriteSession::begin(path, what, phrases.len())?;
    let mut next = 0;
    for line in stream {
        let line = line?;
        if next < phrases.len() && line.contains(phrases[next]) {
            next += 1;
            session.record_edit();
        } else {
            session.emit(&line)?;
        }
    }
    session.commit()
}

/// Delete every line from the start marker through the end marker inclusive.
/// Both boundary hits count, so a missing end marker fails the commit (and
/// with it, a file-swallowing runaway deletion).
pub fn strip_marked_span(
    path: &Path,
    what: &str,
    start: &Marker,
    end: &Marker,
) -> Result<(), RewriteError> {
    let (mut session, stream) = RewriteSession::begin(path, what, 2)?;
    let mut in_span = false;
    for line in stream {
        let line = line?;
        if !in_span {
            if start.fires(&line) {
                in_span = true;
                session.record_edit();
            } else {
                session.emit(&line)?;
            }
        } else if end.fires(&line) {
            in_span = false;
            session.record_edit();
        }
    }
    session.commit()
}

/// Pure-formatting pass: strip trailing spaces/tabs from every line, collapse
/// interior runs of blank lines to a single blank, and drop leading blanks
/// and trailing blanks at end-of-file entirely.
///
/// Expected count is zero, so this pass always commits. Applying it twice
/// yields the same bytes as applying it once.
pub fn tidy_markup(path: &Path) -> Result<(), RewriteError> {
    let (mut session, stream) = RewriteSession::begin(path, "formatting", 0)?;
    let mut pending_blank = false;
    let mut seen_content = false;
    for line in stream {
        let line = line?;
        let trimmed = line.trim_end_matches([' ', '\t']);
        if trimmed.is_empty() {
            pending_blank = true;
        } else {
            if pending_blank && seen_content {
                session.emit("")?;
            }
            pending_blank = false;
            seen_content = true;
            session.emit(trimmed)?;
        }
    }
    session.commit()
}
