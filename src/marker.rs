//! Line markers: the triggers that decide where a structural edit fires.
//!
//! Matching is strictly line-oriented (substring containment or a regex with
//! capture groups). No XML parsing happens anywhere in this crate - keeping
//! the matchers dumb is what keeps them stable across scaffolder versions.

use regex::Regex;

/// A trigger identifying the line where an edit must occur.
#[derive(Debug, Clone)]
pub enum Marker {
    /// Fires when the line contains the needle anywhere.
    Substring(String),
    /// Fires when the pattern matches the line.
    Regex(Regex),
}

impl Marker {
    pub fn substring(needle: impl Into<String>) -> Self {
        Marker::Substring(needle.into())
    }

    /// Compile a regex marker.
    ///
    /// Patterns are fixed strings defined in this crate, so a bad pattern is
    /// a programming error, not an input error.
    pub fn regex(pattern: &str) -> Self {
        Marker::Regex(Regex::new(pattern).unwrap_or_else(|e| {
            panic!("invalid built-in marker pattern {pattern:?}: {e}");
        }))
    }

    /// Does this marker fire on the given line?
    pub fn fires(&self, line: &str) -> bool {
        match self {
            Marker::Substring(needle) => line.contains(needle.as_str()),
            Marker::Regex(re) => re.is_match(line),
        }
    }

    /// Replace the span of capture group 1 with `replacement`, leaving every
    /// byte outside the captured span untouched.
    ///
    /// Returns `None` for substring markers or when the pattern does not
    /// match (callers check [`Marker::fires`] first).
    pub fn substitute_capture(&self, line: &str, replacement: &str) -> Option<String> {
        let Marker::Regex(re) = self else {
            return None;
        };
        let caps = re.captures(line)?;
        let span = caps.get(1)?;

        let mut out = String::with_capacity(line.len() + replacement.len());
        out.push_str(&line[..span.start()]);
        out.push_str(replacement);
        out.push_str(&line[span.end()..]);
        Some(out)
    }
}

/// Escape text for insertion into XML attribute or element content.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Invert [`escape_xml`]. Unrecognized entities pass through verbatim.
pub fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let entity = [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
        ]
        .iter()
        .find(|(name, _)| rest.starts_with(name));
        match entity {
            Some((name, ch)) => {
                out.push(*ch);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
