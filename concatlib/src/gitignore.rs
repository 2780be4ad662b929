//! Loading `.gitignore` patterns from a single directory.
//!
//! Only the `.gitignore` directly inside the given directory is read. Parent
//! directories and subdirectories are never consulted.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::debug;

use crate::error::ConcatError;
use crate::Result;

/// File name looked up inside the base directory.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Split `.gitignore` text into patterns.
///
/// Lines are trimmed; blank lines and lines starting with `#` are dropped.
/// File order is preserved.
pub fn parse_patterns(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read the patterns of `dir/.gitignore`.
///
/// A missing file yields an empty list. Any other failure is a
/// [`ConcatError::GitignoreRead`].
pub fn read_patterns(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = dir.as_ref().join(GITIGNORE_FILE);

    match fs::read_to_string(&path) {
        Ok(text) => {
            let patterns = parse_patterns(&text);
            debug!(path = %path.display(), count = patterns.len(), "loaded gitignore");
            Ok(patterns)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(ConcatError::GitignoreRead { path, source }),
    }
}

/// Read the patterns of `dir/.gitignore`, never failing.
///
/// Read errors are reported on `diagnostics` as
/// `Error reading .gitignore: <message>` and treated as "no patterns".
pub fn load_patterns(dir: impl AsRef<Path>, diagnostics: &mut impl Write) -> Vec<String> {
    match read_patterns(dir) {
        Ok(patterns) => patterns,
        Err(ConcatError::GitignoreRead { source, .. }) => {
            let _ = writeln!(diagnostics, "Error reading {GITIGNORE_FILE}: {source}");
            Vec::new()
        }
        Err(e) => {
            let _ = writeln!(diagnostics, "Error reading {GITIGNORE_FILE}: {e}");
            Vec::new()
        }
    }
}
