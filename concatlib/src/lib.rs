//! # concatlib
//!
//! Walk a set of paths, drop everything matching gitignore-style ignore rules,
//! and concatenate what is left between file markers.
//!
//! ## Overview
//!
//! A run has two stages:
//!
//! - **Collect**: [`Collector`] walks directory roots top-down (pruning ignored
//!   directories before entering them), expands glob roots, and accepts single
//!   files. The result is a [`FileList`] sorted by path.
//! - **Emit**: [`Emitter`] writes each file as a
//!   `--- File: <path> ---` / `--- End File: <path> ---` block, reporting and
//!   skipping files that cannot be read as text.
//!
//! Ignore rules come from explicit patterns and from the `.gitignore` of the
//! base directory ([`gitignore::read_patterns`]). Pattern semantics are
//! documented in [`matcher`].
//!
//! Nothing here reads the process working directory: every path is resolved
//! and displayed relative to the base directory handed to [`Collector::new`].
//!
//! ## Example
//!
//! ```rust
//! use concatlib::{concat, CollectOptions, Emitter};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
//! fs::write(dir.path().join("notes.txt"), "hello").unwrap();
//! fs::write(dir.path().join("debug.log"), "noise").unwrap();
//!
//! let patterns = concatlib::gitignore::read_patterns(dir.path()).unwrap();
//! let options = CollectOptions::new()
//!     .ignore(".gitignore")
//!     .unwrap()
//!     .gitignore_patterns(patterns);
//!
//! let mut emitter = Emitter::new(Vec::new(), Vec::new());
//! let roots: [&str; 0] = [];
//! let summary = concat(dir.path(), roots, options, &mut emitter).unwrap();
//! assert_eq!(summary.emitted, 1);
//!
//! let (out, _) = emitter.into_inner();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "--- File: notes.txt ---\n\nhello\n--- End File: notes.txt ---\n\n"
//! );
//! ```

use std::io::Write;
use std::path::Path;

pub mod collector;
pub mod emitter;
pub mod error;
pub mod gitignore;
pub mod matcher;

pub use collector::{CollectOptions, Collector, FileEntry, FileList};
pub use emitter::{EmitSummary, Emitter};
pub use error::ConcatError;
pub use matcher::{matches, CandidatePath, IgnorePattern, IgnoreSet};

/// Result type for concatlib operations
pub type Result<T> = std::result::Result<T, ConcatError>;

/// Collect the files under `roots` and emit them in one go.
pub fn concat<I, P, O, D>(
    base_dir: impl AsRef<Path>,
    roots: I,
    options: CollectOptions,
    emitter: &mut Emitter<O, D>,
) -> Result<EmitSummary>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    O: Write,
    D: Write,
{
    let files = Collector::new(base_dir.as_ref(), options).collect(roots)?;
    emitter.emit(&files)
}
