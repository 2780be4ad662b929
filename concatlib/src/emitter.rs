//! Writing collected files between begin/end markers.

use std::fs;
use std::io::Write;

use tracing::debug;

use crate::collector::{FileEntry, FileList};
use crate::error::ConcatError;
use crate::Result;

/// Counts from one [`Emitter::emit`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    /// Files written to the output
    pub emitted: usize,
    /// Files reported on diagnostics and left out
    pub skipped: usize,
}

/// Streams file blocks to `out` and skip reports to `diagnostics`.
pub struct Emitter<O: Write, D: Write> {
    out: O,
    diagnostics: D,
    exclude_content: bool,
}

impl<O: Write, D: Write> Emitter<O, D> {
    pub fn new(out: O, diagnostics: D) -> Self {
        Self {
            out,
            diagnostics,
            exclude_content: false,
        }
    }

    /// Emit only the markers, without reading the files.
    pub fn exclude_content(mut self, exclude: bool) -> Self {
        self.exclude_content = exclude;
        self
    }

    /// Write every file of `files`, in order.
    ///
    /// A file that cannot be read as UTF-8 text is reported as
    /// `Skipping <path>: <message>` and left out. Only failures to write
    /// `out` or `diagnostics` are returned as errors.
    pub fn emit(&mut self, files: &FileList) -> Result<EmitSummary> {
        let mut summary = EmitSummary::default();
        if files.is_empty() {
            debug!("no files to emit");
        }

        for entry in files {
            if self.exclude_content {
                writeln!(self.out, "--- File: {} ---", entry.display)?;
                writeln!(self.out, "--- End File: {} ---\n", entry.display)?;
                summary.emitted += 1;
                continue;
            }

            match read_text(entry) {
                Ok(content) => {
                    writeln!(self.out, "--- File: {} ---\n", entry.display)?;
                    writeln!(self.out, "{content}")?;
                    writeln!(self.out, "--- End File: {} ---\n", entry.display)?;
                    summary.emitted += 1;
                }
                Err(ConcatError::FileRead { source, .. }) => {
                    writeln!(self.diagnostics, "Skipping {}: {source}", entry.display)?;
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        self.out.flush()?;
        debug!(
            emitted = summary.emitted,
            skipped = summary.skipped,
            "emit finished"
        );
        Ok(summary)
    }

    /// Give back the writers.
    pub fn into_inner(self) -> (O, D) {
        (self.out, self.diagnostics)
    }
}

fn read_text(entry: &FileEntry) -> Result<String> {
    fs::read_to_string(&entry.path).map_err(|source| ConcatError::FileRead {
        path: entry.path.clone(),
        source,
    })
}
