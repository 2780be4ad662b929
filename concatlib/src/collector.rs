//! File discovery with ignore-rule pruning.
//!
//! This module turns a list of roots into the sorted list of files to emit.
//! Each root is one of:
//!
//! - **a directory**: walked top-down; ignored subdirectories are pruned
//!   before they are entered, so nothing below them is ever listed
//! - **a glob** (`*` or `?`, and not an existing directory): expanded on the
//!   filesystem, `**` included
//! - **a single path**: kept unless ignored
//!
//! Every path is judged in its `/`-separated form relative to the base
//! directory, which is also the directory relative roots resolve against.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ConcatError;
use crate::matcher::{normalize_separators, CandidatePath, IgnoreSet};
use crate::Result;

/// Options for glob roots: like a shell, `*` does not pick up dotfiles.
const EXPAND_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Options controlling which files are collected.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    rules: IgnoreSet,
}

impl CollectOptions {
    /// Create options with no ignore rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an explicit ignore pattern.
    pub fn ignore(mut self, pattern: &str) -> Result<Self> {
        self.rules.add_explicit(pattern)?;
        Ok(self)
    }

    /// Add multiple explicit ignore patterns.
    pub fn ignore_many<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self = self.ignore(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Add patterns loaded from a `.gitignore`.
    pub fn gitignore_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.rules.add_gitignore(pattern.as_ref());
        }
        self
    }

    /// Skip the `.gitignore` patterns when judging paths.
    pub fn bypass_gitignore(mut self, bypass: bool) -> Self {
        self.rules.set_bypass_gitignore(bypass);
        self
    }

    /// The combined ignore rule.
    pub fn rules(&self) -> &IgnoreSet {
        &self.rules
    }
}

/// A collected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// `/`-separated path relative to the base directory; used for sorting and markers
    pub display: String,
    /// Location on disk
    pub path: PathBuf,
}

/// Files to emit, sorted by [`FileEntry::display`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    entries: Vec<FileEntry>,
}

impl FileList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.entries.iter()
    }

    /// The display paths, in order.
    pub fn displays(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.display.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Walks roots and applies the ignore rules.
#[derive(Debug, Clone)]
pub struct Collector {
    base_dir: PathBuf,
    options: CollectOptions,
}

impl Collector {
    /// Create a collector judging paths relative to `base_dir`.
    ///
    /// A relative `base_dir` is taken relative to the process working
    /// directory; `"."` is the working directory itself.
    pub fn new(base_dir: impl Into<PathBuf>, options: CollectOptions) -> Self {
        Self {
            base_dir: normalize_or_current(&base_dir.into()),
            options,
        }
    }

    /// Collect the files under `roots`.
    ///
    /// An empty `roots` collects the base directory. Fails only when a root
    /// itself is missing or unreadable, or a glob root is malformed.
    pub fn collect<I, P>(&self, roots: I) -> Result<FileList>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut roots: Vec<PathBuf> = roots
            .into_iter()
            .map(|r| r.as_ref().to_path_buf())
            .collect();
        if roots.is_empty() {
            roots.push(self.base_dir.clone());
        }

        let mut entries = Vec::new();
        for root in &roots {
            let before = entries.len();
            self.collect_root(root, &mut entries)?;
            debug!(
                root = %root.display(),
                files = entries.len() - before,
                "collected root"
            );
        }

        entries.sort_by(|a, b| a.display.cmp(&b.display));

        let list = FileList { entries };
        debug!(files = list.len(), "collection finished");
        Ok(list)
    }

    fn collect_root(&self, root: &Path, entries: &mut Vec<FileEntry>) -> Result<()> {
        let resolved = normalize_or_current(&self.base_dir.join(root));

        if resolved.is_dir() {
            return self.walk_dir(&resolved, entries);
        }

        let root_str = root.to_string_lossy();
        if is_glob(&root_str) {
            return self.expand_glob(root, entries);
        }

        if resolved.symlink_metadata().is_err() {
            return Err(ConcatError::PathNotFound(root.to_path_buf()));
        }

        self.push_if_kept(resolved, entries);
        Ok(())
    }

    fn walk_dir(&self, root: &Path, entries: &mut Vec<FileEntry>) -> Result<()> {
        let rules = self.options.rules();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() || rules.is_empty() {
                    return true;
                }
                let candidate = self.candidate(e.path(), true);
                let ignored = rules.is_ignored(&candidate);
                if ignored {
                    debug!(dir = candidate.as_str(), "pruned");
                }
                !ignored
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if e.depth() == 0 || e.path() == Some(root) => {
                    return Err(ConcatError::RootAccess {
                        path: root.to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };

            // Symlinks are not followed, but a symlink to a file still counts
            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }

            self.push_if_kept(entry.into_path(), entries);
        }

        Ok(())
    }

    fn expand_glob(&self, root: &Path, entries: &mut Vec<FileEntry>) -> Result<()> {
        let root_str = normalize_separators(&root.to_string_lossy());
        let pattern = if root.is_absolute() {
            root_str.clone()
        } else {
            format!(
                "{}/{}",
                Pattern::escape(&normalize_separators(&self.base_dir.to_string_lossy())),
                root_str
            )
        };

        let paths = glob::glob_with(&pattern, EXPAND_OPTIONS).map_err(|e| {
            ConcatError::InvalidGlob {
                pattern: root_str.clone(),
                message: e.to_string(),
            }
        })?;

        for path in paths {
            match path {
                Ok(path) if path.is_file() => self.push_if_kept(normalize_lexically(&path), entries),
                Ok(path) => debug!(path = %path.display(), "glob matched a non-file"),
                Err(e) => warn!("skipping unreadable glob match: {e}"),
            }
        }

        Ok(())
    }

    fn push_if_kept(&self, path: PathBuf, entries: &mut Vec<FileEntry>) {
        let candidate = self.candidate(&path, false);
        if self.options.rules().is_ignored(&candidate) {
            debug!(file = candidate.as_str(), "ignored");
            return;
        }
        entries.push(FileEntry {
            display: candidate.as_str().to_string(),
            path,
        });
    }

    fn candidate(&self, path: &Path, is_dir: bool) -> CandidatePath {
        let display = display_path(path, &self.base_dir);
        if is_dir {
            CandidatePath::dir(&display)
        } else {
            CandidatePath::file(&display)
        }
    }
}

/// Whether a root should be expanded as a glob rather than taken literally.
pub fn is_glob(s: &str) -> bool {
    s.contains('*') || s.contains('?')
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Like [`normalize_lexically`], but a path that normalizes away entirely
/// becomes `.`.
fn normalize_or_current(path: &Path) -> PathBuf {
    let normalized = normalize_lexically(path);
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Express `path` relative to `base`, climbing with `..` where needed.
///
/// Returns `None` when the two cannot be related, e.g. different drives.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = normalize_lexically(path);
    let base = normalize_lexically(base);
    if path.is_absolute() != base.is_absolute() {
        return None;
    }

    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();
    while let (Some(p), Some(b)) = (path_components.peek(), base_components.peek()) {
        if p != b {
            break;
        }
        path_components.next();
        base_components.next();
    }

    let mut relative = PathBuf::new();
    for component in base_components {
        match component {
            Component::Normal(_) => relative.push(".."),
            _ => return None,
        }
    }
    for component in path_components {
        match component {
            Component::Prefix(_) | Component::RootDir => return None,
            other => relative.push(other.as_os_str()),
        }
    }
    Some(relative)
}

/// The `/`-separated form of `path` relative to `base`, or of `path` itself
/// when no relative form exists.
pub fn display_path(path: &Path, base: &Path) -> String {
    let shown = match relative_to(path, base) {
        Some(relative) if relative.as_os_str().is_empty() => PathBuf::from("."),
        Some(relative) => relative,
        None => path.to_path_buf(),
    };
    normalize_separators(&shown.to_string_lossy())
}
