//! Gitignore-style pattern matching on top of `glob::Pattern`.
//!
//! Every pattern is classified once into an [`IgnorePattern`] variant and
//! every candidate path is split once into a [`CandidatePath`], so a path can
//! be checked against any number of patterns without re-parsing either side.
//!
//! ## Glob semantics
//!
//! All matching goes through [`MATCH_OPTIONS`]:
//!
//! - `*` and `?` never match `/`
//! - `*` does match a leading `.` (so `*.env` matches `.env`)
//! - matching is case-sensitive on every platform
//!
//! ## Rules
//!
//! | Pattern     | Variant                        | Matches                                   |
//! |-------------|--------------------------------|-------------------------------------------|
//! | `*.log`     | [`IgnorePattern::Bare`]        | any path component, including the basename |
//! | `docs/*.md` | [`IgnorePattern::Anchored`]    | the whole path only                       |
//! | `build/`    | [`IgnorePattern::Directory`]   | the path, an ancestor prefix, or (bare base) any directory component |
//! | `/build`    | [`IgnorePattern::Anchored`]    | the whole path only                       |
//!
//! A leading `/` has no special meaning: `/build` is an anchored glob like
//! any other, so it only matches paths that are themselves absolute.
//!
//! Negation (`!`), `**` beyond what `glob` provides, and precedence between
//! patterns are not supported; a set of patterns is a plain OR.

use glob::{MatchOptions, Pattern};
use tracing::warn;

use crate::error::ConcatError;
use crate::Result;

/// Options used for every glob comparison.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn glob_matches(pattern: &Pattern, text: &str) -> bool {
    pattern.matches_with(text, MATCH_OPTIONS)
}

/// Replace the platform separator with `/`.
pub(crate) fn normalize_separators(s: &str) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        s.to_string()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// A path in `/`-separated form, split into components once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    text: String,
    /// Byte ranges of the non-empty components
    spans: Vec<(usize, usize)>,
    is_dir: bool,
}

impl CandidatePath {
    fn new(path: &str, is_dir: bool) -> Self {
        let text = normalize_separators(path);
        let mut spans = Vec::new();
        let mut start = 0;
        for (i, c) in text.char_indices() {
            if c == '/' {
                if i > start {
                    spans.push((start, i));
                }
                start = i + 1;
            }
        }
        if text.len() > start {
            spans.push((start, text.len()));
        }
        Self {
            text,
            spans,
            is_dir,
        }
    }

    /// A candidate naming a regular file.
    pub fn file(path: &str) -> Self {
        Self::new(path, false)
    }

    /// A candidate naming a directory.
    pub fn dir(path: &str) -> Self {
        Self::new(path, true)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// The `/`-separated components, skipping empty ones.
    pub fn components(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(move |&(s, e)| &self.text[s..e])
    }

    /// The last component (empty for an empty path).
    pub fn basename(&self) -> &str {
        self.spans
            .last()
            .map(|&(s, e)| &self.text[s..e])
            .unwrap_or("")
    }

    /// Proper ancestor prefixes: `a`, `a/b`, `a/b/c` for `a/b/c/d`.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> + '_ {
        let n = self.spans.len().saturating_sub(1);
        self.spans[..n].iter().map(move |&(_, e)| &self.text[..e])
    }

    /// Components that name directories: every ancestor component, plus
    /// the last one when the candidate is itself a directory.
    fn directory_components(&self) -> impl Iterator<Item = &str> + '_ {
        let n = if self.is_dir {
            self.spans.len()
        } else {
            self.spans.len().saturating_sub(1)
        };
        self.spans[..n].iter().map(move |&(s, e)| &self.text[s..e])
    }
}

/// A single ignore pattern, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnorePattern {
    /// The empty pattern; never matches
    Empty,
    /// No `/` anywhere: matches any single component
    Bare(Pattern),
    /// Contains a `/` before the end: matches the whole path
    Anchored(Pattern),
    /// Ends with `/`: matches the directory and everything below it
    Directory {
        /// The pattern with the trailing `/` removed
        base: Pattern,
        /// Whether `base` may match a directory at any depth
        bare: bool,
    },
}

impl IgnorePattern {
    /// Classify and compile a raw pattern.
    ///
    /// Fails with [`ConcatError::InvalidGlob`] when the glob is malformed.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize_separators(raw);

        let compile = |p: &str| {
            Pattern::new(p).map_err(|e| ConcatError::InvalidGlob {
                pattern: raw.to_string(),
                message: e.to_string(),
            })
        };

        if let Some(base) = normalized.strip_suffix('/') {
            if base.is_empty() {
                return Ok(Self::Empty);
            }
            return Ok(Self::Directory {
                base: compile(base)?,
                bare: !base.contains('/'),
            });
        }

        if normalized.is_empty() {
            Ok(Self::Empty)
        } else if normalized.contains('/') {
            Ok(Self::Anchored(compile(&normalized)?))
        } else {
            Ok(Self::Bare(compile(&normalized)?))
        }
    }

    /// Like [`IgnorePattern::parse`], but a malformed glob is matched
    /// literally instead of failing.
    pub fn parse_lossy(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("{e}; matching it literally");
                Self::parse(&Pattern::escape(raw)).unwrap_or(Self::Empty)
            }
        }
    }

    /// Check whether this pattern matches `path`.
    pub fn matches(&self, path: &CandidatePath) -> bool {
        match self {
            Self::Empty => false,
            Self::Bare(pattern) => {
                glob_matches(pattern, path.as_str())
                    || glob_matches(pattern, path.basename())
                    || path.components().any(|c| glob_matches(pattern, c))
            }
            Self::Anchored(pattern) => glob_matches(pattern, path.as_str()),
            Self::Directory { base, bare } => {
                glob_matches(base, path.as_str())
                    || path.ancestors().any(|a| glob_matches(base, a))
                    || (*bare && path.directory_components().any(|c| glob_matches(base, c)))
            }
        }
    }
}

/// Check a raw pattern against a `/`-separated path naming a file.
///
/// Malformed globs are matched literally; the empty pattern never matches.
pub fn matches(pattern: &str, path: &str) -> bool {
    IgnorePattern::parse_lossy(pattern).matches(&CandidatePath::file(path))
}

/// The combined ignore rule: explicit patterns OR `.gitignore` patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    explicit: Vec<IgnorePattern>,
    gitignore: Vec<IgnorePattern>,
    bypass_gitignore: bool,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an explicit pattern; malformed globs are an error.
    pub fn add_explicit(&mut self, raw: &str) -> Result<()> {
        self.explicit.push(IgnorePattern::parse(raw)?);
        Ok(())
    }

    /// Add a `.gitignore` pattern; malformed globs are matched literally.
    pub fn add_gitignore(&mut self, raw: &str) {
        self.gitignore.push(IgnorePattern::parse_lossy(raw));
    }

    pub fn set_bypass_gitignore(&mut self, bypass: bool) {
        self.bypass_gitignore = bypass;
    }

    /// True when no pattern can ever match.
    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && (self.bypass_gitignore || self.gitignore.is_empty())
    }

    pub fn is_ignored(&self, path: &CandidatePath) -> bool {
        if self.explicit.iter().any(|p| p.matches(path)) {
            return true;
        }
        !self.bypass_gitignore && self.gitignore.iter().any(|p| p.matches(path))
    }
}
