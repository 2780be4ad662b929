//! Error types for concatlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while collecting or emitting files
#[derive(Error, Debug)]
pub enum ConcatError {
    /// An explicitly named path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// A root path exists but could not be traversed
    #[error("cannot access '{path}': {source}")]
    RootAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// `.gitignore` exists but could not be read
    #[error("failed to read '{path}': {source}")]
    GitignoreRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a collected file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
