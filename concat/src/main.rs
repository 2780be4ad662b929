//! # concat
//!
//! Concatenate files to standard output between file markers, skipping
//! anything matched by `.gitignore` or by `--ignore` patterns.
//!
//! ## Usage
//!
//! ```bash
//! # Everything under the current directory, honouring ./.gitignore
//! concat
//!
//! # Specific directories, files, or globs
//! concat src README.md "docs/**/*.md"
//!
//! # Extra ignore patterns
//! concat . -i "*.lock" -i "fixtures/"
//!
//! # Ignore ./.gitignore
//! concat -b
//!
//! # List the files that would be included, without their content
//! concat --exclude-content
//! ```
//!
//! Each file is written as:
//!
//! ```text
//! --- File: src/main.rs ---
//!
//! <content>
//! --- End File: src/main.rs ---
//! ```
//!
//! Files that cannot be read as text are reported on stderr as
//! `Skipping <path>: <reason>` and do not affect the exit code.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use concatlib::collector::is_glob;
use concatlib::{concat, gitignore, CollectOptions, ConcatError, Emitter};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("concat")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Concatenate files with file markers, honouring .gitignore")
        .arg(
            Arg::new("paths")
                .action(ArgAction::Append)
                .help("Files, directories, or glob patterns (defaults to current directory)"),
        )
        .arg(
            Arg::new("ignore")
                .short('i')
                .long("ignore")
                .action(ArgAction::Append)
                .help("Path patterns to ignore (can be specified multiple times)"),
        )
        .arg(
            Arg::new("bypass-gitignore")
                .short('b')
                .long("bypass-gitignore")
                .action(ArgAction::SetTrue)
                .help("Bypass the current directory's .gitignore file"),
        )
        .arg(
            Arg::new("exclude-content")
                .long("exclude-content")
                .action(ArgAction::SetTrue)
                .help("Only print the file markers, not the file contents"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log progress to stderr (-vv for debug output)"),
        )
}

/// Set up logging on stderr; RUST_LOG takes precedence over -v
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .try_init();
}

/// Extract a repeatable string argument
fn extract_values(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

/// Every explicit path must exist; glob patterns are checked when expanded
fn check_paths(paths: &[String], base_dir: &Path) -> Result<(), ConcatError> {
    for path in paths {
        if !is_glob(path) && !base_dir.join(path).exists() {
            return Err(ConcatError::PathNotFound(PathBuf::from(path)));
        }
    }
    Ok(())
}

/// A reader that stopped early (`concat | head`) is a normal finish
fn is_broken_pipe(error: &ConcatError) -> bool {
    matches!(error, ConcatError::Io(source) if source.kind() == io::ErrorKind::BrokenPipe)
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let base_dir = std::env::current_dir().context("cannot determine the current directory")?;

    let paths = extract_values(matches, "paths");
    check_paths(&paths, &base_dir)?;

    let bypass_gitignore = matches.get_flag("bypass-gitignore");
    let gitignore_patterns = if bypass_gitignore {
        Vec::new()
    } else {
        gitignore::load_patterns(&base_dir, &mut io::stderr())
    };

    let options = CollectOptions::new()
        .ignore_many(extract_values(matches, "ignore"))?
        .gitignore_patterns(gitignore_patterns)
        .bypass_gitignore(bypass_gitignore);

    let stdout = io::stdout();
    let mut emitter = Emitter::new(BufWriter::new(stdout.lock()), io::stderr())
        .exclude_content(matches.get_flag("exclude-content"));

    let summary = match concat(&base_dir, &paths, options, &mut emitter) {
        Ok(summary) => summary,
        Err(e) if is_broken_pipe(&e) => {
            info!("output closed early");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    info!(
        emitted = summary.emitted,
        skipped = summary.skipped,
        "done"
    );

    Ok(())
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
