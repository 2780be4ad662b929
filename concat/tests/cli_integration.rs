//! Integration tests for the concat CLI

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::{tempdir, TempDir};

fn run_concat(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_concat"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Files named in begin markers, in output order
fn emitted_files(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            line.strip_prefix("--- File: ")
                .and_then(|rest| rest.strip_suffix(" ---"))
        })
        .map(str::to_string)
        .collect()
}

fn gitignore_project() -> TempDir {
    let temp = tempdir().unwrap();
    write(temp.path(), ".gitignore", "*.log\nbuild/\n");
    write(temp.path(), "a.txt", "alpha\n");
    write(temp.path(), "a.log", "log\n");
    write(temp.path(), "build/out.bin", "bin\n");
    write(temp.path(), "src/build/note.txt", "note\n");
    temp
}

#[test]
fn test_cli_help() {
    let temp = tempdir().unwrap();
    let (stdout, _, success) = run_concat(temp.path(), &["--help"]);

    assert!(success);
    assert!(stdout.contains("concat"));
    assert!(stdout.contains("--ignore"));
    assert!(stdout.contains("--bypass-gitignore"));
    assert!(stdout.contains("--exclude-content"));
}

#[test]
fn test_cli_version() {
    let temp = tempdir().unwrap();
    let (stdout, _, success) = run_concat(temp.path(), &["--version"]);

    assert!(success);
    assert!(stdout.contains("concat"));
}

#[test]
fn test_gitignore_is_applied_by_default() {
    let temp = gitignore_project();
    let (stdout, stderr, success) = run_concat(temp.path(), &[]);

    assert!(success);
    assert_eq!(emitted_files(&stdout), vec![".gitignore", "a.txt"]);
    assert!(stdout.contains("--- File: a.txt ---\n\nalpha\n\n--- End File: a.txt ---\n\n"));
    assert!(stderr.is_empty());
}

#[test]
fn test_bypass_gitignore() {
    let temp = gitignore_project();
    let (stdout, _, success) = run_concat(temp.path(), &["--bypass-gitignore"]);

    assert!(success);
    assert_eq!(
        emitted_files(&stdout),
        vec![".gitignore", "a.log", "a.txt", "build/out.bin", "src/build/note.txt"]
    );
}

#[test]
fn test_bypass_gitignore_short_flag() {
    let temp = gitignore_project();
    let (stdout, _, success) = run_concat(temp.path(), &["-b"]);

    assert!(success);
    assert_eq!(emitted_files(&stdout).len(), 5);
}

#[test]
fn test_ignore_flag() {
    let temp = tempdir().unwrap();
    write(temp.path(), "keep.txt", "keep");
    write(temp.path(), "drop.tmp", "drop");

    for args in [vec!["--ignore", "*.tmp"], vec!["-i", "*.tmp", "-b"]] {
        let (stdout, _, success) = run_concat(temp.path(), &args);

        assert!(success);
        assert_eq!(emitted_files(&stdout), vec!["keep.txt"]);
    }
}

#[test]
fn test_roots_are_sorted() {
    let temp = tempdir().unwrap();
    write(temp.path(), "b/2.txt", "2");
    write(temp.path(), "a/1.txt", "1");

    let (stdout, _, success) = run_concat(temp.path(), &["b", "a"]);

    assert!(success);
    assert_eq!(emitted_files(&stdout), vec!["a/1.txt", "b/2.txt"]);
}

#[test]
fn test_glob_argument() {
    let temp = tempdir().unwrap();
    write(temp.path(), "docs/a.md", "a");
    write(temp.path(), "docs/deep/b.md", "b");
    write(temp.path(), "docs/c.txt", "c");

    let (stdout, _, success) = run_concat(temp.path(), &["docs/**/*.md"]);

    assert!(success);
    assert_eq!(emitted_files(&stdout), vec!["docs/a.md", "docs/deep/b.md"]);
}

#[test]
fn test_exclude_content() {
    let temp = tempdir().unwrap();
    write(temp.path(), "a.txt", "secret");

    let (stdout, _, success) = run_concat(temp.path(), &["--exclude-content"]);

    assert!(success);
    assert_eq!(stdout, "--- File: a.txt ---\n--- End File: a.txt ---\n\n");
}

#[test]
fn test_unreadable_file_is_skipped() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("blob.bin"), [0xff, 0xfe, 0xfd]).unwrap();
    write(temp.path(), "ok.txt", "fine");

    let (stdout, stderr, success) = run_concat(temp.path(), &[]);

    assert!(success);
    assert_eq!(emitted_files(&stdout), vec!["ok.txt"]);
    assert!(stderr.contains("Skipping blob.bin: "));
}

#[test]
fn test_missing_path_is_usage_error() {
    let temp = tempdir().unwrap();
    write(temp.path(), "present.txt", "x");

    let (stdout, stderr, success) = run_concat(temp.path(), &["present.txt", "missing.txt"]);

    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("missing.txt"));
}

#[test]
fn test_invalid_ignore_pattern_is_error() {
    let temp = tempdir().unwrap();
    write(temp.path(), "a.txt", "a");

    let (stdout, stderr, success) = run_concat(temp.path(), &["-i", "[oops"]);

    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("invalid glob pattern"));
}

#[test]
fn test_unreadable_gitignore_is_reported_and_ignored() {
    let temp = tempdir().unwrap();
    fs::create_dir(temp.path().join(".gitignore")).unwrap();
    write(temp.path(), "a.log", "log");

    let (stdout, stderr, success) = run_concat(temp.path(), &[]);

    assert!(success);
    assert_eq!(emitted_files(&stdout), vec!["a.log"]);
    assert!(stderr.contains("Error reading .gitignore"));
}

#[test]
fn test_output_is_idempotent() {
    let temp = gitignore_project();

    let (first, _, _) = run_concat(temp.path(), &["-b"]);
    let (second, _, _) = run_concat(temp.path(), &["-b"]);

    assert_eq!(first, second);
}

#[test]
fn test_closed_stdout_is_a_normal_finish() {
    let temp = tempdir().unwrap();
    // Larger than a pipe buffer, so writing outlives the reader
    write(temp.path(), "big.txt", &"line of text\n".repeat(200_000));

    let mut child = Command::new(env!("CARGO_BIN_EXE_concat"))
        .current_dir(temp.path())
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");
    drop(child.stdout.take());

    let output = child.wait_with_output().expect("Failed to wait for command");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(!stderr.contains("Error:"));
}
