//! Shared test harness for svcs CLI integration tests.
//!
//! Runs the compiled `svcs` binary in a temp directory with a pinned
//! author identity so output is deterministic.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured output from running a command.
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn assert_ok(&self) -> &Self {
        assert_eq!(
            self.exit_code, 0,
            "expected success, got {}\nstdout: {}\nstderr: {}",
            self.exit_code, self.stdout, self.stderr
        );
        self
    }
}

/// Discover the path to the compiled `svcs` binary.
pub fn svcs_bin() -> PathBuf {
    let mut path = std::env::current_exe()
        .unwrap()
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    path.push("svcs");
    path
}

/// Run svcs in `dir` with the given arguments.
pub fn svcs(dir: &Path, args: &[&str]) -> CommandResult {
    let mut cmd = Command::new(svcs_bin());
    cmd.args(args)
        .current_dir(dir)
        .env("SVCS_AUTHOR", "Test Author <test@example.com>");
    let output = cmd.output().expect("failed to run svcs");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

/// Write a file under `dir`, creating parents.
pub fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}
