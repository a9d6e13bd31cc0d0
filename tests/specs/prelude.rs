//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for testing `ojp` CLI behavior end to end
//! against a real `ojpd` daemon process.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Aggressive timeouts for fast tests.
//
// IMPORTANT:
//   Do NOT change these.
//   File a performance bug instead.
const OJP_TIMEOUT_CONNECT_MS: &str = "2000";
const OJP_TIMEOUT_EXIT_MS: &str = "500";
const OJP_TIMEOUT_IPC_MS: &str = "500";
const OJP_CONNECT_POLL_MS: &str = "5";

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// This works with both standard builds and llvm-cov coverage runs.
/// Falls back to resolving relative to the test binary itself when
/// `CARGO_MANIFEST_DIR` is stale (e.g. compiled by a removed worktree
/// into a shared target directory).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Returns the path to the `ojp` CLI binary.
fn ojp_binary() -> PathBuf {
    binary_path("ojp")
}

/// Returns the path to the `ojpd` daemon binary.
pub fn ojpd_binary() -> PathBuf {
    binary_path("ojpd")
}

/// Returns a Command configured to run the `ojp` binary.
pub fn ojp_cmd() -> Command {
    Command::new(ojp_binary())
}

/// Create a CLI builder for `ojp` commands.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                (
                    "OJP_DAEMON_BINARY".into(),
                    ojpd_binary().to_string_lossy().into(),
                ),
                (
                    "OJP_TIMEOUT_CONNECT_MS".into(),
                    OJP_TIMEOUT_CONNECT_MS.into(),
                ),
                ("OJP_TIMEOUT_EXIT_MS".into(), OJP_TIMEOUT_EXIT_MS.into()),
                ("OJP_TIMEOUT_IPC_MS".into(), OJP_TIMEOUT_IPC_MS.into()),
                ("OJP_CONNECT_POLL_MS".into(), OJP_CONNECT_POLL_MS.into()),
            ],
        }
    }

    /// Add CLI arguments.
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set working directory.
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set environment variable.
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it.
    pub fn command(self) -> Command {
        let mut cmd = ojp_cmd();
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    /// Run and expect success (exit code 0).
    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code).
    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions.
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    /// Get stdout as string.
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as string.
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout())
            .unwrap_or_else(|e| panic!("stdout is not valid JSON: {e}\nstdout: {}", self.stdout()))
    }

    /// Assert stdout contains substring.
    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    /// Assert stderr contains substring.
    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
/// Uses aggressive polling for fast tests.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

// =============================================================================
// Project
// =============================================================================

/// Temporary test project directory with helper methods.
pub struct Project {
    dir: tempfile::TempDir,
    /// Isolated state directory for this test (`OJP_STATE_DIR`).
    state_dir: tempfile::TempDir,
}

impl Project {
    /// Create an empty project.
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            state_dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Get the repo root path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the isolated state directory path.
    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Run an `ojp` command in this project's isolated state directory.
    pub fn ojp(&self) -> CliBuilder {
        cli()
            .pwd(self.path())
            .env("OJP_STATE_DIR", self.state_path())
    }

    /// Register this project with the daemon.
    pub fn register(&self, project_id: &str) {
        self.ojp()
            .args(&["project", "register", "--id", project_id, "--repo-root"])
            .args(&[self.path().to_str().unwrap()])
            .passes();
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let mut cmd = self.ojp().args(&["daemon", "stop"]).command();
        cmd.stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        let _ = cmd.status();
    }
}
