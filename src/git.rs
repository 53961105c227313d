//! Deadline-bounded execution of the system `git` binary.
//!
//! This uses the system git command, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Any authentication configured in ~/.gitconfig
//!
//! The runner is purely mechanical: it spawns git with a working directory
//! and an argument list, captures stdout and stderr separately, and either
//! returns the captured stdout or a raw [`CommandFailure`] for
//! [`crate::error::from_process`] to interpret. It never looks at what the
//! arguments mean.
//!
//! Every invocation is checked against a [`Deadline`]. A command still
//! running when the deadline expires is killed and reported with
//! `timed_out` set, so a wedged remote can never hang a download.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Budget for the whole multi-step sparse-checkout protocol.
pub const PROTOCOL_DEADLINE: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Raw outcome of a failed git invocation, before classification.
#[derive(Debug, Clone)]
pub struct CommandFailure {
    /// The invocation as the user would type it, e.g. `git fetch origin`.
    pub command: String,
    /// Exit code, when the process ran to completion.
    pub status: Option<i32>,
    /// Captured stderr text.
    pub stderr: String,
    /// Whether the process was killed because the deadline expired.
    pub timed_out: bool,
    /// How long the process ran before exiting or being killed.
    pub elapsed: Duration,
}

impl CommandFailure {
    /// Short description for diagnostics: the command and how it ended.
    pub fn describe(&self) -> String {
        match self.status {
            Some(code) => format!("'{}' exited with status {}", self.command, code),
            None if self.timed_out => format!("'{}' was killed at the deadline", self.command),
            None => format!("'{}' did not run", self.command),
        }
    }
}

/// A fixed point in time shared by every step of one download.
///
/// Copies of the deadline hand out whatever budget is left, so a slow
/// early step shrinks the allowance of every later one.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    ends_at: Instant,
}

impl Deadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            ends_at: Instant::now() + budget,
        }
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining(&self) -> Duration {
        self.ends_at.saturating_duration_since(Instant::now())
    }

    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

/// Run a git command in `dir`, returning captured stdout on success.
pub fn run(dir: &Path, args: &[&str], deadline: Deadline) -> Result<String, CommandFailure> {
    run_inner(dir, args, None, deadline)
}

/// Run a git command with the given text piped to its stdin.
pub fn run_with_input(
    dir: &Path,
    args: &[&str],
    input: &str,
    deadline: Deadline,
) -> Result<String, CommandFailure> {
    run_inner(dir, args, Some(input), deadline)
}

fn run_inner(
    dir: &Path,
    args: &[&str],
    input: Option<&str>,
    deadline: Deadline,
) -> Result<String, CommandFailure> {
    let command = format!("git {}", args.join(" "));
    let started = Instant::now();

    let spawned = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            return Err(CommandFailure {
                command,
                status: None,
                stderr: e.to_string(),
                timed_out: false,
                elapsed: started.elapsed(),
            });
        }
    };

    // Write the input before collecting output; dropping the handle closes
    // the pipe so git sees EOF.
    if let (Some(text), Some(mut stdin)) = (input, child.stdin.take()) {
        let _ = stdin.write_all(text.as_bytes());
    }

    // Drain both pipes on their own threads. Reading concurrently with the
    // exit poll avoids deadlocking on a child that fills a pipe buffer.
    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if deadline.expired() {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CommandFailure {
                        command,
                        status: None,
                        stderr: stderr_reader.join().unwrap_or_default(),
                        timed_out: true,
                        elapsed: started.elapsed(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandFailure {
                    command,
                    status: None,
                    stderr: e.to_string(),
                    timed_out: false,
                    elapsed: started.elapsed(),
                });
            }
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    if status.success() {
        Ok(stdout)
    } else {
        Err(CommandFailure {
            command,
            status: status.code(),
            stderr,
            timed_out: false,
            elapsed: started.elapsed(),
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut source) = source {
            let _ = source.read_to_string(&mut text);
        }
        text
    })
}

/// Whether the git binary can be executed at all.
pub fn is_git_installed() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// The installed git version line, e.g. `git version 2.43.0`.
pub fn git_version() -> Option<String> {
    let output = Command::new("git").arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deadline_remaining_counts_down() {
        let deadline = Deadline::new(Duration::from_secs(60));
        assert!(deadline.remaining() <= Duration::from_secs(60));
        assert!(!deadline.expired());
    }

    #[test]
    fn test_deadline_zero_budget_is_expired() {
        let deadline = Deadline::new(Duration::ZERO);
        assert!(deadline.expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_describe_exit_status() {
        let failure = CommandFailure {
            command: "git init".to_string(),
            status: Some(128),
            stderr: String::new(),
            timed_out: false,
            elapsed: Duration::from_millis(5),
        };
        assert_eq!(failure.describe(), "'git init' exited with status 128");
    }

    #[test]
    fn test_describe_timeout() {
        let failure = CommandFailure {
            command: "git fetch origin".to_string(),
            status: None,
            stderr: String::new(),
            timed_out: true,
            elapsed: Duration::from_secs(120),
        };
        assert!(failure.describe().contains("killed at the deadline"));
    }

    // The remaining tests exercise the real git binary.

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_run_captures_stdout() {
        let dir = TempDir::new().unwrap();
        let deadline = Deadline::new(Duration::from_secs(30));
        let output = run(dir.path(), &["--version"], deadline).unwrap();
        assert!(output.starts_with("git version"));
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_run_failure_captures_stderr() {
        let dir = TempDir::new().unwrap();
        let deadline = Deadline::new(Duration::from_secs(30));
        let failure = run(dir.path(), &["definitely-not-a-subcommand"], deadline).unwrap_err();
        assert!(!failure.timed_out);
        assert!(failure.status.is_some());
        assert!(!failure.stderr.is_empty());
        assert!(failure.command.contains("definitely-not-a-subcommand"));
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_run_with_input_pipes_stdin() {
        let dir = TempDir::new().unwrap();
        let deadline = Deadline::new(Duration::from_secs(30));
        let output =
            run_with_input(dir.path(), &["hash-object", "--stdin"], "content\n", deadline).unwrap();
        // A well-formed object id: forty hex characters.
        assert_eq!(output.trim().len(), 40);
        assert!(output.trim().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_git_version_reports_something() {
        let version = git_version().unwrap();
        assert!(version.contains("git"));
    }
}
