use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{RelkitError, Result};

/// Captured output of a completed subprocess.
#[derive(Debug, Clone)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; -1 when the process was killed by a signal
    pub code: i32,
}

/// Predicate deciding whether a stderr line is harmless chatter.
///
/// Some tools (notably `git push`) report success on stderr; callers
/// supply a predicate matching the lines they consider non-errors.
pub type StderrIgnore<'a> = &'a dyn Fn(&str) -> bool;

/// Runs a program with captured stdio and inspectable output.
///
/// Fails with [RelkitError::ShellCommandFailed] when the process exits
/// non-zero, or when it wrote anything to stderr that the ignore
/// predicate does not match. The error carries the action name and the
/// captured stdout/stderr so the underlying diagnostic reaches the user
/// verbatim.
pub fn run_captured(
    action: &str,
    program: &str,
    args: &[&str],
    cwd: &Path,
    ignore_stderr: Option<StderrIgnore<'_>>,
) -> Result<ShellOutput> {
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| RelkitError::spawn_failed(action, e))?;

    let result = ShellOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code().unwrap_or(-1),
    };

    let stderr_is_noise = result.stderr.trim().is_empty()
        || ignore_stderr
            .map(|pred| {
                result
                    .stderr
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .all(pred)
            })
            .unwrap_or(false);

    if !output.status.success() || !stderr_is_noise {
        return Err(RelkitError::ShellCommandFailed {
            action: action.to_string(),
            stdout: result.stdout,
            stderr: result.stderr,
            code: result.code,
        });
    }

    Ok(result)
}

/// Runs a shell command line with stdio inherited from the parent,
/// returning the child's exit code.
///
/// Used for delegate scripts and the external publish command, whose
/// output the user observes directly. A non-zero exit is reported via
/// the returned code, never as an error.
pub fn run_inherited(command_line: &str, cwd: &Path) -> Result<i32> {
    let status = Command::new("sh")
        .arg("-c")
        .arg(command_line)
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| RelkitError::spawn_failed(command_line, e))?;

    Ok(status.code().unwrap_or(1))
}

/// Builds a command line from a script and forwarded arguments,
/// quoting any argument containing whitespace.
pub fn command_line(script: &str, args: &[String]) -> String {
    let mut line = script.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&quote_if_needed(arg));
    }
    line
}

fn quote_if_needed(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

impl RelkitError {
    fn spawn_failed(action: &str, e: std::io::Error) -> Self {
        RelkitError::ShellCommandFailed {
            action: action.to_string(),
            stdout: String::new(),
            stderr: format!("failed to spawn: {}", e),
            code: -1,
        }
    }
}
