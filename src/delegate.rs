use std::path::Path;

use crate::error::Result;
use crate::manifest::Manifest;
use crate::shell;
use crate::ui;

/// Outcome of a delegation check for a pipeline stage.
///
/// A tagged variant instead of a sentinel boolean: `BuiltIn` means the
/// caller proceeds with its own behavior, `Delegated` means a manifest
/// script fully replaced the stage and carries its exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegation {
    BuiltIn,
    Delegated(i32),
}

impl Delegation {
    pub fn is_delegated(&self) -> bool {
        matches!(self, Delegation::Delegated(_))
    }
}

/// Runs the manifest script declared for a stage, if any.
///
/// The script is spawned as a shell command with inherited stdio,
/// forwarding `args` verbatim (quoted when they contain whitespace).
/// Presence of a delegate always means "skip built-in": a non-zero exit
/// is reported through the UI but surfaces only in the returned exit
/// code, never as a pipeline error.
pub fn try_delegate(
    manifest: &Manifest,
    stage: &str,
    args: &[String],
    cwd: &Path,
) -> Result<Delegation> {
    let script = match manifest.script(stage) {
        Some(script) => script.to_string(),
        None => return Ok(Delegation::BuiltIn),
    };

    let command_line = shell::command_line(&script, args);
    ui::display_status(&format!("Running {} script: {}", stage, command_line));

    let code = shell::run_inherited(&command_line, cwd)?;
    if code != 0 {
        ui::display_error(&format!(
            "{} script exited with code {}",
            stage, code
        ));
    }

    Ok(Delegation::Delegated(code))
}
