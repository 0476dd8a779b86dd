use std::path::PathBuf;

use git2::Repository;

use crate::error::{RelkitError, Result};
use crate::git::GitClient;
use crate::shell;

/// Shell-backed git client.
///
/// The repository is discovered with libgit2 so the pipeline can run
/// from any subdirectory of a work tree, but the commands themselves
/// are shelled out so git's own diagnostics reach the user unchanged.
pub struct ShellGit {
    workdir: PathBuf,
}

impl ShellGit {
    /// Discovers the git repository containing the current directory.
    pub fn discover() -> Result<Self> {
        let repo = Repository::discover(".")?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| RelkitError::config("repository has no work tree (bare repository)"))?
            .to_path_buf();
        Ok(ShellGit { workdir })
    }

    /// Uses an explicit work tree directory, bypassing discovery.
    pub fn at(workdir: impl Into<PathBuf>) -> Self {
        ShellGit {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &PathBuf {
        &self.workdir
    }
}

// git reports progress and success for pushes on stderr. Lines that do
// not look like actual errors are chatter, the exit code still governs.
fn push_stderr_is_noise(line: &str) -> bool {
    let line = line.trim_start();
    !(line.starts_with("fatal:") || line.starts_with("error:") || line.starts_with("! "))
}

// CRLF and hook advice warnings do not indicate a failed commit or add.
fn advice_stderr_is_noise(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("warning:") || line.starts_with("hint:")
}

impl GitClient for ShellGit {
    fn add(&self, pathspec: &str) -> Result<()> {
        shell::run_captured(
            &format!("git add {}", pathspec),
            "git",
            &["add", pathspec],
            &self.workdir,
            Some(&advice_stderr_is_noise),
        )?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let message_arg = format!("--message={}", message);
        shell::run_captured(
            &format!("git commit --message=\"{}\"", message),
            "git",
            &["commit", &message_arg],
            &self.workdir,
            Some(&advice_stderr_is_noise),
        )?;
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, dry_run: bool) -> Result<()> {
        let mut args = vec!["push", remote, branch];
        if dry_run {
            args.push("--dry-run");
        }
        shell::run_captured(
            &format!("git push {} {}", remote, branch),
            "git",
            &args,
            &self.workdir,
            Some(&push_stderr_is_noise),
        )?;
        Ok(())
    }
}
