//! Git operations abstraction layer
//!
//! The pipeline needs exactly three git operations: staging, committing,
//! and pushing. The [GitClient] trait abstracts them so the pipeline can
//! run against a real repository or a call-recording mock in tests.
//!
//! - [commands::ShellGit]: real implementation shelling out to `git`
//! - [mock::MockGit]: recording implementation for tests

pub mod commands;
pub mod mock;

pub use commands::ShellGit;
pub use mock::MockGit;

use crate::error::Result;

/// One invocation of a git command, as seen by a [GitClient].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Add { pathspec: String },
    Commit { message: String },
    Push {
        remote: String,
        branch: String,
        dry_run: bool,
    },
}

/// Common git operation trait for abstraction
///
/// All implementors must be `Send + Sync`. Methods return
/// [crate::error::Result]; failures carry the underlying git diagnostic
/// text so it reaches the user verbatim.
pub trait GitClient: Send + Sync {
    /// Stage changes matching the pathspec (`git add <pathspec>`).
    fn add(&self, pathspec: &str) -> Result<()>;

    /// Record a commit with the given message
    /// (`git commit --message="<message>"`).
    fn commit(&self, message: &str) -> Result<()>;

    /// Push the branch to the remote
    /// (`git push <remote> <branch> [--dry-run]`).
    fn push(&self, remote: &str, branch: &str, dry_run: bool) -> Result<()>;
}
