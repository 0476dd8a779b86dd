use std::sync::Mutex;

use crate::error::{RelkitError, Result};
use crate::git::{GitCall, GitClient};

/// Mock git client for testing without actual git operations.
///
/// Records every call so tests can assert exactly which commands the
/// pipeline issued. Individual operations can be configured to fail.
pub struct MockGit {
    calls: Mutex<Vec<GitCall>>,
    fail_push: bool,
    fail_commit: bool,
}

impl MockGit {
    /// Create a new mock where every operation succeeds
    pub fn new() -> Self {
        MockGit {
            calls: Mutex::new(Vec::new()),
            fail_push: false,
            fail_commit: false,
        }
    }

    /// Make `push` fail with a shell error
    pub fn failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Make `commit` fail with a shell error
    pub fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Snapshot of the recorded calls, in invocation order
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GitCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(action: &str) -> RelkitError {
        RelkitError::ShellCommandFailed {
            action: action.to_string(),
            stdout: String::new(),
            stderr: format!("mock failure for {}", action),
            code: 1,
        }
    }
}

impl Default for MockGit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitClient for MockGit {
    fn add(&self, pathspec: &str) -> Result<()> {
        self.record(GitCall::Add {
            pathspec: pathspec.to_string(),
        });
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(GitCall::Commit {
            message: message.to_string(),
        });
        if self.fail_commit {
            return Err(Self::failure("git commit"));
        }
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, dry_run: bool) -> Result<()> {
        self.record(GitCall::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
            dry_run,
        });
        if self.fail_push {
            return Err(Self::failure("git push"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls_in_order() {
        let git = MockGit::new();
        git.add(".").unwrap();
        git.commit("Update: 0.5.0").unwrap();
        git.push("origin", "HEAD", false).unwrap();

        assert_eq!(
            git.calls(),
            vec![
                GitCall::Add {
                    pathspec: ".".to_string()
                },
                GitCall::Commit {
                    message: "Update: 0.5.0".to_string()
                },
                GitCall::Push {
                    remote: "origin".to_string(),
                    branch: "HEAD".to_string(),
                    dry_run: false,
                },
            ]
        );
    }

    #[test]
    fn test_failing_push_still_records() {
        let git = MockGit::new().failing_push();
        assert!(git.push("origin", "main", false).is_err());
        assert_eq!(git.calls().len(), 1);
    }

    #[test]
    fn test_default_is_empty() {
        let git = MockGit::default();
        assert!(git.calls().is_empty());
    }
}
