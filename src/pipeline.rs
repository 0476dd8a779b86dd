use std::path::PathBuf;

use serde_json::Value;

use crate::delegate::{self, Delegation};
use crate::error::Result;
use crate::git::GitClient;
use crate::manifest::{stages, Manifest};
use crate::version::{bump, compose_message, CommitType, Version};

/// Immutable snapshot of one commit run.
///
/// Built once per run after the version bump is computed, passed to
/// pre- and post-commit hooks, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CommitEvent {
    pub version: Version,
    pub prev_version: Version,
    pub message: String,
    pub commit_type: CommitType,
    pub info: String,
    /// Resolved manifest content with the version bump applied,
    /// exactly as it will be committed.
    pub manifest: Value,
}

/// In-process lifecycle callback, invoked synchronously in
/// registration order. A failing hook aborts the pipeline.
pub type Hook = Box<dyn Fn(&CommitEvent) -> Result<()> + Send + Sync>;

/// Options controlling the commit pipeline.
#[derive(Debug, Clone)]
pub struct CommitOptions {
    /// Pathspec passed to `git add`
    pub pathspec: String,
    /// Remote used by `add_commit_push`
    pub remote: String,
    /// Branch used by `add_commit_push`
    pub branch: String,
    /// Pass `--dry-run` to `git push`
    pub dry_run: bool,
    /// CLI arguments forwarded verbatim to delegate scripts
    pub delegate_args: Vec<String>,
}

impl Default for CommitOptions {
    fn default() -> Self {
        CommitOptions {
            pathspec: ".".to_string(),
            remote: "origin".to_string(),
            branch: "HEAD".to_string(),
            dry_run: false,
            delegate_args: Vec::new(),
        }
    }
}

/// Outcome of a pipeline entrypoint.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// A manifest script replaced the whole pipeline; carries its exit code.
    Delegated(i32),
    /// The built-in pipeline ran to completion.
    Completed(CommitEvent),
}

/// Progress of the built-in commit sequence, in order.
///
/// `Aborted` is reached from any point when a stage fails; the stage
/// already completed is observable (a failed push leaves the repository
/// committed but unpushed, which is a visible, accepted partial state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    PreCommit,
    Staged,
    Committed,
    PostCommit,
    Pushed,
    Done,
    Aborted,
}

/// Orchestrates the version-bump commit sequence:
/// pre-commit hook, manifest write, stage, commit, post-commit hook,
/// and (via [CommitPipeline::add_commit_push]) push.
pub struct CommitPipeline<G: GitClient> {
    manifest: Manifest,
    git: G,
    options: CommitOptions,
    workdir: PathBuf,
    pre_commit: Vec<Hook>,
    post_commit: Vec<Hook>,
    state: PipelineState,
}

impl<G: GitClient> CommitPipeline<G> {
    pub fn new(manifest: Manifest, git: G, options: CommitOptions) -> Self {
        let workdir = manifest
            .path()
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        CommitPipeline {
            manifest,
            git,
            options,
            workdir,
            pre_commit: Vec::new(),
            post_commit: Vec::new(),
            state: PipelineState::Idle,
        }
    }

    /// Register an in-process pre-commit callback.
    ///
    /// Callbacks run in registration order, but only when the manifest
    /// does not declare a `precommit` script: a declared script takes
    /// over the stage entirely.
    pub fn on_pre_commit(&mut self, hook: Hook) {
        self.pre_commit.push(hook);
    }

    /// Register an in-process post-commit callback; see [Self::on_pre_commit].
    pub fn on_post_commit(&mut self, hook: Hook) {
        self.post_commit.push(hook);
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn options(&self) -> &CommitOptions {
        &self.options
    }

    pub fn git(&self) -> &G {
        &self.git
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Bump, hook, stage, and commit, without pushing.
    pub fn commit(&mut self, type_name: &str, info: &str) -> Result<PipelineOutcome> {
        self.run(type_name, info, false)
    }

    /// Full sequence including `git push <remote> <branch>`.
    pub fn add_commit_push(&mut self, type_name: &str, info: &str) -> Result<PipelineOutcome> {
        self.run(type_name, info, true)
    }

    fn run(&mut self, type_name: &str, info: &str, push: bool) -> Result<PipelineOutcome> {
        // A manifest `commit` script fully replaces the built-in pipeline.
        if let Delegation::Delegated(code) = delegate::try_delegate(
            &self.manifest,
            stages::COMMIT,
            &self.options.delegate_args,
            &self.workdir,
        )? {
            return Ok(PipelineOutcome::Delegated(code));
        }

        match self.run_built_in(type_name, info, push) {
            Ok(event) => {
                self.state = PipelineState::Done;
                Ok(PipelineOutcome::Completed(event))
            }
            Err(e) => {
                self.state = PipelineState::Aborted;
                Err(e)
            }
        }
    }

    fn run_built_in(&mut self, type_name: &str, info: &str, push: bool) -> Result<CommitEvent> {
        let commit_type = CommitType::parse(type_name)?;

        let (version, prev_version) = bump(self.manifest.version(), commit_type.bump_index());
        let message = compose_message(commit_type.prefix(), &version.to_string(), info);

        // The bump is applied in memory before the event is built, so
        // hooks see the manifest as it will be committed. Nothing
        // reaches disk until after the pre-commit stage.
        self.manifest.set_version(&version);

        let event = CommitEvent {
            version,
            prev_version,
            message,
            commit_type,
            info: info.to_string(),
            manifest: self.manifest.to_value(),
        };

        self.state = PipelineState::PreCommit;
        self.run_hook_stage(stages::PRE_COMMIT, &event)?;

        // Written before staging so the bump lands inside the commit.
        self.manifest.flush()?;

        self.git.add(&self.options.pathspec)?;
        self.state = PipelineState::Staged;

        self.git.commit(&event.message)?;
        self.state = PipelineState::Committed;

        self.run_hook_stage(stages::POST_COMMIT, &event)?;
        self.state = PipelineState::PostCommit;

        if push {
            self.git.push(
                &self.options.remote,
                &self.options.branch,
                self.options.dry_run,
            )?;
            self.state = PipelineState::Pushed;
        }

        Ok(event)
    }

    /// Runs one hook stage: a declared manifest script takes the stage
    /// over; otherwise the registered callbacks run in order.
    fn run_hook_stage(&self, stage: &str, event: &CommitEvent) -> Result<()> {
        let outcome =
            delegate::try_delegate(&self.manifest, stage, &self.options.delegate_args, &self.workdir)?;
        if outcome.is_delegated() {
            return Ok(());
        }

        let hooks = match stage {
            stages::PRE_COMMIT => &self.pre_commit,
            _ => &self.post_commit,
        };
        for hook in hooks {
            hook(event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{GitCall, MockGit};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn pipeline_with(
        content: &str,
    ) -> (tempfile::TempDir, CommitPipeline<MockGit>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, content).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        let pipeline = CommitPipeline::new(manifest, MockGit::new(), CommitOptions::default());
        (dir, pipeline)
    }

    #[test]
    fn test_commit_bumps_version_and_issues_add_and_commit() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"version":"0.4.2","scripts":{}}"#);

        let outcome = pipeline.commit("update", "").unwrap();
        let event = match outcome {
            PipelineOutcome::Completed(event) => event,
            PipelineOutcome::Delegated(_) => panic!("no delegate configured"),
        };

        assert_eq!(event.version, Version::new(0, 5, 0));
        assert_eq!(event.prev_version, Version::new(0, 4, 2));
        assert_eq!(event.message, "Update: 0.5.0");
        assert_eq!(pipeline.manifest().version(), Version::new(0, 5, 0));
        assert_eq!(pipeline.state(), PipelineState::Done);

        let calls = pipeline.git().calls();
        assert_eq!(
            calls,
            vec![
                GitCall::Add {
                    pathspec: ".".to_string()
                },
                GitCall::Commit {
                    message: "Update: 0.5.0".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_commit_does_not_push() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"version":"1.0.0"}"#);
        pipeline.commit("fix", "").unwrap();

        let pushes = pipeline
            .git()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, GitCall::Push { .. }))
            .count();
        assert_eq!(pushes, 0);
    }

    #[test]
    fn test_add_commit_push_pushes_default_remote_and_branch() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"version":"1.0.0"}"#);
        pipeline.add_commit_push("release", "").unwrap();

        let calls = pipeline.git().calls();
        assert_eq!(
            calls.last(),
            Some(&GitCall::Push {
                remote: "origin".to_string(),
                branch: "HEAD".to_string(),
                dry_run: false,
            })
        );
        assert_eq!(pipeline.state(), PipelineState::Pushed);
    }

    #[test]
    fn test_fix_commit_message_has_no_prefix() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"version":"1.0.5"}"#);
        let outcome = pipeline.commit("fix", "hotfix").unwrap();
        match outcome {
            PipelineOutcome::Completed(event) => {
                assert_eq!(event.message, "1.0.6 hotfix")
            }
            PipelineOutcome::Delegated(_) => panic!("no delegate configured"),
        }
    }

    #[test]
    fn test_unknown_type_fails_without_touching_anything() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"version":"1.0.0"}"#);
        let err = pipeline.commit("bogus", "").unwrap_err();

        assert!(err.to_string().contains("bogus"));
        assert_eq!(pipeline.state(), PipelineState::Aborted);
        assert!(!pipeline.manifest().is_modified());
        assert_eq!(pipeline.manifest().version(), Version::new(1, 0, 0));
        assert!(pipeline.git().calls().is_empty());
    }

    #[test]
    fn test_commit_script_delegates_and_skips_git() {
        let (_dir, mut pipeline) =
            pipeline_with(r#"{"version":"1.0.0","scripts":{"commit":"exit 3"}}"#);

        let outcome = pipeline.commit("update", "").unwrap();
        assert!(matches!(outcome, PipelineOutcome::Delegated(3)));
        assert!(pipeline.git().calls().is_empty());
        assert_eq!(pipeline.manifest().version(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_missing_version_defaults_to_zero() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"name":"demo"}"#);
        let outcome = pipeline.commit("fix", "").unwrap();
        match outcome {
            PipelineOutcome::Completed(event) => {
                assert_eq!(event.prev_version, Version::zero());
                assert_eq!(event.version, Version::new(0, 0, 1));
            }
            PipelineOutcome::Delegated(_) => panic!("no delegate configured"),
        }
    }

    #[test]
    fn test_version_is_persisted_before_commit() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"version":"2.1.9"}"#);
        pipeline.commit("update", "").unwrap();

        let on_disk = Manifest::load(pipeline.manifest().path()).unwrap();
        assert_eq!(on_disk.version(), Version::new(2, 2, 0));
    }

    #[test]
    fn test_hooks_run_in_order_around_the_commit() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"version":"1.0.0"}"#);

        let order = Arc::new(AtomicUsize::new(0));
        let pre_seen = Arc::new(AtomicUsize::new(0));
        let post_seen = Arc::new(AtomicUsize::new(0));

        let (order_pre, pre) = (order.clone(), pre_seen.clone());
        pipeline.on_pre_commit(Box::new(move |event| {
            assert_eq!(event.version, Version::new(1, 0, 1));
            pre.store(order_pre.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
            Ok(())
        }));

        let (order_post, post) = (order.clone(), post_seen.clone());
        pipeline.on_post_commit(Box::new(move |_| {
            post.store(order_post.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
            Ok(())
        }));

        pipeline.commit("fix", "").unwrap();
        assert_eq!(pre_seen.load(Ordering::SeqCst), 1);
        assert_eq!(post_seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_hooks_observe_resolved_manifest_content() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"name":"demo","version":"1.0.0"}"#);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_hook = seen.clone();
        pipeline.on_pre_commit(Box::new(move |event| {
            assert_eq!(event.manifest["name"], "demo");
            assert_eq!(event.manifest["version"], "1.0.1");
            seen_in_hook.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        let outcome = pipeline.commit("fix", "").unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        match outcome {
            PipelineOutcome::Completed(event) => {
                assert_eq!(event.manifest["version"], "1.0.1");
            }
            PipelineOutcome::Delegated(_) => panic!("no delegate configured"),
        }
    }

    #[test]
    fn test_failing_pre_commit_hook_aborts_before_git() {
        let (_dir, mut pipeline) = pipeline_with(r#"{"version":"1.0.0"}"#);
        pipeline.on_pre_commit(Box::new(|_| {
            Err(crate::error::RelkitError::config("hook rejected the release"))
        }));

        assert!(pipeline.commit("fix", "").is_err());
        assert_eq!(pipeline.state(), PipelineState::Aborted);
        assert!(pipeline.git().calls().is_empty());

        // The version bump never reached the file either.
        let on_disk = Manifest::load(pipeline.manifest().path()).unwrap();
        assert_eq!(on_disk.version(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_failed_push_leaves_repository_committed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"version":"1.0.0"}"#).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        let mut pipeline = CommitPipeline::new(
            manifest,
            MockGit::new().failing_push(),
            CommitOptions::default(),
        );

        assert!(pipeline.add_commit_push("fix", "").is_err());
        assert_eq!(pipeline.state(), PipelineState::Aborted);

        // Commit already happened; the partial state is visible, not rolled back.
        let calls = pipeline.git().calls();
        assert!(calls
            .iter()
            .any(|call| matches!(call, GitCall::Commit { .. })));
        let on_disk = Manifest::load(&path).unwrap();
        assert_eq!(on_disk.version(), Version::new(1, 0, 1));
    }

    #[test]
    fn test_precommit_script_takes_over_in_process_hooks() {
        let (_dir, mut pipeline) =
            pipeline_with(r#"{"version":"1.0.0","scripts":{"precommit":"true"}}"#);

        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_hook = ran.clone();
        pipeline.on_pre_commit(Box::new(move |_| {
            ran_in_hook.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        pipeline.commit("fix", "").unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_push_dry_run_flag_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"version":"1.0.0"}"#).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        let options = CommitOptions {
            dry_run: true,
            ..CommitOptions::default()
        };
        let mut pipeline = CommitPipeline::new(manifest, MockGit::new(), options);

        pipeline.add_commit_push("fix", "").unwrap();
        assert_eq!(
            pipeline.git().calls().last(),
            Some(&GitCall::Push {
                remote: "origin".to_string(),
                branch: "HEAD".to_string(),
                dry_run: true,
            })
        );
    }
}
