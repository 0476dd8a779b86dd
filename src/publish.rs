use std::path::PathBuf;

use crate::delegate::{self, Delegation};
use crate::error::{RelkitError, Result};
use crate::git::GitClient;
use crate::manifest::stages;
use crate::pipeline::{CommitPipeline, PipelineOutcome};
use crate::shell;
use crate::ui;

/// Default external publish command.
pub const DEFAULT_PUBLISH_COMMAND: &str = "yarn publish --non-interactive";
/// Selected by the `--npm` shorthand.
pub const NPM_PUBLISH_COMMAND: &str = "npm publish";
/// Selected by the `--yarn-npm` shorthand.
pub const YARN_NPM_PUBLISH_COMMAND: &str = "yarn npm publish";

/// Wraps the commit pipeline with an optional build step and an
/// external publish command.
pub struct PublishPipeline<G: GitClient> {
    pipeline: CommitPipeline<G>,
    publish_command: String,
}

impl<G: GitClient> PublishPipeline<G> {
    pub fn new(pipeline: CommitPipeline<G>, publish_command: impl Into<String>) -> Self {
        PublishPipeline {
            pipeline,
            publish_command: publish_command.into(),
        }
    }

    pub fn pipeline(&self) -> &CommitPipeline<G> {
        &self.pipeline
    }

    /// Runs the publish sequence, returning the process exit code.
    ///
    /// 1. A manifest `publish` script replaces everything below.
    /// 2. A manifest `build` script runs first; non-zero aborts.
    /// 3. The commit pipeline's `add_commit_push`.
    /// 4. The external publish command, fire-and-forget: its output goes
    ///    straight to the terminal and its exit code is reported, not
    ///    enforced.
    pub fn publish(&mut self, type_name: &str, info: &str) -> Result<i32> {
        let workdir = self.workdir();

        let delegate_args = self.pipeline.options().delegate_args.clone();
        if let Delegation::Delegated(code) = delegate::try_delegate(
            self.pipeline.manifest(),
            stages::PUBLISH,
            &delegate_args,
            &workdir,
        )? {
            return Ok(code);
        }

        if let Some(build) = self.pipeline.manifest().script(stages::BUILD) {
            let build = build.to_string();
            ui::display_status(&format!("Running build script: {}", build));
            let code = shell::run_inherited(&build, &workdir)?;
            if code != 0 {
                return Err(RelkitError::ShellCommandFailed {
                    action: format!("build script: {}", build),
                    stdout: String::new(),
                    stderr: "output was inherited by the terminal".to_string(),
                    code,
                });
            }
        }

        match self.pipeline.add_commit_push(type_name, info)? {
            PipelineOutcome::Delegated(code) if code != 0 => return Ok(code),
            PipelineOutcome::Delegated(_) => {}
            PipelineOutcome::Completed(event) => {
                ui::display_version_change(
                    &event.prev_version.to_string(),
                    &event.version.to_string(),
                );
            }
        }

        ui::display_status(&format!("Publishing: {}", self.publish_command));
        let code = shell::run_inherited(&self.publish_command, &workdir)?;
        if code != 0 {
            ui::display_error(&format!("publish command exited with code {}", code));
        }

        Ok(0)
    }

    fn workdir(&self) -> PathBuf {
        self.pipeline
            .manifest()
            .path()
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
