use anyhow::Result;
use clap::Parser;

use relkit::config;
use relkit::git::ShellGit;
use relkit::manifest::Manifest;
use relkit::pipeline::{CommitOptions, CommitPipeline, PipelineOutcome};
use relkit::publish::{PublishPipeline, NPM_PUBLISH_COMMAND, YARN_NPM_PUBLISH_COMMAND};
use relkit::ui;

#[derive(clap::Parser)]
#[command(
    name = "relkit",
    about = "Manifest-driven git release workflows: version-bumping commits and publish pipelines"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path", global = true)]
    config: Option<String>,

    #[arg(short, long, help = "Manifest file path", global = true)]
    manifest: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Bump the manifest version, commit, and push
    Commit {
        /// Commit type: fix, update, or release (defaults to fix)
        commit_type: Option<String>,

        /// Free text appended to the commit message
        info: Vec<String>,

        #[arg(long, help = "Git remote to push to")]
        remote: Option<String>,

        #[arg(long, help = "Branch to push")]
        branch: Option<String>,

        #[arg(long, help = "Pathspec passed to git add")]
        pathspec: Option<String>,

        #[arg(long, help = "Pass --dry-run to git push")]
        dry_run: bool,

        #[arg(long, help = "Commit without pushing")]
        no_push: bool,
    },

    /// Run the build script, commit, push, and the external publish command
    Publish {
        /// Commit type: fix, update, or release (defaults to fix)
        commit_type: Option<String>,

        /// Free text appended to the commit message
        info: Vec<String>,

        #[arg(long, help = "Publish with 'npm publish'")]
        npm: bool,

        #[arg(long = "yarn-npm", help = "Publish with 'yarn npm publish'")]
        yarn_npm: bool,

        #[arg(long, help = "Custom publish command")]
        publish_cmd: Option<String>,

        #[arg(long, help = "Pass --dry-run to git push")]
        dry_run: bool,
    },

    /// Print the resolved manifest JSON
    Package,
}

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    let config = config::load_config(args.config.as_deref())?;
    let manifest_path = args.manifest.clone().unwrap_or_else(|| config.manifest.clone());

    match args.command {
        Command::Commit {
            commit_type,
            info,
            remote,
            branch,
            pathspec,
            dry_run,
            no_push,
        } => {
            let manifest = Manifest::load(&manifest_path)?;
            let git = ShellGit::discover()?;
            let options = CommitOptions {
                pathspec: pathspec.unwrap_or(config.pathspec),
                remote: remote.unwrap_or(config.remote),
                branch: branch.unwrap_or(config.branch),
                dry_run,
                delegate_args: delegate_args(commit_type.as_deref(), &info),
            };
            let mut pipeline = CommitPipeline::new(manifest, git, options);

            let commit_type = commit_type.as_deref().unwrap_or("fix");
            let info = info.join(" ");
            let outcome = if no_push {
                pipeline.commit(commit_type, &info)?
            } else {
                pipeline.add_commit_push(commit_type, &info)?
            };

            match outcome {
                PipelineOutcome::Delegated(code) => Ok(code),
                PipelineOutcome::Completed(event) => {
                    ui::display_version_change(
                        &event.prev_version.to_string(),
                        &event.version.to_string(),
                    );
                    ui::display_success(&format!("Committed: {}", event.message));
                    Ok(0)
                }
            }
        }

        Command::Publish {
            commit_type,
            info,
            npm,
            yarn_npm,
            publish_cmd,
            dry_run,
        } => {
            let manifest = Manifest::load(&manifest_path)?;
            let git = ShellGit::discover()?;
            let options = CommitOptions {
                pathspec: config.pathspec,
                remote: config.remote,
                branch: config.branch,
                dry_run,
                delegate_args: delegate_args(commit_type.as_deref(), &info),
            };
            let pipeline = CommitPipeline::new(manifest, git, options);

            let publish_command = if let Some(cmd) = publish_cmd {
                cmd
            } else if npm {
                NPM_PUBLISH_COMMAND.to_string()
            } else if yarn_npm {
                YARN_NPM_PUBLISH_COMMAND.to_string()
            } else {
                config.publish_command
            };

            let mut publish = PublishPipeline::new(pipeline, publish_command);
            let code =
                publish.publish(commit_type.as_deref().unwrap_or("fix"), &info.join(" "))?;
            Ok(code)
        }

        Command::Package => {
            let manifest = Manifest::load(&manifest_path)?;
            println!("{}", manifest.to_pretty_json());
            Ok(0)
        }
    }
}

/// The CLI arguments a delegate script receives, verbatim: only what
/// the user typed, never a synthesized default type.
fn delegate_args(commit_type: Option<&str>, info: &[String]) -> Vec<String> {
    let mut args: Vec<String> = commit_type.map(str::to_string).into_iter().collect();
    args.extend(info.iter().cloned());
    args
}

#[cfg(test)]
mod tests {
    use super::delegate_args;

    #[test]
    fn test_delegate_args_forward_only_what_was_typed() {
        assert!(delegate_args(None, &[]).is_empty());
        assert_eq!(
            delegate_args(Some("update"), &["new".to_string(), "parser".to_string()]),
            vec!["update", "new", "parser"]
        );
    }
}
