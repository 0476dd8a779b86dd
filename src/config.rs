use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{RelkitError, Result};
use crate::publish::DEFAULT_PUBLISH_COMMAND;

/// Represents the complete configuration for relkit.
///
/// Supplies defaults for the pipeline options; every field can be
/// overridden per invocation on the command line.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_pathspec")]
    pub pathspec: String,

    #[serde(default = "default_publish_command")]
    pub publish_command: String,
}

fn default_manifest() -> String {
    "./package.json".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "HEAD".to_string()
}

fn default_pathspec() -> String {
    ".".to_string()
}

fn default_publish_command() -> String {
    DEFAULT_PUBLISH_COMMAND.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            manifest: default_manifest(),
            remote: default_remote(),
            branch: default_branch(),
            pathspec: default_pathspec(),
            publish_command: default_publish_command(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `relkit.toml` in current directory
/// 3. `.relkit.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| RelkitError::config(format!("cannot read {}: {}", path, e)))?
    } else if Path::new("./relkit.toml").exists() {
        fs::read_to_string("./relkit.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".relkit.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config =
        toml::from_str(&config_str).map_err(|e| RelkitError::config(e.to_string()))?;
    Ok(config)
}
