use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RelkitError, Result};
use crate::version::{parse_version, Version};

/// Manifest script stages recognized by the pipelines.
pub mod stages {
    pub const BUILD: &str = "build";
    pub const PRE_COMMIT: &str = "precommit";
    pub const POST_COMMIT: &str = "postcommit";
    pub const COMMIT: &str = "commit";
    pub const PUBLISH: &str = "publish";
}

/// Change-tracked wrapper over the JSON project descriptor.
///
/// The manifest is read once at pipeline start and written back at most
/// once per run. A dirty flag is set only when [Manifest::set] stores a
/// value that differs from the current one; [Manifest::flush] writes the
/// file only when that flag is set.
///
/// Values are compared with strict structural equality: a numeric `3`
/// and a string `"3"` are different values.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    data: Map<String, Value>,
    modified: bool,
}

impl Manifest {
    /// Reads and parses the manifest file.
    ///
    /// A missing file or invalid JSON is fatal for every stage that
    /// needs manifest content, so this returns an error rather than
    /// defaulting.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            RelkitError::manifest(format!("cannot read {}: {}", path.display(), e))
        })?;

        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            RelkitError::manifest(format!("{} is not valid JSON: {}", path.display(), e))
        })?;

        let data = match value {
            Value::Object(map) => map,
            _ => {
                return Err(RelkitError::manifest(format!(
                    "{} must contain a JSON object",
                    path.display()
                )))
            }
        };

        Ok(Manifest {
            path: path.to_path_buf(),
            data,
            modified: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any [Manifest::set] stored a changed value since the read.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Stores a value, marking the manifest modified only if the new
    /// value differs from the current one.
    pub fn set(&mut self, key: &str, value: Value) {
        if self.data.get(key) == Some(&value) {
            return;
        }
        self.data.insert(key.to_string(), value);
        self.modified = true;
    }

    /// The version tuple parsed from the `version` field.
    ///
    /// Defaults to `0.0.0` when the field is absent, not a string, or
    /// not a dot-separated 3-part numeric version.
    pub fn version(&self) -> Version {
        self.data
            .get("version")
            .and_then(Value::as_str)
            .and_then(parse_version)
            .unwrap_or_else(Version::zero)
    }

    pub fn set_version(&mut self, version: &Version) {
        self.set("version", Value::String(version.to_string()));
    }

    /// Looks up a script declared for the given stage name.
    pub fn script(&self, stage: &str) -> Option<&str> {
        self.data
            .get("scripts")
            .and_then(Value::as_object)
            .and_then(|scripts| scripts.get(stage))
            .and_then(Value::as_str)
    }

    /// The manifest content as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// The full manifest rendered the way [Manifest::write] stores it.
    pub fn to_pretty_json(&self) -> String {
        let rendered =
            serde_json::to_string_pretty(&self.to_value()).unwrap_or_else(|_| "{}".to_string());
        to_crlf(&rendered)
    }

    /// Writes the manifest unconditionally: 2-space indentation, CRLF
    /// line endings. CRLF keeps the file byte-stable under version
    /// control on the target platform.
    pub fn write(&self) -> Result<()> {
        fs::write(&self.path, self.to_pretty_json())?;
        Ok(())
    }

    /// Writes the manifest only if a field actually changed.
    pub fn flush(&mut self) -> Result<()> {
        if self.modified {
            self.write()?;
            self.modified = false;
        }
        Ok(())
    }
}

fn to_crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}
