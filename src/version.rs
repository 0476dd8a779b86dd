use crate::error::{RelkitError, Result};

/// Represents a semantic version with major, minor, and patch components.
///
/// Positions are indexed by bump level: 0 = major ("release"),
/// 1 = minor ("update"), 2 = patch ("fix").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Creates a new Version with the specified major, minor, and patch components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// The starting version used when a manifest has no parsable version.
    pub fn zero() -> Self {
        Version::new(0, 0, 0)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parses a dot-separated 3-part version string.
///
/// Returns `None` for anything that is not exactly `major.minor.patch`
/// with non-negative integer components. Callers fall back to
/// [Version::zero] for manifests with a missing or malformed version.
pub fn parse_version(s: &str) -> Option<Version> {
    let re = regex::Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").ok()?;
    let captures = re.captures(s.trim())?;

    let major = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let minor = captures.get(2)?.as_str().parse::<u32>().ok()?;
    let patch = captures.get(3)?.as_str().parse::<u32>().ok()?;

    Some(Version::new(major, minor, patch))
}

/// The kind of release a commit represents.
///
/// Each type maps to a bump index and a commit message prefix:
/// release -> (0, "Release"), update -> (1, "Update"), fix -> (2, "").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitType {
    Release,
    Update,
    Fix,
}

/// Names accepted on the command line, in display order.
pub const VALID_COMMIT_TYPES: [&str; 3] = ["fix", "update", "release"];

impl CommitType {
    /// Parse a user-supplied type name. Unrecognized input is a hard error.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "release" => Ok(CommitType::Release),
            "update" => Ok(CommitType::Update),
            "fix" => Ok(CommitType::Fix),
            other => Err(RelkitError::invalid_commit_type(
                other,
                &VALID_COMMIT_TYPES,
            )),
        }
    }

    /// Position in the version tuple this type increments.
    pub fn bump_index(&self) -> usize {
        match self {
            CommitType::Release => 0,
            CommitType::Update => 1,
            CommitType::Fix => 2,
        }
    }

    /// Commit message prefix; empty for fix commits.
    pub fn prefix(&self) -> &'static str {
        match self {
            CommitType::Release => "Release",
            CommitType::Update => "Update",
            CommitType::Fix => "",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommitType::Release => "release",
            CommitType::Update => "update",
            CommitType::Fix => "fix",
        }
    }
}

/// Bumps a version at the given index, returning `(new, previous)`.
///
/// Incrementing position `i` resets every position after `i` to zero and
/// leaves every position before `i` untouched:
/// - index 0: major += 1, minor = 0, patch = 0
/// - index 1: minor += 1, patch = 0
/// - index 2: patch += 1
///
/// Components saturate at `u32::MAX` instead of wrapping.
pub fn bump(version: Version, index: usize) -> (Version, Version) {
    let prev = version;
    let mut next = version;
    match index {
        0 => {
            next.major = next.major.saturating_add(1);
            next.minor = 0;
            next.patch = 0;
        }
        1 => {
            next.minor = next.minor.saturating_add(1);
            next.patch = 0;
        }
        _ => {
            next.patch = next.patch.saturating_add(1);
        }
    }
    (next, prev)
}

/// Composes a commit message from prefix, version string, and free-text info.
///
/// `compose_message("Release", "2.0.0", "")` is `"Release: 2.0.0"`;
/// `compose_message("", "1.0.5", "hotfix")` is `"1.0.5 hotfix"`.
pub fn compose_message(prefix: &str, version: &str, info: &str) -> String {
    let mut message = if prefix.is_empty() {
        version.to_string()
    } else {
        format!("{}: {}", prefix, version)
    };
    if !info.is_empty() {
        message.push(' ');
        message.push_str(info);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_release_resets_lower_positions() {
        let (next, prev) = bump(Version::new(1, 2, 3), 0);
        assert_eq!(next, Version::new(2, 0, 0));
        assert_eq!(prev, Version::new(1, 2, 3));
    }

    #[test]
    fn test_bump_update_keeps_major() {
        let (next, _) = bump(Version::new(1, 2, 3), 1);
        assert_eq!(next, Version::new(1, 3, 0));
    }

    #[test]
    fn test_bump_fix_only_increments_patch() {
        let (next, _) = bump(Version::new(1, 2, 3), 2);
        assert_eq!(next, Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_saturates_at_component_maximum() {
        let (next, _) = bump(Version::new(u32::MAX, 7, 7), 0);
        assert_eq!(next, Version::new(u32::MAX, 0, 0));

        let (next, _) = bump(Version::new(1, 2, u32::MAX), 2);
        assert_eq!(next, Version::new(1, 2, u32::MAX));
    }

    #[test]
    fn test_parse_version_valid() {
        assert_eq!(parse_version("0.4.2"), Some(Version::new(0, 4, 2)));
        assert_eq!(parse_version("10.20.30"), Some(Version::new(10, 20, 30)));
    }

    #[test]
    fn test_parse_version_malformed() {
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("1.2"), None);
        assert_eq!(parse_version("1.2.3.4"), None);
        assert_eq!(parse_version("v1.2.3"), None);
        assert_eq!(parse_version("1.2.x"), None);
    }

    #[test]
    fn test_commit_type_parse() {
        assert_eq!(CommitType::parse("release").unwrap(), CommitType::Release);
        assert_eq!(CommitType::parse("update").unwrap(), CommitType::Update);
        assert_eq!(CommitType::parse("fix").unwrap(), CommitType::Fix);
    }

    #[test]
    fn test_commit_type_parse_unknown_is_error() {
        let err = CommitType::parse("bogus").unwrap_err();
        assert!(err.to_string().contains("bogus"));
        assert!(err.to_string().contains("release"));
    }

    #[test]
    fn test_commit_type_mapping() {
        assert_eq!(CommitType::Release.bump_index(), 0);
        assert_eq!(CommitType::Release.prefix(), "Release");
        assert_eq!(CommitType::Update.bump_index(), 1);
        assert_eq!(CommitType::Update.prefix(), "Update");
        assert_eq!(CommitType::Fix.bump_index(), 2);
        assert_eq!(CommitType::Fix.prefix(), "");
    }

    #[test]
    fn test_compose_message_with_prefix() {
        assert_eq!(compose_message("Release", "2.0.0", ""), "Release: 2.0.0");
    }

    #[test]
    fn test_compose_message_without_prefix() {
        assert_eq!(compose_message("", "1.0.5", "hotfix"), "1.0.5 hotfix");
    }

    #[test]
    fn test_compose_message_with_prefix_and_info() {
        assert_eq!(
            compose_message("Update", "0.5.0", "new parser"),
            "Update: 0.5.0 new parser"
        );
    }

    #[test]
    fn test_version_display_round_trip() {
        let v = Version::new(3, 14, 1);
        assert_eq!(parse_version(&v.to_string()), Some(v));
    }
}
