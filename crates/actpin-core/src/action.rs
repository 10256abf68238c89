//! Data model for action references as they move through a run:
//! raw `uses:` token, classified action, and SHA-resolved action.

use crate::error::{ActpinError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ActionReference
// ---------------------------------------------------------------------------

/// A `uses:` target exactly as written in a workflow, e.g.
/// `actions/checkout@v4` or `docker://alpine:3.19`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionReference(String);

impl ActionReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owner segment before the first `/`, if there is one.
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once('/').map(|(ns, _)| ns)
    }

    /// Split into `(action path, version label)` when the reference has both
    /// an `owner/` prefix and an `@version` suffix.
    pub fn split_version(&self) -> Option<(&str, &str)> {
        if !self.0.contains('/') {
            return None;
        }
        self.0.split_once('@')
    }
}

impl fmt::Display for ActionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// CommitSha
// ---------------------------------------------------------------------------

static SHA_RE: OnceLock<Regex> = OnceLock::new();

fn sha_re() -> &'static Regex {
    SHA_RE.get_or_init(|| Regex::new(r"^[a-f0-9]{40}$").unwrap())
}

/// Full 40-character lowercase hex commit id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitSha(String);

impl CommitSha {
    pub fn parse(s: &str) -> Result<Self> {
        if Self::is_commit_sha(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ActpinError::InvalidCommitSha(s.to_string()))
        }
    }

    pub fn is_commit_sha(s: &str) -> bool {
        sha_re().is_match(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitSha {
    type Error = ActpinError;
    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<CommitSha> for String {
    fn from(sha: CommitSha) -> Self {
        sha.0
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ClassifiedAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifiedAction {
    /// Trusted owner; any version is allowed through `namespace/*`.
    FirstParty { namespace: String },
    /// Must be pinned. `action` is everything before the `@`.
    ThirdParty { action: String, version: String },
    Unrecognized,
}

impl ClassifiedAction {
    pub fn label(&self) -> &'static str {
        match self {
            ClassifiedAction::FirstParty { .. } => "first-party",
            ClassifiedAction::ThirdParty { .. } => "third-party",
            ClassifiedAction::Unrecognized => "unrecognized",
        }
    }
}

/// Repository hosting an action: the first two segments of its path, so
/// `github/codeql-action/init` lives in `github/codeql-action`.
pub fn repository_of(action: &str) -> &str {
    match action.match_indices('/').nth(1) {
        Some((idx, _)) => &action[..idx],
        None => action,
    }
}

// ---------------------------------------------------------------------------
// ResolvedAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAction {
    pub action: String,
    pub sha: CommitSha,
    /// Label the workflows used before pinning (tag, branch, or the SHA itself).
    pub version: String,
}

impl ResolvedAction {
    /// Allowlist entry, `owner/repo@sha`.
    pub fn pin(&self) -> String {
        format!("{}@{}", self.action, self.sha)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "b4ffde65f46336ab88eb53be808477a3936bae11";

    #[test]
    fn namespace_and_version_split() {
        let r = ActionReference::new("docker/build-push-action@v5");
        assert_eq!(r.namespace(), Some("docker"));
        assert_eq!(r.split_version(), Some(("docker/build-push-action", "v5")));
    }

    #[test]
    fn version_label_may_contain_at() {
        let r = ActionReference::new("foo/bar@release@2");
        assert_eq!(r.split_version(), Some(("foo/bar", "release@2")));
    }

    #[test]
    fn no_split_without_owner_or_version() {
        assert_eq!(ActionReference::new("foo/bar").split_version(), None);
        assert_eq!(ActionReference::new("local@v1").split_version(), None);
        assert_eq!(ActionReference::new("local@v1").namespace(), None);
    }

    #[test]
    fn commit_sha_validation() {
        assert!(CommitSha::is_commit_sha(SHA));
        assert!(!CommitSha::is_commit_sha(&SHA.to_uppercase()));
        assert!(!CommitSha::is_commit_sha(&SHA[..39]));
        assert!(!CommitSha::is_commit_sha("v4"));
        assert!(matches!(
            CommitSha::parse("v4"),
            Err(ActpinError::InvalidCommitSha(_))
        ));
    }

    #[test]
    fn commit_sha_deserialize_rejects_short_hash() {
        let err = serde_yaml::from_str::<CommitSha>("abc123");
        assert!(err.is_err());
    }

    #[test]
    fn repository_of_strips_subpath() {
        assert_eq!(repository_of("github/codeql-action/init"), "github/codeql-action");
        assert_eq!(repository_of("foo/bar"), "foo/bar");
        assert_eq!(repository_of("a/b/c/d"), "a/b");
    }

    #[test]
    fn resolved_pin_format() {
        let resolved = ResolvedAction {
            action: "foo/bar".to_string(),
            sha: CommitSha::parse(SHA).unwrap(),
            version: "v1".to_string(),
        };
        assert_eq!(resolved.pin(), format!("foo/bar@{SHA}"));
    }
}
