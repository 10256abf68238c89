use crate::action::ResolvedAction;
use crate::error::{ActpinError, Result};
use crate::io;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Comma-separated value for GitHub's "Allow select actions" field.
///
/// Always within the length limit it was assembled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Allowlist(String);

impl Allowlist {
    /// `owner/*` wildcards first, then `action@sha` pins ordered by action.
    /// Fails when the result is longer than `max_length` bytes.
    pub fn assemble(
        first_party: &BTreeSet<String>,
        resolved: &[ResolvedAction],
        max_length: usize,
    ) -> Result<Self> {
        let mut pins: Vec<&ResolvedAction> = resolved.iter().collect();
        pins.sort_by(|a, b| a.action.cmp(&b.action));

        let items: Vec<String> = first_party
            .iter()
            .map(|ns| format!("{ns}/*"))
            .chain(pins.iter().map(|r| r.pin()))
            .collect();
        let body = items.join(",");

        if body.len() > max_length {
            return Err(ActpinError::AllowlistTooLong {
                length: body.len(),
                limit: max_length,
            });
        }
        Ok(Self(body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite `path` with the allowlist text, no trailing newline.
    pub fn write(&self, path: &Path) -> Result<()> {
        io::atomic_write(path, self.0.as_bytes())
    }
}

impl fmt::Display for Allowlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::CommitSha;
    use tempfile::TempDir;

    const SHA: &str = "abc123abc123abc123abc123abc123abc123abc1";

    fn resolved(action: &str) -> ResolvedAction {
        ResolvedAction {
            action: action.to_string(),
            sha: CommitSha::parse(SHA).unwrap(),
            version: "v1".to_string(),
        }
    }

    fn namespaces(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn wildcards_then_sorted_pins() {
        let list = Allowlist::assemble(
            &namespaces(&["github", "actions"]),
            &[resolved("zeta/z"), resolved("foo/bar")],
            255,
        )
        .unwrap();
        assert_eq!(
            list.as_str(),
            format!("actions/*,github/*,foo/bar@{SHA},zeta/z@{SHA}")
        );
    }

    #[test]
    fn spec_example_body() {
        let list =
            Allowlist::assemble(&namespaces(&["actions"]), &[resolved("foo/bar")], 255).unwrap();
        assert_eq!(list.as_str(), format!("actions/*,foo/bar@{SHA}"));
    }

    #[test]
    fn exact_limit_is_accepted() {
        let list = Allowlist::assemble(&namespaces(&["actions"]), &[], 9).unwrap();
        assert_eq!(list.len(), 9);
    }

    #[test]
    fn over_limit_is_rejected() {
        let many: Vec<ResolvedAction> = (0..6).map(|i| resolved(&format!("org{i}/a"))).collect();
        let err = Allowlist::assemble(&namespaces(&["actions"]), &many, 255).unwrap_err();
        match err {
            ActpinError::AllowlistTooLong { length, limit } => {
                assert!(length > 255);
                assert_eq!(limit, 255);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_inputs_give_empty_body() {
        let list = Allowlist::assemble(&BTreeSet::new(), &[], 255).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn write_has_no_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/allowlist.txt");
        let list = Allowlist::assemble(&namespaces(&["actions"]), &[], 255).unwrap();
        list.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "actions/*");
    }
}
