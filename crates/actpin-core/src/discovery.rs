//! Scan a workflows directory for `uses:` references.
//!
//! Only the line pattern `uses: <ref>` is understood; the rest of the YAML is
//! ignored. Local includes (`./path`) are dropped since they are not external
//! actions.

use crate::action::ActionReference;
use crate::error::Result;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static USES_RE: OnceLock<Regex> = OnceLock::new();

fn uses_re() -> &'static Regex {
    USES_RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*(?:-[ \t]+)?uses:[ \t]*([^\s#]+)").unwrap())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Discovery {
    /// Sorted and deduplicated.
    pub references: Vec<ActionReference>,
    pub files_scanned: usize,
    pub skipped: Vec<SkippedFile>,
    pub directory_missing: bool,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Extract every external `uses:` target from one workflow's text.
pub fn extract_references(content: &str) -> Vec<ActionReference> {
    uses_re()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| strip_quotes(m.as_str()))
        .filter(|r| !r.is_empty() && !r.starts_with("./"))
        .map(ActionReference::new)
        .collect()
}

fn strip_quotes(token: &str) -> &str {
    token.trim_matches(|c| c == '"' || c == '\'')
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want == ext))
}

/// Read every workflow file directly inside `dir` and collect their action
/// references.
///
/// A missing directory is not an error: the result is empty with
/// `directory_missing` set. Unreadable files are logged and skipped.
pub fn discover(dir: &Path, extensions: &[String]) -> Result<Discovery> {
    let mut discovery = Discovery::default();

    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "workflows directory not found");
        discovery.directory_missing = true;
        return Ok(discovery);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();

    let mut found = BTreeSet::new();
    for path in files {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let refs = extract_references(&content);
                tracing::debug!(file = %path.display(), count = refs.len(), "scanned workflow");
                found.extend(refs);
                discovery.files_scanned += 1;
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping unreadable workflow");
                discovery.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    discovery.references = found.into_iter().collect();
    Ok(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec!["yml".to_string(), "yaml".to_string()]
    }

    fn refs(d: &Discovery) -> Vec<&str> {
        d.references.iter().map(|r| r.as_str()).collect()
    }

    #[test]
    fn extracts_plain_and_list_item_forms() {
        let content = "\
jobs:
  build:
    steps:
      - uses: actions/checkout@v4
      - name: setup
        uses: actions/setup-node@v4 # pinned later
      -   uses:   foo/bar@v1.2.0
";
        let found: Vec<String> = extract_references(content)
            .into_iter()
            .map(|r| r.as_str().to_string())
            .collect();
        assert_eq!(
            found,
            vec!["actions/checkout@v4", "actions/setup-node@v4", "foo/bar@v1.2.0"]
        );
    }

    #[test]
    fn skips_local_includes_and_comments() {
        let content = "\
    uses: ./.github/workflows/reusable.yml
    # uses: commented/out@v1
    run: echo uses: not/anchored@v1
    uses: \"quoted/action@v2\"
";
        let found = extract_references(content);
        assert_eq!(found, vec![ActionReference::new("quoted/action@v2")]);
    }

    #[test]
    fn empty_uses_does_not_capture_next_line() {
        let found = extract_references("    uses:\n    with: foo\n");
        assert!(found.is_empty());
    }

    #[test]
    fn discover_sorts_and_dedupes_across_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("ci.yml"),
            "steps:\n  - uses: foo/bar@v1\n  - uses: actions/checkout@v4\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("release.yaml"),
            "steps:\n  - uses: actions/checkout@v4\n  - uses: ./local\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.md"), "uses: ignored/file@v1\n").unwrap();

        let d = discover(dir.path(), &exts()).unwrap();
        assert_eq!(refs(&d), vec!["actions/checkout@v4", "foo/bar@v1"]);
        assert_eq!(d.files_scanned, 2);
        assert!(!d.directory_missing);
    }

    #[test]
    fn discover_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/deep.yml"), "uses: deep/action@v1\n").unwrap();

        let d = discover(dir.path(), &exts()).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn discover_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let d = discover(&dir.path().join("nope"), &exts()).unwrap();
        assert!(d.is_empty());
        assert!(d.directory_missing);
    }

    #[test]
    fn discover_respects_extension_filter() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.yml"), "uses: foo/a@v1\n").unwrap();
        std::fs::write(dir.path().join("b.yaml"), "uses: foo/b@v1\n").unwrap();

        let d = discover(dir.path(), &["yml".to_string()]).unwrap();
        assert_eq!(refs(&d), vec!["foo/a@v1"]);
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.yml"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        std::fs::write(dir.path().join("good.yml"), "uses: foo/bar@v1\n").unwrap();

        let d = discover(dir.path(), &exts()).unwrap();
        assert_eq!(refs(&d), vec!["foo/bar@v1"]);
        assert_eq!(d.skipped.len(), 1);
        assert!(d.skipped[0].path.ends_with("bad.yml"));
    }
}
