use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const WORKFLOWS_DIR: &str = ".github/workflows";

pub const CONFIG_FILE: &str = ".github/actpin.yaml";
pub const ALLOWLIST_FILE: &str = ".github/actions-allowlist.txt";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Join `path` onto `root` unless it is already absolute.
pub fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.github/actpin.yaml")
        );
    }

    #[test]
    fn resolve_under_keeps_absolute_paths() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            resolve_under(root, Path::new("/etc/allow.txt")),
            PathBuf::from("/etc/allow.txt")
        );
        assert_eq!(
            resolve_under(root, Path::new(WORKFLOWS_DIR)),
            PathBuf::from("/tmp/proj/.github/workflows")
        );
    }
}
