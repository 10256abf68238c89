use std::path::{Path, PathBuf};

/// Resolve the project root whose workflows are scanned.
///
/// Priority:
/// 1. `--root` flag / `ACTPIN_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.github/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, ".github")
        .or_else(|| find_upward(&cwd, ".git"))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_github_dir_from_subdir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".github/workflows")).unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_upward(&subdir, ".github"), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn github_dir_preferred_over_git_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("service");
        std::fs::create_dir_all(nested.join(".github")).unwrap();

        assert_eq!(find_upward(&nested, ".github"), Some(nested.clone()));
        assert_eq!(find_upward(&nested, ".git"), Some(dir.path().to_path_buf()));
    }
}
