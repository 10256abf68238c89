use crate::error::{ActpinError, Result};
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// GitHub rejects longer values in the "Allow select actions" field.
pub const PLATFORM_MAX_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Run settings, read from `.github/actpin.yaml` when present.
///
/// Relative paths are resolved against the project root by the accessors
/// below, never against the process working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// File extensions (without the dot) treated as workflow files.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Owners whose actions are allowed with an `owner/*` wildcard.
    #[serde(default = "default_first_party")]
    pub first_party: Vec<String>,
    /// Branch queried when a version label matches no tag.
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default = "default_git_host")]
    pub git_host: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_workflows_dir() -> PathBuf {
    PathBuf::from(paths::WORKFLOWS_DIR)
}

fn default_output() -> PathBuf {
    PathBuf::from(paths::ALLOWLIST_FILE)
}

fn default_extensions() -> Vec<String> {
    vec!["yml".to_string(), "yaml".to_string()]
}

fn default_first_party() -> Vec<String> {
    vec!["actions".to_string(), "github".to_string()]
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_git_host() -> String {
    "https://github.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_max_length() -> usize {
    PLATFORM_MAX_LENGTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workflows_dir: default_workflows_dir(),
            output: default_output(),
            extensions: default_extensions(),
            first_party: default_first_party(),
            default_branch: default_branch(),
            git_host: default_git_host(),
            timeout_seconds: default_timeout_seconds(),
            max_length: default_max_length(),
        }
    }
}

impl Config {
    /// Load the config file under `root`, falling back to defaults when it
    /// does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&data).map_err(|e| ActpinError::InvalidConfig {
            path,
            message: e.to_string(),
        })
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    pub fn workflows_path(&self, root: &Path) -> PathBuf {
        paths::resolve_under(root, &self.workflows_dir)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        paths::resolve_under(root, &self.output)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// The allowlist ceiling actually enforced. `max_length` can only lower
    /// GitHub's limit, never raise it.
    pub fn effective_max_length(&self) -> usize {
        self.max_length.min(PLATFORM_MAX_LENGTH)
    }

    pub fn is_first_party(&self, namespace: &str) -> bool {
        self.first_party.iter().any(|ns| ns == namespace)
    }

    /// Check the config for settings that would make a run useless or
    /// produce an allowlist GitHub refuses.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.extensions.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "extensions is empty: no workflow file will ever be read".to_string(),
            });
        }

        for ext in &self.extensions {
            if ext.starts_with('.') {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("extension '{ext}' should be written without a leading dot"),
                });
            }
        }

        if self.first_party.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "first_party is empty: every action will need a pinned SHA".to_string(),
            });
        }

        for ns in &self.first_party {
            if ns.is_empty() || ns.contains('/') {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("first_party entry '{ns}' must be a bare owner name"),
                });
            }
        }

        if self.default_branch.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "default_branch is empty".to_string(),
            });
        }

        if self.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "timeout_seconds is 0: every git query would time out".to_string(),
            });
        }

        if self.max_length > PLATFORM_MAX_LENGTH {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "max_length {} exceeds GitHub's {PLATFORM_MAX_LENGTH}-character field limit; {PLATFORM_MAX_LENGTH} is enforced",
                    self.max_length
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
