use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActpinError {
    #[error("git not found on PATH: install git to resolve action SHAs")]
    GitNotInstalled,

    #[error("git ls-remote for {repo} timed out after {seconds}s")]
    GitTimeout { repo: String, seconds: u64 },

    #[error("git ls-remote for {repo} failed: {message}")]
    GitFailed { repo: String, message: String },

    #[error("could not resolve {repo}@{version}: no matching tag and no '{branch}' branch")]
    RefNotFound {
        repo: String,
        version: String,
        branch: String,
    },

    #[error("invalid commit SHA '{0}': expected 40 lowercase hex characters")]
    InvalidCommitSha(String),

    #[error("allowlist too long: {length} > {limit} characters, reduce the number of third-party actions")]
    AllowlistTooLong { length: usize, limit: usize },

    #[error("invalid config {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ActpinError>;
