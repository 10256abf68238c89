//! Map third-party version labels to commit SHAs.
//!
//! Lookups go through [`RefResolver`] so the pipeline can run against an
//! in-memory table in tests. The real implementation shells out to
//! `git ls-remote`, one blocking query at a time, each bounded by the
//! configured timeout.
//!
//! # Resolution order
//! 1. A label that is already a 40-hex SHA is returned unchanged.
//! 2. `refs/tags/<label>` (the peeled commit when the tag is annotated).
//! 3. `refs/heads/<default branch>`.
//!
//! Anything else is an error. Nothing is retried or skipped.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::action::{repository_of, CommitSha, ResolvedAction};
use crate::config::Config;
use crate::error::{ActpinError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Lookup of a single ref in a remote repository.
pub trait RefResolver {
    /// `Ok(None)` means the remote answered but has no such ref.
    fn resolve_ref(&self, repo: &str, ref_name: &str) -> Result<Option<CommitSha>>;
}

// ---------------------------------------------------------------------------
// GitLsRemote
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GitLsRemote {
    /// `None` when git is not on PATH; reported on first query.
    git: Option<PathBuf>,
    host: String,
    timeout: Duration,
}

impl GitLsRemote {
    /// Locate `git` on PATH and take host and timeout from `config`.
    ///
    /// A missing git is only an error once a query is needed, so runs with
    /// nothing but first-party or already-pinned actions work without it.
    pub fn from_config(config: &Config) -> Self {
        Self {
            git: which::which("git").ok(),
            host: config.git_host.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        }
    }

    pub fn with_git(git: impl Into<PathBuf>, host: &str, timeout: Duration) -> Self {
        Self {
            git: Some(git.into()),
            host: host.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn remote_url(&self, repo: &str) -> String {
        format!("{}/{}.git", self.host, repo)
    }

    pub fn git(&self) -> Option<&Path> {
        self.git.as_deref()
    }
}

impl RefResolver for GitLsRemote {
    fn resolve_ref(&self, repo: &str, ref_name: &str) -> Result<Option<CommitSha>> {
        let git = self.git.as_ref().ok_or(ActpinError::GitNotInstalled)?;
        let url = self.remote_url(repo);
        tracing::debug!(%url, %ref_name, "git ls-remote");

        let mut cmd = Command::new(git);
        cmd.args(["ls-remote", &url, ref_name]);
        // Ask for the peeled entry too so annotated tags yield the commit.
        if ref_name.starts_with("refs/tags/") {
            cmd.arg(format!("{ref_name}^{{}}"));
        }
        // Never block on a credential prompt for private or missing repos.
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        let output = match run_with_timeout(&mut cmd, self.timeout) {
            Ok(Some(output)) => output,
            Ok(None) => {
                return Err(ActpinError::GitTimeout {
                    repo: repo.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
            Err(e) => {
                return Err(ActpinError::GitFailed {
                    repo: repo.to_string(),
                    message: e.to_string(),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let hint = stderr.trim().chars().take(500).collect::<String>();
            return Err(ActpinError::GitFailed {
                repo: repo.to_string(),
                message: if hint.is_empty() {
                    format!("exit status {}", output.status)
                } else {
                    hint
                },
            });
        }

        parse_ls_remote(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Run `cmd` to completion, killing it once `timeout` has elapsed.
///
/// Returns `Ok(None)` on timeout. stdin is closed; stdout and stderr are
/// drained on reader threads while the child runs, so output larger than a
/// pipe buffer cannot stall it.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> io::Result<Option<Output>> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn()?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = Instant::now() + timeout;

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            // Readers are not joined: a grandchild may still hold the pipes open.
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Some(Output {
        status,
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
    }))
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(reader: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    reader
        .join()
        .map_err(|_| io::Error::other("output reader thread panicked"))?
}

/// Pick the SHA out of `git ls-remote` output (`<sha>\t<ref>` per line).
///
/// A peeled line (`...^{}`) wins over the tag object line; otherwise the
/// first line is used. Empty output means the ref does not exist.
pub fn parse_ls_remote(stdout: &str) -> Result<Option<CommitSha>> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let Some(first) = lines.first() else {
        return Ok(None);
    };
    let chosen = lines
        .iter()
        .find(|l| l.ends_with("^{}"))
        .unwrap_or(first);

    let sha = chosen.split('\t').next().unwrap_or_default().trim();
    CommitSha::parse(sha).map(Some)
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve one action's version label to a commit SHA.
pub fn resolve_action(
    resolver: &dyn RefResolver,
    action: &str,
    version: &str,
    default_branch: &str,
) -> Result<CommitSha> {
    if CommitSha::is_commit_sha(version) {
        tracing::info!(%action, sha = %version, "already pinned");
        return CommitSha::parse(version);
    }

    let repo = repository_of(action);

    if let Some(sha) = resolver.resolve_ref(repo, &format!("refs/tags/{version}"))? {
        tracing::info!(%action, %version, %sha, "resolved tag");
        return Ok(sha);
    }

    tracing::warn!(%action, %version, branch = %default_branch, "tag not found, trying branch");
    if let Some(sha) = resolver.resolve_ref(repo, &format!("refs/heads/{default_branch}"))? {
        tracing::info!(%action, branch = %default_branch, %sha, "resolved branch head");
        return Ok(sha);
    }

    Err(ActpinError::RefNotFound {
        repo: repo.to_string(),
        version: version.to_string(),
        branch: default_branch.to_string(),
    })
}

/// Resolve every third-party action in key order, stopping at the first
/// failure.
pub fn resolve_all(
    resolver: &dyn RefResolver,
    third_party: &BTreeMap<String, String>,
    default_branch: &str,
) -> Result<Vec<ResolvedAction>> {
    let mut resolved = Vec::with_capacity(third_party.len());
    for (action, version) in third_party {
        let sha = resolve_action(resolver, action, version, default_branch)?;
        resolved.push(ResolvedAction {
            action: action.clone(),
            sha,
            version: version.clone(),
        });
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
