//! One end-to-end run: discover → classify → resolve → assemble → write.
//!
//! Every step that can fail does so before the output file is touched, so an
//! error never leaves a partial allowlist behind.

use crate::action::{ActionReference, ResolvedAction};
use crate::allowlist::Allowlist;
use crate::classify::{classify, Classification};
use crate::config::Config;
use crate::discovery::{discover, Discovery, SkippedFile};
use crate::error::Result;
use crate::resolve::{resolve_all, RefResolver};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Write,
    DryRun,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub allowlist: Allowlist,
    pub length: usize,
    pub max_length: usize,
    pub first_party: BTreeSet<String>,
    pub third_party: Vec<ResolvedAction>,
    pub unrecognized: Vec<ActionReference>,
    pub references: Vec<ActionReference>,
    pub skipped: Vec<SkippedFile>,
    /// Where the allowlist was written; `None` for a dry run.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// Discovery found nothing; nothing was written.
    NoActions(Discovery),
    Generated(Report),
}

/// Discovery and classification only. Never touches the network.
pub fn scan(root: &Path, config: &Config) -> Result<(Discovery, Classification)> {
    let discovery = discover(&config.workflows_path(root), &config.extensions)?;
    let classification = classify(&discovery.references, config);
    Ok((discovery, classification))
}

pub fn run(
    root: &Path,
    config: &Config,
    resolver: &dyn RefResolver,
    mode: RunMode,
) -> Result<Outcome> {
    let (discovery, classification) = scan(root, config)?;
    if discovery.is_empty() {
        return Ok(Outcome::NoActions(discovery));
    }

    tracing::info!(
        count = classification.third_party.len(),
        "resolving third-party actions"
    );
    let resolved = resolve_all(resolver, &classification.third_party, &config.default_branch)?;

    let max_length = config.effective_max_length();
    let allowlist = Allowlist::assemble(&classification.first_party, &resolved, max_length)?;

    let output = match mode {
        RunMode::Write => {
            let path = config.output_path(root);
            allowlist.write(&path)?;
            tracing::info!(path = %path.display(), "allowlist written");
            Some(path)
        }
        RunMode::DryRun => None,
    };

    Ok(Outcome::Generated(Report {
        length: allowlist.len(),
        max_length,
        allowlist,
        first_party: classification.first_party,
        third_party: resolved,
        unrecognized: classification.unrecognized,
        references: discovery.references,
        skipped: discovery.skipped,
        output,
    }))
}
