use crate::action::{ActionReference, ClassifiedAction};
use crate::config::Config;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Classification (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    /// Owners to allow with a wildcard.
    pub first_party: BTreeSet<String>,
    /// Action path → version label as written in the workflows.
    pub third_party: BTreeMap<String, String>,
    pub unrecognized: Vec<ActionReference>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.first_party.is_empty() && self.third_party.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Decide which bucket one reference falls into. Depends only on the
/// namespace prefix and the presence of an `@version` suffix.
pub fn classify_one(reference: &ActionReference, config: &Config) -> ClassifiedAction {
    // docker://image@digest is a container, not a repository.
    if reference.as_str().contains("://") {
        return ClassifiedAction::Unrecognized;
    }
    if let Some(ns) = reference.namespace() {
        if config.is_first_party(ns) {
            return ClassifiedAction::FirstParty {
                namespace: ns.to_string(),
            };
        }
    }
    match reference.split_version() {
        Some((action, version)) => ClassifiedAction::ThirdParty {
            action: action.to_string(),
            version: version.to_string(),
        },
        None => ClassifiedAction::Unrecognized,
    }
}

/// Partition `references` into first-party owners, third-party actions and
/// leftovers.
///
/// When the same action appears with two labels the later one (in input
/// order) wins.
pub fn classify(references: &[ActionReference], config: &Config) -> Classification {
    let mut out = Classification::default();

    for reference in references {
        match classify_one(reference, config) {
            ClassifiedAction::FirstParty { namespace } => {
                tracing::debug!(action = %reference, "first-party");
                out.first_party.insert(namespace);
            }
            ClassifiedAction::ThirdParty { action, version } => {
                tracing::debug!(action = %reference, "third-party");
                if let Some(previous) = out.third_party.insert(action.clone(), version.clone()) {
                    tracing::warn!(
                        action = %action,
                        previous = %previous,
                        using = %version,
                        "action referenced with more than one version"
                    );
                }
            }
            ClassifiedAction::Unrecognized => {
                tracing::warn!(action = %reference, "unrecognized action reference, ignoring");
                out.unrecognized.push(reference.clone());
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
