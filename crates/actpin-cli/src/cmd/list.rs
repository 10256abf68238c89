use crate::output::{print_json, print_table};
use actpin_core::{
    action::ClassifiedAction,
    classify::classify_one,
    config::Config,
    pipeline,
};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Row<'a> {
    reference: &'a str,
    #[serde(flatten)]
    classified: ClassifiedAction,
}

/// `actpin list`: show what discovery found without touching the network.
pub fn run(root: &Path, config: &Config, json: bool) -> anyhow::Result<()> {
    let (discovery, _) = pipeline::scan(root, config).context("failed to scan workflows")?;

    let rows: Vec<Row> = discovery
        .references
        .iter()
        .map(|r| Row {
            reference: r.as_str(),
            classified: classify_one(r, config),
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    if discovery.directory_missing {
        println!(
            "Workflows directory not found: {}",
            config.workflows_path(root).display()
        );
    }
    if rows.is_empty() {
        println!("No actions found");
        return Ok(());
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let (kind, entry) = match &row.classified {
                ClassifiedAction::FirstParty { namespace } => {
                    (row.classified.label(), format!("{namespace}/*"))
                }
                ClassifiedAction::ThirdParty { action, version } => {
                    (row.classified.label(), format!("{action} ({version})"))
                }
                ClassifiedAction::Unrecognized => (row.classified.label(), "-".to_string()),
            };
            vec![row.reference.to_string(), kind.to_string(), entry]
        })
        .collect();
    print_table(&["REFERENCE", "KIND", "ALLOWLIST ENTRY"], &table);

    println!();
    println!(
        "{} references in {} workflow file(s)",
        rows.len(),
        discovery.files_scanned
    );
    Ok(())
}
