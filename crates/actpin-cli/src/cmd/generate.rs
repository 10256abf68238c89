use crate::output::{print_json, print_list};
use actpin_core::{
    config::Config,
    discovery::Discovery,
    pipeline::{self, Outcome, Report, RunMode},
    resolve::GitLsRemote,
};
use anyhow::Context;
use chrono::{Months, NaiveDate, Utc};
use std::path::{Path, PathBuf};

/// How often the allowlist should be regenerated to pick up new actions.
const REVIEW_INTERVAL_MONTHS: u32 = 3;

/// `actpin generate` — build the allowlist and write it to the output path.
///
/// Nothing is written when discovery is empty or any step fails.
pub fn run(
    root: &Path,
    mut config: Config,
    dry_run: bool,
    output: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    // Flag paths are relative to the cwd, not the project root.
    if let Some(path) = output {
        config.output = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()
                .context("failed to read current directory")?
                .join(path)
        };
    }
    let mode = if dry_run {
        RunMode::DryRun
    } else {
        RunMode::Write
    };

    let resolver = GitLsRemote::from_config(&config);
    let outcome = pipeline::run(root, &config, &resolver, mode)
        .context("failed to generate allowlist")?;

    match outcome {
        Outcome::NoActions(discovery) => {
            if json {
                print_json(&serde_json::json!({
                    "status": "no_actions",
                    "workflows_dir": config.workflows_path(root),
                    "directory_missing": discovery.directory_missing,
                }))?;
            } else {
                print_no_actions(root, &config, &discovery);
            }
        }
        Outcome::Generated(report) => {
            if json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn print_no_actions(root: &Path, config: &Config, discovery: &Discovery) {
    if discovery.directory_missing {
        println!(
            "Workflows directory not found: {}",
            config.workflows_path(root).display()
        );
    }
    println!("No actions found");
}

fn print_report(report: &Report) {
    println!(
        "Allowlist ({}/{} characters):",
        report.length, report.max_length
    );
    println!();
    println!("{}", report.allowlist);
    println!();
    println!("Paste into: Settings -> Actions -> General -> Actions permissions -> \"Allow select actions\"");
    match &report.output {
        Some(path) => println!("Saved to: {}", path.display()),
        None => println!("Dry run: nothing written"),
    }

    println!();
    print_list(
        &format!("First-party actions ({}):", report.first_party.len()),
        report.first_party.iter().map(|ns| format!("{ns}/*")),
    );

    println!();
    print_list(
        &format!(
            "Third-party actions ({}, SHA-pinned):",
            report.third_party.len()
        ),
        report
            .third_party
            .iter()
            .map(|r| format!("{}  # {}", r.pin(), r.version)),
    );

    if !report.unrecognized.is_empty() {
        println!();
        print_list(
            &format!(
                "Unrecognized references ({}, not allowlisted):",
                report.unrecognized.len()
            ),
            &report.unrecognized,
        );
    }

    if !report.skipped.is_empty() {
        println!();
        print_list(
            "Skipped workflow files:",
            report
                .skipped
                .iter()
                .map(|s| format!("{} ({})", s.path.display(), s.reason)),
        );
    }

    println!();
    print_guidance(Utc::now().date_naive());
}

fn next_review(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_add_months(Months::new(REVIEW_INTERVAL_MONTHS))
}

fn print_guidance(today: NaiveDate) {
    match next_review(today) {
        Some(date) => println!("Next review: run `actpin generate` again by {date}."),
        None => println!("Next review: run `actpin generate` again in {REVIEW_INTERVAL_MONTHS} months."),
    }
    println!("New actions added to workflows are discovered automatically.");
    println!();
    println!("When adding a third-party action:");
    println!("  1. Run `actpin generate` to refresh the allowlist");
    println!("  2. Update the repository settings with the new allowlist");
    println!("  3. Pin the action to its SHA in the workflow");
}
