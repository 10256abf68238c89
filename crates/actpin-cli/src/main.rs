mod cmd;
mod output;
mod root;

use actpin_core::config::Config;
use anyhow::Context;
use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "actpin",
    about = "Discover GitHub Actions used by workflows and build a SHA-pinned allowlist",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .github/ or .git/)
    #[arg(long, global = true, env = "ACTPIN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log progress to stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every action to a pin and write the allowlist (default)
    Generate {
        /// Print the allowlist without writing the output file
        #[arg(long)]
        dry_run: bool,

        /// Write to this path (relative to the current directory) instead of the configured output
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List discovered action references and how they are classified
    List,

    /// Inspect or validate .github/actpin.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let command = cli.command.unwrap_or(Commands::Generate {
        dry_run: false,
        output: None,
    });

    let result = match command {
        // Init must not parse the existing file.
        Commands::Config {
            subcommand: ConfigSubcommand::Init { force },
        } => cmd::config::init(&root, force),
        command => Config::load(&root)
            .context("failed to load .github/actpin.yaml")
            .and_then(|config| match command {
                Commands::Generate { dry_run, output } => {
                    cmd::generate::run(&root, config, dry_run, output, cli.json)
                }
                Commands::List => cmd::list::run(&root, &config, cli.json),
                Commands::Config { subcommand } => {
                    cmd::config::run(&root, &config, subcommand, cli.json)
                }
            }),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
