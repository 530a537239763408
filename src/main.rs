use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use policy_reviewers::config::ReviewersToml;
use policy_reviewers::logging::init_tracing;

mod cmd;

#[derive(Parser)]
#[command(name = "policy-reviewers")]
#[command(version, about = "Pick random reviewers for pending approval policy rules")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory containing reviewers.toml (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select reviewers for the pending rules of a policy evaluation result
    Select {
        /// Policy evaluation result tree (JSON)
        #[arg(long)]
        result: PathBuf,

        /// Static repository directory (TOML or JSON) instead of the GitHub API
        #[arg(long, conflicts_with_all = ["repo", "pr"])]
        fixture: Option<PathBuf>,

        /// Repository as owner/name
        #[arg(long, requires = "pr")]
        repo: Option<String>,

        /// Pull request number
        #[arg(long, requires = "repo")]
        pr: Option<u64>,

        /// Seed for reproducible selection. Overrides reviewers.toml and the environment.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the selection as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// List the pending rules that need reviewers
    Leaves {
        /// Policy evaluation result tree (JSON)
        #[arg(long)]
        result: PathBuf,

        /// Print the leaves as JSON
        #[arg(long)]
        json: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default reviewers.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let toml = ReviewersToml::load_or_default(&project_dir)?;
    init_tracing(&toml.logging, cli.verbose)?;

    match &cli.command {
        Commands::Select {
            result,
            fixture,
            repo,
            pr,
            seed,
            json,
        } => {
            let source = cmd::Source::from_args(fixture.as_deref(), repo.as_deref(), *pr)?;
            cmd::cmd_select(&project_dir, result, source, *seed, *json).await?;
        }
        Commands::Leaves { result, json } => cmd::cmd_leaves(result, *json)?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
