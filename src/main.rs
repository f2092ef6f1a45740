//! Portfolio Agents - command-line entry point.
//!
//! Validates configuration, then runs the requested agent flow.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use portfolio_agents::config::{Config, ConfigError};
use portfolio_agents::orchestrator::Orchestrator;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "portfolio-agents",
    version,
    about = "Build a portfolio site with AI agents and deploy it to GitHub Pages"
)]
struct Cli {
    /// Project root (overrides WORKSPACE_PATH)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Create the site, then commit, push and configure deployment (default)
    Run,
    /// Only create the site files
    Site,
    /// Commit current changes with a Conventional Commits message
    Commit,
    /// Configure the GitHub Pages deploy pipeline
    Deploy,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_agents=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingEnvVars(missing)) => {
            eprintln!("Required environment variables are not set: {}", missing.join(", "));
            eprintln!("Set them and try again.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };
    let config = match cli.workspace {
        Some(workspace) => config.with_workspace(workspace),
        None => config,
    };
    info!("Workspace: {}", config.workspace_path.display());

    let orchestrator = Orchestrator::new(&config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let report = orchestrator.run().await?;
            println!("Site creator: {}", report.site.output);
            println!("DevOps: {}", report.devops.output);
            println!("Done. Your site is set up for automatic deployment to GitHub Pages.");
            println!("Visit: {}", report.pages_url);
        }
        Command::Site => {
            let run = orchestrator.create_site().await?;
            println!("{}", run.output);
        }
        Command::Commit => {
            let run = orchestrator.commit().await?;
            println!("{}", run.output);
        }
        Command::Deploy => {
            let run = orchestrator.deploy().await?;
            println!("{}", run.output);
        }
    }

    Ok(ExitCode::SUCCESS)
}
