use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use looker_provision::logging::{self, LogOptions};

mod cmd;

#[derive(Parser)]
#[command(name = "looker-provision")]
#[command(
    version,
    about = "Unattended bring-up of a fresh Looker instance: mint API keys, register a connection, seed a project and import a dashboard"
)]
pub struct Cli {
    /// Path to provision.toml (defaults to ./provision.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit console logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also write JSON logs to a daily-rolled file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Directory relative paths are resolved against (defaults to the current directory)
    #[arg(long, global = true)]
    pub work_dir: Option<PathBuf>,

    /// Infrastructure outputs file (overrides [instance].outputs_file)
    #[arg(long, global = true)]
    pub outputs: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// API credentials for commands that run after minting.
///
/// Falls back to the configuration artifact written by `mint`.
#[derive(Args, Clone, Debug, Default)]
pub struct CredentialArgs {
    #[arg(long, env = "LOOKER_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "LOOKER_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full bring-up pipeline
    Run {
        /// Start probing immediately instead of waiting [probe].initial_delay_secs
        #[arg(long)]
        skip_initial_delay: bool,

        /// Project name (overrides [project].name)
        #[arg(long)]
        project: Option<String>,

        /// Source repository URL (overrides [source].repo_url)
        #[arg(long)]
        source_repo: Option<String>,

        /// Dashboard definition file (overrides [dashboard].file)
        #[arg(long)]
        dashboard: Option<PathBuf>,
    },
    /// Wait until the instance answers on /alive
    Probe {
        #[arg(long)]
        skip_initial_delay: bool,
    },
    /// Mint an API key pair through the web UI and write the configuration artifact
    Mint,
    /// Register the database connection from the connection file
    RegisterConnection {
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Create the project and back it with a bare repository
    CreateProject {
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Push the source repository's files into the project's bare repository
    Seed {
        #[arg(long)]
        project_id: String,

        #[arg(long)]
        source_repo: Option<String>,
    },
    /// Register one model per model file in the project
    RegisterModels {
        #[arg(long)]
        project_id: String,

        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Import the dashboard definition with gzr
    ImportDashboard {
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Print the bare repository path the seeder would push to
    Destination {
        #[arg(long)]
        project_id: String,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default provision.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let work_dir = match cli.work_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let _log_guard = logging::init(&LogOptions {
        verbose: cli.verbose,
        json: cli.log_json,
        log_dir: cli.log_dir.clone(),
    });

    match &cli.command {
        Commands::Run {
            skip_initial_delay,
            project,
            source_repo,
            dashboard,
        } => {
            cmd::cmd_run(
                &cli,
                &work_dir,
                *skip_initial_delay,
                project.clone(),
                source_repo.clone(),
                dashboard.clone(),
            )
            .await?
        }
        Commands::Probe { skip_initial_delay } => {
            cmd::cmd_probe(&cli, &work_dir, *skip_initial_delay).await?
        }
        Commands::Mint => cmd::cmd_mint(&cli, &work_dir).await?,
        Commands::RegisterConnection { file, credentials } => {
            cmd::cmd_register_connection(&cli, &work_dir, file.clone(), credentials).await?
        }
        Commands::CreateProject { name, credentials } => {
            cmd::cmd_create_project(&cli, &work_dir, name.clone(), credentials).await?
        }
        Commands::Seed {
            project_id,
            source_repo,
        } => cmd::cmd_seed(&cli, &work_dir, project_id, source_repo.clone()).await?,
        Commands::RegisterModels {
            project_id,
            credentials,
        } => cmd::cmd_register_models(&cli, &work_dir, project_id, credentials).await?,
        Commands::ImportDashboard { file, credentials } => {
            cmd::cmd_import_dashboard(&cli, &work_dir, file.clone(), credentials).await?
        }
        Commands::Destination { project_id } => {
            cmd::cmd_destination(&cli, &work_dir, project_id)?
        }
        Commands::Config { command } => cmd::cmd_config(&cli, &work_dir, command.clone())?,
    }

    Ok(())
}
