//! Single pipeline steps, run on their own.
//!
//! Each command does exactly what the matching pipeline step does. Commands that
//! talk to the API take credentials from the command line, the environment, or
//! the configuration artifact written by `mint`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use looker_provision::config::CliOverrides;
use looker_provision::credentials;
use looker_provision::probe::LivenessProber;
use looker_provision::project::ProjectId;
use looker_provision::seed::{self, bare_repo_path};
use looker_provision::{connection, models, project};

use super::super::{Cli, CredentialArgs};
use super::{connect_api, load_config, load_descriptor, resolve_credentials};

pub async fn cmd_probe(cli: &Cli, work_dir: &Path, skip_initial_delay: bool) -> Result<()> {
    let config = load_config(
        cli,
        work_dir,
        CliOverrides {
            skip_initial_delay,
            ..Default::default()
        },
    )?;
    let descriptor = load_descriptor(&config)?;

    let delay = config.initial_delay();
    if !delay.is_zero() {
        println!("Waiting {}s before probing...", delay.as_secs());
        tokio::time::sleep(delay).await;
    }
    let prober = LivenessProber::new(
        &descriptor.host_url,
        config.backoff_schedule(),
        config.api_timeout(),
    );
    prober.probe().await?;
    println!("{} is alive", descriptor.host_url);
    Ok(())
}

pub async fn cmd_mint(cli: &Cli, work_dir: &Path) -> Result<()> {
    let config = load_config(cli, work_dir, CliOverrides::default())?;
    let descriptor = load_descriptor(&config)?;

    let creds = credentials::mint(&descriptor, &config.mint_options()).await?;
    println!("client_id = {}", creds.client_id);
    println!("Wrote {}", config.artifact_file().display());
    Ok(())
}

pub async fn cmd_register_connection(
    cli: &Cli,
    work_dir: &Path,
    file: Option<PathBuf>,
    args: &CredentialArgs,
) -> Result<()> {
    let config = load_config(
        cli,
        work_dir,
        CliOverrides {
            connection_file: file,
            ..Default::default()
        },
    )?;
    let descriptor = load_descriptor(&config)?;
    let creds = resolve_credentials(args, &config)?;
    let client = connect_api(&config, &descriptor, &creds).await?;

    let created = connection::register(&client, &config.connection_file()).await?;
    println!("Registered connection '{}'", created.name);
    Ok(())
}

pub async fn cmd_create_project(
    cli: &Cli,
    work_dir: &Path,
    name: Option<String>,
    args: &CredentialArgs,
) -> Result<()> {
    let config = load_config(
        cli,
        work_dir,
        CliOverrides {
            project_name: name,
            ..Default::default()
        },
    )?;
    let descriptor = load_descriptor(&config)?;
    let creds = resolve_credentials(args, &config)?;
    let client = connect_api(&config, &descriptor, &creds).await?;

    let id = project::provision(&client, &config.toml.project.name).await?;
    println!("{}", id);
    Ok(())
}

pub async fn cmd_seed(
    cli: &Cli,
    work_dir: &Path,
    project_id: &str,
    source_repo: Option<String>,
) -> Result<()> {
    let config = load_config(
        cli,
        work_dir,
        CliOverrides {
            source_repo,
            ..Default::default()
        },
    )?;
    let descriptor = load_descriptor(&config)?;
    let shell = config.remote_shell(&descriptor)?;

    let summary = seed::seed(
        &shell,
        &descriptor,
        &ProjectId::new(project_id),
        &config.seed_options(),
    )
    .await
    .with_context(|| format!("Failed to seed project '{}'", project_id))?;
    println!(
        "Pushed {} files to {} (archive sha256 {})",
        summary.file_count, summary.destination, summary.archive_sha256
    );
    Ok(())
}

pub async fn cmd_register_models(
    cli: &Cli,
    work_dir: &Path,
    project_id: &str,
    args: &CredentialArgs,
) -> Result<()> {
    let config = load_config(cli, work_dir, CliOverrides::default())?;
    let descriptor = load_descriptor(&config)?;
    let creds = resolve_credentials(args, &config)?;
    let client = connect_api(&config, &descriptor, &creds).await?;

    let names = models::register_models(&client, &ProjectId::new(project_id)).await?;
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

pub async fn cmd_import_dashboard(
    cli: &Cli,
    work_dir: &Path,
    file: Option<PathBuf>,
    args: &CredentialArgs,
) -> Result<()> {
    let config = load_config(
        cli,
        work_dir,
        CliOverrides {
            dashboard_file: file,
            ..Default::default()
        },
    )?;
    let descriptor = load_descriptor(&config)?;
    let creds = resolve_credentials(args, &config)?;

    config.dashboard_import().run(&descriptor, &creds).await?;
    println!("Imported {}", config.dashboard_file().display());
    Ok(())
}

pub fn cmd_destination(cli: &Cli, work_dir: &Path, project_id: &str) -> Result<()> {
    let config = load_config(cli, work_dir, CliOverrides::default())?;
    let descriptor = load_descriptor(&config)?;
    println!("{}", bare_repo_path(descriptor.shared_storage, project_id));
    Ok(())
}
