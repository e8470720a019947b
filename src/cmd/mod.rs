//! CLI command implementations.
//!
//! | Module   | Commands handled                                                   |
//! |----------|--------------------------------------------------------------------|
//! | `run`    | `Run`                                                              |
//! | `steps`  | `Probe`, `Mint`, `RegisterConnection`, `CreateProject`, `Seed`,    |
//! |          | `RegisterModels`, `ImportDashboard`, `Destination`                 |
//! | `config` | `Config`                                                           |

pub mod config;
pub mod run;
pub mod steps;

pub use config::cmd_config;
pub use run::cmd_run;
pub use steps::{
    cmd_create_project, cmd_destination, cmd_import_dashboard, cmd_mint, cmd_probe,
    cmd_register_connection, cmd_register_models, cmd_seed,
};

use anyhow::{Context, Result};
use std::path::Path;

use looker_provision::api::LookerClient;
use looker_provision::config::{CliOverrides, ProvisionConfig};
use looker_provision::credentials::{ApiCredentials, read_artifact};
use looker_provision::instance::InstanceDescriptor;

use super::{Cli, CredentialArgs};

/// Load provision.toml, apply env and CLI overrides.
pub fn load_config(cli: &Cli, work_dir: &Path, mut overrides: CliOverrides) -> Result<ProvisionConfig> {
    if overrides.outputs_file.is_none() {
        overrides.outputs_file = cli.outputs.clone();
    }
    let config = ProvisionConfig::load(work_dir.to_path_buf(), cli.config.as_deref())?
        .with_cli(overrides, cli.verbose);
    for warning in config.toml.validate() {
        tracing::warn!("{}", warning);
    }
    Ok(config)
}

pub fn load_descriptor(config: &ProvisionConfig) -> Result<InstanceDescriptor> {
    InstanceDescriptor::load(&config.outputs_file())
}

/// Credentials from the command line / environment, else from the configuration artifact.
pub fn resolve_credentials(args: &CredentialArgs, config: &ProvisionConfig) -> Result<ApiCredentials> {
    match (&args.client_id, &args.client_secret) {
        (Some(id), Some(secret)) => Ok(ApiCredentials::new(id, secret)),
        (Some(_), None) | (None, Some(_)) => {
            anyhow::bail!("--client-id and --client-secret must be given together")
        }
        (None, None) => {
            let path = config.artifact_file();
            read_artifact(&path).with_context(|| {
                format!(
                    "No API credentials given and none readable from {}. Run 'looker-provision mint' first.",
                    path.display()
                )
            })
        }
    }
}

pub async fn connect_api(
    config: &ProvisionConfig,
    descriptor: &InstanceDescriptor,
    credentials: &ApiCredentials,
) -> Result<LookerClient> {
    let base_url = config.toml.api.base_url(&descriptor.host_url);
    LookerClient::login(&base_url, credentials, config.api_timeout())
        .await
        .with_context(|| format!("Failed to log in to the API at {}", base_url))
}
