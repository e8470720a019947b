//! Configuration view and validation commands: `looker-provision config`.

use anyhow::{Context, Result};
use std::path::Path;

use looker_provision::config::{CONFIG_FILE, CliOverrides, ProvisionToml};
use looker_provision::logging::redact;

use super::super::{Cli, ConfigCommands};
use super::load_config;

pub fn cmd_config(cli: &Cli, work_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| work_dir.join(CONFIG_FILE));

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Provisioning Configuration");
            println!("==========================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found at {}", CONFIG_FILE, config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let config = load_config(cli, work_dir, CliOverrides::default())?;
            let mut shown = config.toml.clone();
            if let Some(secret) = &shown.source.deploy_secret {
                shown.source.deploy_secret = Some(redact(secret).to_string());
            }
            let rendered =
                toml::to_string_pretty(&shown).context("Failed to render configuration")?;
            println!("{}", rendered.trim_end());
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  outputs_file = \"{}\"", config.outputs_file().display());
            println!("  gzr_cmd = \"{}\"", config.gzr_cmd());
            println!("  ssh_cmd = \"{}\"", config.ssh_cmd());
            println!("  scp_cmd = \"{}\"", config.scp_cmd());
            println!("  runs_dir = \"{}\"", config.runs_dir().display());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE);
                return Ok(());
            }

            let config = load_config(cli, work_dir, CliOverrides::default())?;
            let warnings = config.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            ProvisionToml::default().save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [source] repo_url, branch, deploy_secret");
            println!("  - [project] name");
            println!("  - [ssh] user, key_dir, remote_dir");
            println!("  - [dashboard] file, space_id, gzr_cmd");
            println!();
        }
    }

    Ok(())
}
