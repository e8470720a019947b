//! Full bring-up: `looker-provision run`.

use anyhow::Result;
use console::style;
use std::path::{Path, PathBuf};

use looker_provision::config::CliOverrides;
use looker_provision::pipeline::Pipeline;

use super::super::Cli;
use super::{load_config, load_descriptor};

pub async fn cmd_run(
    cli: &Cli,
    work_dir: &Path,
    skip_initial_delay: bool,
    project: Option<String>,
    source_repo: Option<String>,
    dashboard: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(
        cli,
        work_dir,
        CliOverrides {
            project_name: project,
            source_repo,
            dashboard_file: dashboard,
            skip_initial_delay,
            ..Default::default()
        },
    )?;
    let descriptor = load_descriptor(&config)?;
    let runs_dir = config.runs_dir();

    let report = Pipeline::new(config, descriptor).run().await?;

    println!();
    println!("{}", style("Instance provisioned").green().bold());
    if let Some(client_id) = &report.client_id {
        println!("  client_id  = {}", client_id);
    }
    if let Some(project_id) = &report.project_id {
        println!("  project_id = {}", project_id);
    }
    if let Some(seed) = &report.seed {
        println!("  repository = {}", seed.destination);
    }
    if !report.models.is_empty() {
        println!("  models     = {}", report.models.join(", "));
    }
    println!(
        "  report     = {}",
        runs_dir.join(format!("{}.json", report.run_id)).display()
    );
    println!();
    Ok(())
}
