//! Dashboard Importer: hands a dashboard definition to the `gzr` CLI.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{debug, info};

use crate::credentials::ApiCredentials;
use crate::instance::InstanceDescriptor;

/// A configured import: which tool, which file, which space.
#[derive(Debug, Clone)]
pub struct DashboardImport {
    pub program: String,
    pub file: PathBuf,
    pub space_id: String,
}

impl DashboardImport {
    /// Arguments for `gzr dashboard import`, overwriting any existing dashboard.
    pub fn args(&self, descriptor: &InstanceDescriptor, credentials: &ApiCredentials) -> Vec<String> {
        vec![
            "dashboard".to_string(),
            "import".to_string(),
            self.file.display().to_string(),
            self.space_id.clone(),
            "--host".to_string(),
            descriptor.bare_host().to_string(),
            "--client_id".to_string(),
            credentials.client_id.clone(),
            "--client_secret".to_string(),
            credentials.client_secret.clone(),
            "--force".to_string(),
        ]
    }

    /// Run the import. The tool's exit status decides success; its output is not parsed.
    pub async fn run(&self, descriptor: &InstanceDescriptor, credentials: &ApiCredentials) -> Result<()> {
        ensure_file(&self.file)?;
        info!(
            file = %self.file.display(),
            space_id = %self.space_id,
            host = descriptor.bare_host(),
            "Importing dashboard"
        );

        let output = Command::new(&self.program)
            .args(self.args(descriptor, credentials))
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to spawn dashboard importer '{}'", self.program))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim(), "Dashboard importer output");
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Dashboard importer exited with {}: {}",
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr.trim()
            );
        }
        info!(file = %self.file.display(), "Dashboard imported");
        Ok(())
    }
}

fn ensure_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Dashboard definition not found: {}", path.display());
    }
    Ok(())
}
