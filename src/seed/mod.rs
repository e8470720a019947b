//! Source seeding: ship a source repository's files into the project's bare repo.
//!
//! The local work happens in a scoped temporary directory that is removed when
//! `seed` returns, whichever way it returns.

pub mod archive;
pub mod destination;
pub mod remote;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{ApiError, SeedError};
use crate::instance::InstanceDescriptor;
use crate::project::ProjectId;

pub use archive::{ARCHIVE_NAME, SourceArchive};
pub use destination::bare_repo_path;
pub use remote::{OpenSshShell, PushPlan, RemoteShell, RemoteStep, run_steps, seed_steps};

/// Header carrying the deploy secret, when the instance has one configured.
pub const DEPLOY_SECRET_HEADER: &str = "X-Looker-Deploy-Secret";

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub repo_url: String,
    pub commit_message: String,
    pub branch: String,
    pub remote_dir: String,
    pub deploy_secret: Option<String>,
    pub timeout: Duration,
    /// Parent for the scoped work directory; the system temp dir when unset
    pub temp_root: Option<PathBuf>,
}

/// What a seeding run did, for the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub destination: String,
    pub archive_sha256: String,
    pub file_count: usize,
}

/// Seed `project_id` from `options.repo_url` through `shell`, then trigger a deploy.
pub async fn seed(
    shell: &dyn RemoteShell,
    descriptor: &InstanceDescriptor,
    project_id: &ProjectId,
    options: &SeedOptions,
) -> Result<SeedSummary, SeedError> {
    let destination = bare_repo_path(descriptor.shared_storage, project_id.as_str());
    info!(project_id = %project_id, destination = %destination, "Seeding project source");

    let work_dir = scoped_work_dir(options)?;
    let source = archive::prepare(&options.repo_url, work_dir.path())?;

    shell.upload(&source.path, &options.remote_dir).await?;
    let steps = seed_steps(&PushPlan {
        remote_dir: &options.remote_dir,
        bare_repo: &destination,
        branch: &options.branch,
        commit_message: &options.commit_message,
    });
    run_steps(shell, &steps).await?;
    drop(work_dir);

    trigger_deploy(descriptor, project_id, options)
        .await
        .map_err(SeedError::Webhook)?;

    Ok(SeedSummary {
        destination,
        archive_sha256: source.sha256,
        file_count: source.file_count,
    })
}

fn scoped_work_dir(options: &SeedOptions) -> Result<tempfile::TempDir, SeedError> {
    let builder = {
        let mut b = tempfile::Builder::new();
        b.prefix("looker-seed-");
        b
    };
    let result = match &options.temp_root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    };
    result.map_err(|source| SeedError::Archive {
        path: options.temp_root.clone().unwrap_or_else(std::env::temp_dir),
        source,
    })
}

/// `GET {host}/webhooks/projects/{id}/deploy`
pub async fn trigger_deploy(
    descriptor: &InstanceDescriptor,
    project_id: &ProjectId,
    options: &SeedOptions,
) -> Result<(), ApiError> {
    let endpoint = format!(
        "{}/webhooks/projects/{}/deploy",
        descriptor.host_url, project_id
    );
    let client = reqwest::Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(|source| ApiError::Request {
            endpoint: endpoint.clone(),
            source,
        })?;

    let mut request = client.get(&endpoint);
    if let Some(secret) = &options.deploy_secret {
        request = request.header(DEPLOY_SECRET_HEADER, secret);
    }
    let response = request.send().await.map_err(|source| ApiError::Request {
        endpoint: endpoint.clone(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            endpoint,
            status: status.as_u16(),
            body,
        });
    }
    info!(project_id = %project_id, "Deploy webhook accepted");
    Ok(())
}
