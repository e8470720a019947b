//! Project Provisioner: creates the project and points it at a bare repository.

use anyhow::{Context, Result};
use tracing::info;

use crate::api::{LookerClient, WriteProject};

/// Workspace in which project settings may be changed.
pub const DEV_WORKSPACE: &str = "dev";

/// Git service name that backs a project with a bare repository on the instance.
pub const BARE_GIT_SERVICE: &str = "bare";

/// Opaque project identifier returned by project creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Create `name`, enter the dev workspace, and switch the project to a bare repository.
///
/// The three calls run in order; the first failure aborts.
pub async fn provision(client: &LookerClient, name: &str) -> Result<ProjectId> {
    let project = client
        .create_project(&WriteProject {
            name: Some(name.to_string()),
            ..Default::default()
        })
        .await
        .with_context(|| format!("Failed to create project '{}'", name))?;
    let id = ProjectId::new(project.id);
    info!(project_id = %id, name, "Created project");

    client
        .update_session(DEV_WORKSPACE)
        .await
        .context("Failed to enter the dev workspace")?;

    client
        .update_project(
            id.as_str(),
            &WriteProject {
                git_service_name: Some(BARE_GIT_SERVICE.to_string()),
                ..Default::default()
            },
        )
        .await
        .with_context(|| format!("Failed to switch project '{}' to a bare repository", id))?;
    info!(project_id = %id, "Project backed by bare repository");

    Ok(id)
}
