//! Model Registrar: one model entry per `.model.lkml` file in the project.

use anyhow::{Context, Result};
use tracing::info;

use crate::api::{LookerClient, ProjectFile, WriteLookmlModel};
use crate::project::ProjectId;

/// Model name for a file title: everything before the first `.`.
pub fn model_name(title: &str) -> &str {
    title.split('.').next().unwrap_or(title)
}

/// Registrations for every model file in `files`, in listing order.
pub fn registrations(project_id: &ProjectId, files: &[ProjectFile]) -> Vec<WriteLookmlModel> {
    files
        .iter()
        .filter(|f| f.is_model())
        .map(|f| WriteLookmlModel {
            name: model_name(&f.title).to_string(),
            project_name: project_id.to_string(),
            unlimited_db_connections: true,
        })
        .collect()
}

/// List the project's files and register a model for each model file.
///
/// Not idempotent: re-running against existing models surfaces the API's conflict.
pub async fn register_models(client: &LookerClient, project_id: &ProjectId) -> Result<Vec<String>> {
    let files = client
        .all_project_files(project_id.as_str())
        .await
        .with_context(|| format!("Failed to list files of project '{}'", project_id))?;

    let mut registered = Vec::new();
    for model in registrations(project_id, &files) {
        client
            .create_lookml_model(&model)
            .await
            .with_context(|| format!("Failed to register model '{}'", model.name))?;
        info!(model = %model.name, project_id = %project_id, "Registered model");
        registered.push(model.name);
    }

    if registered.is_empty() {
        info!(project_id = %project_id, files = files.len(), "No model files found");
    }
    Ok(registered)
}
