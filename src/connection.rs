//! Connection Registrar: registers a pre-built database connection.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::{DbConnection, LookerClient};

/// Read a serialized connection from a trusted local file.
///
/// The artifact is deserialized as-is; beyond requiring a `name` nothing is validated.
pub fn load_connection(path: &Path) -> Result<DbConnection> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read connection file: {}", path.display()))?;
    serde_json::from_slice(&content)
        .with_context(|| format!("Malformed connection file: {}", path.display()))
}

/// Load the connection at `path` and create it through the API.
///
/// An API rejection (duplicate name, invalid fields) is returned as-is.
pub async fn register(client: &LookerClient, path: &Path) -> Result<DbConnection> {
    let connection = load_connection(path)?;
    info!(name = %connection.name, "Registering database connection");
    let created = client
        .create_connection(&connection)
        .await
        .with_context(|| format!("Failed to create connection '{}'", connection.name))?;
    Ok(created)
}
