//! Request and response bodies for the Looker API endpoints the pipeline calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// A database connection as accepted by `POST /connections`.
///
/// Only `name` is interpreted; every other field is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbConnection {
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteApiSession {
    pub workspace_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSession {
    #[serde(default)]
    pub workspace_id: Option<String>,
}

/// Fields of `POST /projects` and `PATCH /projects/{id}`; unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_service_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub git_service_name: Option<String>,
}

/// One entry of `GET /projects/{id}/files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(default)]
    pub path: Option<String>,
}

impl ProjectFile {
    pub fn is_model(&self) -> bool {
        self.file_type == "model"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteLookmlModel {
    pub name: String,
    pub project_name: String,
    pub unlimited_db_connections: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookmlModel {
    pub name: String,
    #[serde(default)]
    pub project_name: Option<String>,
}
