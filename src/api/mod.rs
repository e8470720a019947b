//! Looker API client.
//!
//! A `LookerClient` is an explicit handle: it is built from a credential pair,
//! logs in once, and carries its access token with it. Nothing is initialised
//! globally; every step that talks to the API receives the handle.

pub mod models;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::credentials::ApiCredentials;
use crate::errors::ApiError;

pub use models::{
    AccessToken, ApiSession, DbConnection, LookmlModel, Project, ProjectFile, WriteApiSession,
    WriteLookmlModel, WriteProject,
};

/// An authenticated Looker API session.
#[derive(Debug, Clone)]
pub struct LookerClient {
    base_url: String,
    client: Client,
    access_token: String,
}

impl LookerClient {
    /// Log in with an API3 key pair and return an authenticated handle.
    ///
    /// `base_url` is the API root, e.g. `https://host:19999/api/4.0`.
    pub async fn login(
        base_url: impl Into<String>,
        credentials: &ApiCredentials,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Request {
                endpoint: base_url.clone(),
                source,
            })?;

        let response = client
            .post(format!("{}/login", base_url))
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ApiError::Request {
                endpoint: "/login".to_string(),
                source,
            })?;
        let token: AccessToken = handle_response(response, "/login").await?;
        debug!(client_id = %credentials.client_id, "API login succeeded");

        Ok(Self {
            base_url,
            client,
            access_token: token.access_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("token {}", self.access_token),
            )
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|source| ApiError::Request {
            endpoint: path.to_string(),
            source,
        })?;
        handle_response(response, path).await
    }

    // =============================================================================
    // Endpoints
    // =============================================================================

    /// `POST /connections`
    pub async fn create_connection(&self, connection: &DbConnection) -> Result<DbConnection, ApiError> {
        self.send_json(Method::POST, "/connections", Some(connection))
            .await
    }

    /// `PATCH /session`: switch between the `production` and `dev` workspaces.
    pub async fn update_session(&self, workspace_id: &str) -> Result<ApiSession, ApiError> {
        let body = WriteApiSession {
            workspace_id: workspace_id.to_string(),
        };
        self.send_json(Method::PATCH, "/session", Some(&body)).await
    }

    /// `POST /projects`
    pub async fn create_project(&self, project: &WriteProject) -> Result<Project, ApiError> {
        self.send_json(Method::POST, "/projects", Some(project)).await
    }

    /// `PATCH /projects/{id}`
    pub async fn update_project(
        &self,
        project_id: &str,
        project: &WriteProject,
    ) -> Result<Project, ApiError> {
        let path = format!("/projects/{}", project_id);
        self.send_json(Method::PATCH, &path, Some(project)).await
    }

    /// `GET /projects/{id}/files`
    pub async fn all_project_files(&self, project_id: &str) -> Result<Vec<ProjectFile>, ApiError> {
        let path = format!("/projects/{}/files", project_id);
        self.send_json::<(), _>(Method::GET, &path, None).await
    }

    /// `POST /lookml_models`
    pub async fn create_lookml_model(
        &self,
        model: &WriteLookmlModel,
    ) -> Result<LookmlModel, ApiError> {
        self.send_json(Method::POST, "/lookml_models", Some(model))
            .await
    }
}

/// Check the status and decode a JSON body.
async fn handle_response<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response.json().await.map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    /// Register a login mock and return a client authenticated against `server`.
    pub async fn logged_in_client(server: &MockServer) -> LookerClient {
        server.mock(|when, then| {
            when.method(POST).path("/api/4.0/login");
            then.status(200)
                .json_body(json!({"access_token": "tok-1", "token_type": "Bearer", "expires_in": 3600}));
        });
        LookerClient::login(
            server.url("/api/4.0"),
            &ApiCredentials::new("cid", "secret"),
            Duration::from_secs(5),
        )
        .await
        .unwrap()
    }
}
