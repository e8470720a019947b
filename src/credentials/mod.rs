//! Credential minting.
//!
//! A fresh instance has no API keys, so they are minted through the web UI the
//! way an administrator would:
//!
//! 1. `GET /login/email` seeds a `CSRF-TOKEN` cookie
//! 2. `POST /login` with the form-encoded credentials and that token
//! 3. `GET /folders/home` yields the authenticated token from a `<meta>` tag
//! 4. `POST /admin/users/api3_key/{id}` regenerates the admin's key pair
//! 5. `GET /admin/users/api3_key/{id}` renders it in a table
//!
//! The pair is then written into the configuration artifact (see [`render`]).

pub mod render;
pub mod scrape;
pub mod session;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::instance::InstanceDescriptor;
use crate::logging::redact;

pub use render::{ArtifactOptions, DEFAULT_TEMPLATE, read_artifact, render_artifact, write_artifact};
pub use scrape::{extract_key_pair, extract_token};
pub use session::{WebSession, login_form_body};

/// An API3 client id / secret pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .finish()
    }
}

impl ApiCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// Settings for one minting run.
#[derive(Debug, Clone)]
pub struct MintOptions {
    pub admin_user_id: u64,
    pub timeout: Duration,
    pub artifact: ArtifactOptions,
}

/// Mint a new key pair for the admin user and persist the configuration artifact.
///
/// Nothing here is retried; a failure means bad credentials or a changed UI.
pub async fn mint(descriptor: &InstanceDescriptor, options: &MintOptions) -> Result<ApiCredentials> {
    let session = WebSession::new(&descriptor.host_url, options.timeout)?;

    session
        .login(&descriptor.user, &descriptor.password)
        .await
        .context("Login to the web UI failed")?;
    info!(user = %descriptor.user, "Logged in to web UI");

    let token = session.authenticated_token().await?;
    session.regenerate_api_key(&token, options.admin_user_id).await?;
    let credentials = session.read_api_key(&token, options.admin_user_id).await?;
    info!(client_id = %credentials.client_id, "Minted API key pair");

    let path = write_artifact(&descriptor.host_url, &credentials, &options.artifact)?;
    info!(path = %path.display(), "Wrote configuration artifact");

    Ok(credentials)
}

#[cfg(test)]
pub(crate) mod test_support {
    use httpmock::prelude::*;

    /// Mock the web UI endpoints so that minting yields `client_id` / `client_secret`.
    pub fn mock_web_ui(server: &MockServer, client_id: &str, client_secret: &str) {
        server.mock(|when, then| {
            when.method(GET).path("/login/email");
            then.status(200)
                .header("set-cookie", "CSRF-TOKEN=seed-token; Path=/");
        });
        server.mock(|when, then| {
            when.method(POST).path("/login");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path("/folders/home");
            then.status(200)
                .body(r#"<html><head><meta name="csrf-token" content="auth"></head></html>"#);
        });
        server.mock(|when, then| {
            when.method(POST).path("/admin/users/api3_key/1");
            then.status(200);
        });
        let table = format!(
            r#"<table><tr><th>Client ID</th></tr><tr><td>{}</td><td><lk-hidden-field content="'{}'"></lk-hidden-field></td></tr></table>"#,
            client_id, client_secret
        );
        server.mock(move |when, then| {
            when.method(GET).path("/admin/users/api3_key/1");
            then.status(200).body(table.clone());
        });
    }
}
