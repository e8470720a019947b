//! Cookie-backed web session used to drive the UI's login and key pages.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;
use url::form_urlencoded::byte_serialize;

use super::ApiCredentials;
use super::scrape::{extract_key_pair, extract_token};
use crate::errors::{ApiError, ScrapeError};

/// Name of the cookie carrying the pre-authentication CSRF token.
pub const CSRF_COOKIE: &str = "CSRF-TOKEN";

/// Header echoing the authenticated CSRF token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Build the `application/x-www-form-urlencoded` login body.
///
/// Email and password are percent-encoded so reserved characters survive; the
/// token is passed through as the server set it.
pub fn login_form_body(email: &str, password: &str, csrf_token: &str) -> String {
    format!(
        "email={}&password={}&csrf-token={}",
        encode(email),
        encode(password),
        csrf_token
    )
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// A browser-less session against the instance's web UI.
///
/// Holds the cookie jar for the lifetime of one minting run; nothing is persisted.
pub struct WebSession {
    client: Client,
    jar: Arc<Jar>,
    base: Url,
}

impl WebSession {
    pub fn new(host_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(host_url.trim_end_matches('/')).map_err(|e| ApiError::InvalidUrl {
            url: host_url.to_string(),
            message: e.to_string(),
        })?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Request {
                endpoint: host_url.to_string(),
                source,
            })?;
        Ok(Self { client, jar, base })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(|e| ApiError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            message: e.to_string(),
        })
    }

    /// Value of a cookie currently held for the instance host.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    /// Seed the CSRF cookie and post the login form.
    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<()> {
        let seed_url = self.url("/login/email")?;
        let response = self.send(self.client.get(seed_url.clone()), "/login/email").await?;
        drop(response);

        let csrf = self
            .cookie(CSRF_COOKIE)
            .ok_or_else(|| ScrapeError::MissingCsrfCookie {
                url: seed_url.to_string(),
            })?;
        debug!("Seeded CSRF cookie");

        let request = self
            .client
            .post(self.url("/login")?)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(login_form_body(email, password, &csrf));
        self.send(request, "/login").await?;
        Ok(())
    }

    /// Fetch the landing page and read the authenticated CSRF token from it.
    pub async fn authenticated_token(&self) -> anyhow::Result<String> {
        let response = self
            .send(self.client.get(self.url("/folders/home")?), "/folders/home")
            .await?;
        let html = read_text(response, "/folders/home").await?;
        Ok(extract_token(&html)?)
    }

    /// Trigger generation of a new API key pair for `user_id`.
    pub async fn regenerate_api_key(&self, token: &str, user_id: u64) -> Result<(), ApiError> {
        let path = api_key_path(user_id);
        let request = self
            .client
            .post(self.url(&path)?)
            .header(CSRF_HEADER, token);
        self.send(request, &path).await?;
        debug!(user_id, "Regenerated API key");
        Ok(())
    }

    /// Read the key pair back from the rendered key table.
    pub async fn read_api_key(&self, token: &str, user_id: u64) -> anyhow::Result<ApiCredentials> {
        let path = api_key_path(user_id);
        let request = self.client.get(self.url(&path)?).header(CSRF_HEADER, token);
        let response = self.send(request, &path).await?;
        let html = read_text(response, &path).await?;
        Ok(extract_key_pair(&html)?)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Request {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn api_key_path(user_id: u64) -> String {
    format!("/admin/users/api3_key/{}", user_id)
}

async fn read_text(response: Response, endpoint: &str) -> Result<String, ApiError> {
    response.text().await.map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}
