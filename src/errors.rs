//! Typed error hierarchy for the provisioning pipeline.
//!
//! One enum per subsystem:
//! - `ProbeError`: liveness probing gave up
//! - `ScrapeError`: the web UI markup no longer matches what the minter expects
//! - `ApiError`: HTTP calls against the Looker API and web endpoints
//! - `RemoteError`: commands and transfers over the remote shell
//! - `SeedError`: source seeding, wrapping the above where relevant
//! - `PipelineError`: any step failure, tagged with the step that raised it

use std::path::PathBuf;

use thiserror::Error;

/// Liveness probing failures.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Instance did not become alive after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Probe configured with zero attempts")]
    NoAttempts,
}

/// Markup contract violations found while scraping the web UI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("No CSRF-TOKEN cookie was set by {url}")]
    MissingCsrfCookie { url: String },

    #[error("Authenticated page has no <meta name=\"csrf-token\"> tag")]
    MissingMetaToken,

    #[error("API key page has no <table>")]
    MissingTable,

    #[error("API key table has no data row")]
    MissingDataRow,

    #[error("API key row has no client id cell")]
    MissingClientId,

    #[error("API key row has no <lk-hidden-field> secret")]
    MissingSecret,
}

/// Errors from HTTP calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from the remote shell session.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transfer of {local} to {remote} failed with status {status}: {stderr}")]
    Transfer {
        local: PathBuf,
        remote: String,
        status: i32,
        stderr: String,
    },

    #[error("Remote step '{step}' failed with status {status} ({command}): {stderr}")]
    StepFailed {
        step: String,
        command: String,
        status: i32,
        stderr: String,
    },
}

/// Errors from the source seeding step.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Instance descriptor lists no public host")]
    NoPublicHost,

    #[error("SSH key not found at {0}")]
    MissingKey(PathBuf),

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to clone {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to build archive at {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Deploy webhook failed: {0}")]
    Webhook(#[source] ApiError),
}

/// A failed pipeline step.
#[derive(Debug, Error)]
#[error("Step '{step}' failed: {source}")]
pub struct PipelineError {
    pub step: &'static str,
    #[source]
    pub source: anyhow::Error,
}

impl PipelineError {
    pub fn new(step: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            step,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_error_exhausted_carries_attempts() {
        let err = ProbeError::Exhausted {
            attempts: 8,
            last_error: "connection refused".to_string(),
        };
        match &err {
            ProbeError::Exhausted { attempts, .. } => assert_eq!(*attempts, 8),
            _ => panic!("Expected Exhausted"),
        }
        assert!(err.to_string().contains("8 attempts"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn api_error_status_code_only_for_status_variant() {
        let err = ApiError::Status {
            endpoint: "/projects".to_string(),
            status: 409,
            body: "already exists".to_string(),
        };
        assert_eq!(err.status_code(), Some(409));

        let err = ApiError::Decode {
            endpoint: "/projects".to_string(),
            message: "eof".to_string(),
        };
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn remote_step_failure_names_step() {
        let err = RemoteError::StepFailed {
            step: "git init".to_string(),
            command: "cd lookml && git init".to_string(),
            status: 128,
            stderr: "fatal".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git init"));
        assert!(msg.contains("128"));
    }

    #[test]
    fn seed_error_converts_from_remote_error() {
        let inner = RemoteError::Transfer {
            local: PathBuf::from("/tmp/lookml.tgz"),
            remote: "/home/ubuntu".to_string(),
            status: 1,
            stderr: "lost connection".to_string(),
        };
        let err: SeedError = inner.into();
        assert!(matches!(err, SeedError::Remote(RemoteError::Transfer { .. })));
    }

    #[test]
    fn pipeline_error_reports_step_name() {
        let err = PipelineError::new("create-project", ScrapeError::MissingTable);
        assert_eq!(err.step, "create-project");
        assert!(err.to_string().starts_with("Step 'create-project' failed"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ProbeError::NoAttempts);
        assert_std_error(&ScrapeError::MissingMetaToken);
        assert_std_error(&SeedError::NoPublicHost);
        assert_std_error(&PipelineError::new("probe", ProbeError::NoAttempts));
    }
}
