//! Instance descriptor: the infrastructure outputs for one freshly provisioned instance.
//!
//! The outputs file is a JSON object whose entries each wrap their payload in a
//! `value` field:
//!
//! ```json
//! {
//!   "host_url": { "value": "https://looker.example.com" },
//!   "user": { "value": "admin@example.com" },
//!   "pass": { "value": "hunter2" },
//!   "key": { "value": "looker.pem" },
//!   "node_public_dns": { "value": ["ec2-1-2-3-4.compute.amazonaws.com"] },
//!   "nfs_flag": { "value": 1 }
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::logging::redact;

#[derive(Debug, Clone, Deserialize)]
struct Output<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct RawOutputs {
    host_url: Output<String>,
    user: Output<String>,
    pass: Output<String>,
    key: Output<String>,
    node_public_dns: Output<Vec<String>>,
    nfs_flag: Output<u8>,
}

/// Immutable view of the infrastructure outputs, read once at pipeline start.
#[derive(Clone, PartialEq, Eq)]
pub struct InstanceDescriptor {
    pub host_url: String,
    pub user: String,
    pub password: String,
    /// File name of the private key, resolved against the SSH key directory
    pub key: String,
    pub node_public_dns: Vec<String>,
    /// Whether the instance serves model files from shared (NFS) storage
    pub shared_storage: bool,
}

impl std::fmt::Debug for InstanceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceDescriptor")
            .field("host_url", &self.host_url)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("key", &self.key)
            .field("node_public_dns", &self.node_public_dns)
            .field("shared_storage", &self.shared_storage)
            .finish()
    }
}

impl InstanceDescriptor {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read instance outputs: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid instance outputs in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawOutputs =
            serde_json::from_str(content).context("Failed to parse instance outputs JSON")?;

        let shared_storage = match raw.nfs_flag.value {
            0 => false,
            1 => true,
            other => anyhow::bail!("nfs_flag must be 0 or 1, got {}", other),
        };

        Ok(Self {
            host_url: raw.host_url.value.trim_end_matches('/').to_string(),
            user: raw.user.value,
            password: raw.pass.value,
            key: raw.key.value,
            node_public_dns: raw.node_public_dns.value,
            shared_storage,
        })
    }

    /// First public DNS name: the host the seeder connects to.
    pub fn primary_host(&self) -> Option<&str> {
        self.node_public_dns.first().map(String::as_str)
    }

    /// Host URL with the protocol prefix removed, as the dashboard importer expects.
    pub fn bare_host(&self) -> &str {
        self.host_url
            .strip_prefix("https://")
            .or_else(|| self.host_url.strip_prefix("http://"))
            .unwrap_or(&self.host_url)
    }
}
