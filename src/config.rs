//! Configuration for the provisioning pipeline.
//!
//! Settings are read from `provision.toml` (every section optional) and layered:
//! file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [instance]
//! outputs_file = "output.json"
//!
//! [source]
//! repo_url = "https://github.com/JCPistell/partner_homepage_template.git"
//! commit_message = "lookml files"
//! branch = "master"
//!
//! [project]
//! name = "thelook"
//!
//! [connection]
//! file = "db.json"
//!
//! [credentials]
//! template = "ini_template.ini"
//! output = "looker.ini"
//! admin_user_id = 1
//!
//! [api]
//! port = 19999
//! version = "4.0"
//!
//! [probe]
//! initial_delay_secs = 30
//! max_attempts = 8
//! base_delay_ms = 1000
//!
//! [ssh]
//! user = "ubuntu"
//! key_dir = "~/.ssh"
//! remote_dir = "/home/ubuntu"
//!
//! [dashboard]
//! file = "Dashboard_1_Overview.json"
//! space_id = "1"
//! gzr_cmd = "gzr"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::{ArtifactOptions, MintOptions};
use crate::dashboard::DashboardImport;
use crate::errors::SeedError;
use crate::instance::InstanceDescriptor;
use crate::probe::BackoffSchedule;
use crate::seed::{OpenSshShell, SeedOptions};

/// Default name of the configuration file.
pub const CONFIG_FILE: &str = "provision.toml";

/// Directory (relative to the working directory) holding run reports and logs.
pub const STATE_DIR: &str = ".looker-provision";

/// Where the infrastructure outputs live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSection {
    #[serde(default = "default_outputs_file")]
    pub outputs_file: PathBuf,
}

fn default_outputs_file() -> PathBuf {
    PathBuf::from("output.json")
}

impl Default for InstanceSection {
    fn default() -> Self {
        Self {
            outputs_file: default_outputs_file(),
        }
    }
}

/// The repository whose model files seed the new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    #[serde(default = "default_repo_url")]
    pub repo_url: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    /// Default branch of the bare repository
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Sent as `X-Looker-Deploy-Secret` to the deploy webhook when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_secret: Option<String>,
}

fn default_repo_url() -> String {
    "https://github.com/JCPistell/partner_homepage_template.git".to_string()
}

fn default_commit_message() -> String {
    "lookml files".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            repo_url: default_repo_url(),
            commit_message: default_commit_message(),
            branch: default_branch(),
            deploy_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    #[serde(default = "default_project_name")]
    pub name: String,
}

fn default_project_name() -> String {
    "thelook".to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: default_project_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSection {
    /// Serialized write-connection object
    #[serde(default = "default_connection_file")]
    pub file: PathBuf,
}

fn default_connection_file() -> PathBuf {
    PathBuf::from("db.json")
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            file: default_connection_file(),
        }
    }
}

/// Credential minting and the rendered configuration artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsSection {
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// User whose API3 key pair gets regenerated
    #[serde(default = "default_admin_user_id")]
    pub admin_user_id: u64,
}

fn default_template() -> PathBuf {
    PathBuf::from("ini_template.ini")
}

fn default_output() -> PathBuf {
    PathBuf::from("looker.ini")
}

fn default_admin_user_id() -> u64 {
    1
}

impl Default for CredentialsSection {
    fn default() -> Self {
        Self {
            template: default_template(),
            output: default_output(),
            admin_user_id: default_admin_user_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_version")]
    pub version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Full API root, used verbatim instead of deriving one from the host URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_api_port() -> u16 {
    19999
}

fn default_api_version() -> String {
    "4.0".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }
}

impl ApiSection {
    /// API root for a given instance host URL, e.g. `https://host:19999/api/4.0`.
    ///
    /// Any port already present in `host_url` is replaced.
    pub fn base_url(&self, host_url: &str) -> String {
        if let Some(base) = &self.base_url {
            return base.trim_end_matches('/').to_string();
        }
        let trimmed = host_url.trim_end_matches('/');
        let (scheme, rest) = match trimmed.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => ("https", trimmed),
        };
        let host = rest.split(':').next().unwrap_or(rest);
        format!("{}://{}:{}/api/{}", scheme, host, self.port, self.version)
    }
}

/// Liveness probe timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSection {
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_initial_delay_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    8
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay_secs(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl ProbeSection {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

/// Remote shell settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshSection {
    #[serde(default = "default_ssh_user")]
    pub user: String,
    /// Directory holding the private key named in the instance descriptor
    #[serde(default = "default_key_dir")]
    pub key_dir: String,
    /// Where the archive lands and gets extracted on the remote host
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scp_cmd: Option<String>,
}

fn default_ssh_user() -> String {
    "ubuntu".to_string()
}

fn default_key_dir() -> String {
    "~/.ssh".to_string()
}

fn default_remote_dir() -> String {
    "/home/ubuntu".to_string()
}

impl Default for SshSection {
    fn default() -> Self {
        Self {
            user: default_ssh_user(),
            key_dir: default_key_dir(),
            remote_dir: default_remote_dir(),
            ssh_cmd: None,
            scp_cmd: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSection {
    #[serde(default = "default_dashboard_file")]
    pub file: PathBuf,
    /// Target space (folder) id passed to the importer
    #[serde(default = "default_space_id")]
    pub space_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gzr_cmd: Option<String>,
}

fn default_dashboard_file() -> PathBuf {
    PathBuf::from("Dashboard_1_Overview.json")
}

fn default_space_id() -> String {
    "1".to_string()
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            file: default_dashboard_file(),
            space_id: default_space_id(),
            gzr_cmd: None,
        }
    }
}

/// The complete provision.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvisionToml {
    #[serde(default)]
    pub instance: InstanceSection,
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub connection: ConnectionSection,
    #[serde(default)]
    pub credentials: CredentialsSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub probe: ProbeSection,
    #[serde(default)]
    pub ssh: SshSection,
    #[serde(default)]
    pub dashboard: DashboardSection,
}

const SUPPORTED_API_VERSIONS: &[&str] = &["3.1", "4.0"];

impl ProvisionToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse provision.toml")
    }

    /// Returns defaults when the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize provision.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.probe.max_attempts == 0 {
            warnings.push("probe.max_attempts is 0: the instance will never be probed".to_string());
        }
        if self.probe.base_delay_ms == 0 {
            warnings.push("probe.base_delay_ms is 0: retries will not back off".to_string());
        }
        if self.project.name.trim().is_empty() {
            warnings.push("project.name is empty".to_string());
        }
        if self.source.branch.trim().is_empty() {
            warnings.push("source.branch is empty".to_string());
        }
        if !SUPPORTED_API_VERSIONS.contains(&self.api.version.as_str()) {
            warnings.push(format!(
                "Unsupported api.version '{}'. Supported: {}",
                self.api.version,
                SUPPORTED_API_VERSIONS.join(", ")
            ));
        }
        if !self.source.repo_url.contains("://") && !self.source.repo_url.starts_with("git@") {
            warnings.push(format!(
                "source.repo_url '{}' does not look like a clone URL",
                self.source.repo_url
            ));
        }

        warnings
    }
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub outputs_file: Option<PathBuf>,
    pub project_name: Option<String>,
    pub source_repo: Option<String>,
    pub dashboard_file: Option<PathBuf>,
    pub connection_file: Option<PathBuf>,
    pub skip_initial_delay: bool,
}

/// Resolved configuration: provision.toml + environment + CLI.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Directory relative paths are resolved against
    pub work_dir: PathBuf,
    pub toml: ProvisionToml,
    pub skip_initial_delay: bool,
    pub verbose: bool,
}

impl ProvisionConfig {
    /// Load `config_path` (or `<work_dir>/provision.toml`) and apply env overrides.
    pub fn load(work_dir: PathBuf, config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => work_dir.join(CONFIG_FILE),
        };
        let mut toml = match config_path {
            // An explicitly named config must exist
            Some(_) => ProvisionToml::load(&path)?,
            None => ProvisionToml::load_or_default(&path)?,
        };
        apply_env_overrides(&mut toml);

        Ok(Self {
            work_dir,
            toml,
            skip_initial_delay: false,
            verbose: false,
        })
    }

    pub fn with_cli(mut self, overrides: CliOverrides, verbose: bool) -> Self {
        if let Some(path) = overrides.outputs_file {
            self.toml.instance.outputs_file = path;
        }
        if let Some(name) = overrides.project_name {
            self.toml.project.name = name;
        }
        if let Some(url) = overrides.source_repo {
            self.toml.source.repo_url = url;
        }
        if let Some(file) = overrides.dashboard_file {
            self.toml.dashboard.file = file;
        }
        if let Some(file) = overrides.connection_file {
            self.toml.connection.file = file;
        }
        self.skip_initial_delay = overrides.skip_initial_delay;
        self.verbose = verbose;
        self
    }

    /// Resolve a configured path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    pub fn outputs_file(&self) -> PathBuf {
        self.resolve(&self.toml.instance.outputs_file)
    }

    pub fn connection_file(&self) -> PathBuf {
        self.resolve(&self.toml.connection.file)
    }

    pub fn template_file(&self) -> PathBuf {
        self.resolve(&self.toml.credentials.template)
    }

    pub fn artifact_file(&self) -> PathBuf {
        self.resolve(&self.toml.credentials.output)
    }

    pub fn dashboard_file(&self) -> PathBuf {
        self.resolve(&self.toml.dashboard.file)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.work_dir.join(STATE_DIR)
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.state_dir().join("runs")
    }

    /// Get the gzr command (file → env → default).
    pub fn gzr_cmd(&self) -> String {
        self.toml
            .dashboard
            .gzr_cmd
            .clone()
            .unwrap_or_else(|| "gzr".to_string())
    }

    pub fn ssh_cmd(&self) -> String {
        self.toml
            .ssh
            .ssh_cmd
            .clone()
            .unwrap_or_else(|| "ssh".to_string())
    }

    pub fn scp_cmd(&self) -> String {
        self.toml
            .ssh
            .scp_cmd
            .clone()
            .unwrap_or_else(|| "scp".to_string())
    }

    /// Directory holding SSH keys, with a leading `~` expanded to the home directory.
    pub fn key_dir(&self) -> Option<PathBuf> {
        expand_home(&self.toml.ssh.key_dir)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        let template = self.template_file();
        if !template.exists() {
            warnings.push(format!(
                "Template {} not found: the built-in template will be used",
                template.display()
            ));
        }
        warnings
    }
}

/// Per-step settings derived from the resolved configuration.
impl ProvisionConfig {
    pub fn backoff_schedule(&self) -> BackoffSchedule {
        BackoffSchedule::new(
            Duration::from_millis(self.toml.probe.base_delay_ms),
            self.toml.probe.max_attempts,
        )
    }

    /// Wait before the first probe, or zero when skipped from the CLI.
    pub fn initial_delay(&self) -> Duration {
        if self.skip_initial_delay {
            Duration::ZERO
        } else {
            self.toml.probe.initial_delay()
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.toml.api.timeout_secs)
    }

    pub fn mint_options(&self) -> MintOptions {
        MintOptions {
            admin_user_id: self.toml.credentials.admin_user_id,
            timeout: self.api_timeout(),
            artifact: ArtifactOptions {
                template: self.template_file(),
                output: self.artifact_file(),
            },
        }
    }

    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            repo_url: self.toml.source.repo_url.clone(),
            commit_message: self.toml.source.commit_message.clone(),
            branch: self.toml.source.branch.clone(),
            remote_dir: self.toml.ssh.remote_dir.clone(),
            deploy_secret: self.toml.source.deploy_secret.clone(),
            timeout: self.api_timeout(),
            temp_root: None,
        }
    }

    pub fn dashboard_import(&self) -> DashboardImport {
        DashboardImport {
            program: self.gzr_cmd(),
            file: self.dashboard_file(),
            space_id: self.toml.dashboard.space_id.clone(),
        }
    }

    /// SSH session against the instance's first public host.
    pub fn remote_shell(&self, descriptor: &InstanceDescriptor) -> Result<OpenSshShell, SeedError> {
        OpenSshShell::for_instance(
            descriptor,
            &self.toml.ssh.user,
            self.key_dir(),
            self.ssh_cmd(),
            self.scp_cmd(),
        )
    }
}

fn apply_env_overrides(toml: &mut ProvisionToml) {
    if let Ok(path) = std::env::var("LOOKER_PROVISION_OUTPUTS") {
        toml.instance.outputs_file = PathBuf::from(path);
    }
    if let Ok(url) = std::env::var("LOOKER_PROVISION_SOURCE_REPO") {
        toml.source.repo_url = url;
    }
    if toml.dashboard.gzr_cmd.is_none() {
        toml.dashboard.gzr_cmd = std::env::var("LOOKER_PROVISION_GZR_CMD").ok();
    }
    if toml.ssh.ssh_cmd.is_none() {
        toml.ssh.ssh_cmd = std::env::var("LOOKER_PROVISION_SSH_CMD").ok();
    }
    if toml.ssh.scp_cmd.is_none() {
        toml.ssh.scp_cmd = std::env::var("LOOKER_PROVISION_SCP_CMD").ok();
    }
}

/// Expand a leading `~` to the executing user's home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_match_bring_up_script() {
        let toml = ProvisionToml::default();
        assert_eq!(toml.instance.outputs_file, PathBuf::from("output.json"));
        assert_eq!(toml.project.name, "thelook");
        assert_eq!(toml.probe.max_attempts, 8);
        assert_eq!(toml.probe.initial_delay_secs, 30);
        assert_eq!(toml.ssh.user, "ubuntu");
        assert_eq!(toml.dashboard.space_id, "1");
        assert_eq!(toml.source.branch, "master");
        assert_eq!(toml.credentials.admin_user_id, 1);
    }

    #[test]
    fn test_parse_partial_keeps_defaults() {
        let toml = ProvisionToml::parse(
            r#"
[project]
name = "ecommerce"

[probe]
max_attempts = 3
"#,
        )
        .unwrap();
        assert_eq!(toml.project.name, "ecommerce");
        assert_eq!(toml.probe.max_attempts, 3);
        assert_eq!(toml.probe.base_delay_ms, 1000);
        assert_eq!(toml.api.port, 19999);
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(ProvisionToml::parse("not valid toml {{{{").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut toml = ProvisionToml::default();
        toml.project.name = "saved".to_string();
        toml.source.deploy_secret = Some("s3cret".to_string());
        toml.save(&path).unwrap();

        let loaded = ProvisionToml::load(&path).unwrap();
        assert_eq!(loaded.project.name, "saved");
        assert_eq!(loaded.source.deploy_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_validate_default_is_clean() {
        assert!(ProvisionToml::default().validate().is_empty());
    }

    #[test]
    fn test_validate_flags_bad_values() {
        let mut toml = ProvisionToml::default();
        toml.probe.max_attempts = 0;
        toml.project.name = "  ".to_string();
        toml.api.version = "2.0".to_string();
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("max_attempts")));
        assert!(warnings.iter().any(|w| w.contains("project.name")));
        assert!(warnings.iter().any(|w| w.contains("2.0")));
    }

    #[test]
    fn test_api_base_url() {
        let api = ApiSection::default();
        assert_eq!(
            api.base_url("https://looker.example.com"),
            "https://looker.example.com:19999/api/4.0"
        );
        assert_eq!(
            api.base_url("https://looker.example.com:9999/"),
            "https://looker.example.com:19999/api/4.0"
        );
        assert_eq!(
            api.base_url("looker.example.com"),
            "https://looker.example.com:19999/api/4.0"
        );

        let api = ApiSection {
            base_url: Some("http://127.0.0.1:8080/api/4.0/".to_string()),
            ..ApiSection::default()
        };
        assert_eq!(
            api.base_url("https://looker.example.com"),
            "http://127.0.0.1:8080/api/4.0"
        );
    }

    #[test]
    fn test_cli_overrides_win() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        let config = ProvisionConfig::load(dir.path().to_path_buf(), None)
            .unwrap()
            .with_cli(
                CliOverrides {
                    project_name: Some("cli-project".to_string()),
                    skip_initial_delay: true,
                    ..Default::default()
                },
                true,
            );
        assert_eq!(config.toml.project.name, "cli-project");
        assert!(config.skip_initial_delay);
        assert!(config.verbose);
    }

    #[test]
    fn test_env_override_gzr_cmd() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        // SAFETY: serialized by ENV_MUTEX
        unsafe { std::env::set_var("LOOKER_PROVISION_GZR_CMD", "/opt/gzr") };
        let config = ProvisionConfig::load(dir.path().to_path_buf(), None).unwrap();
        unsafe { std::env::remove_var("LOOKER_PROVISION_GZR_CMD") };
        assert_eq!(config.gzr_cmd(), "/opt/gzr");
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ProvisionConfig::load(dir.path().to_path_buf(), Some(&missing)).is_err());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        let config = ProvisionConfig::load(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(config.connection_file(), dir.path().join("db.json"));
        assert_eq!(
            config.resolve(Path::new("/etc/looker.ini")),
            PathBuf::from("/etc/looker.ini")
        );
        assert_eq!(config.runs_dir(), dir.path().join(".looker-provision/runs"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/keys"), Some(PathBuf::from("/abs/keys")));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.ssh"), Some(home.join(".ssh")));
        }
    }

    #[test]
    fn test_step_settings_follow_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        let config = ProvisionConfig::load(dir.path().to_path_buf(), None)
            .unwrap()
            .with_cli(
                CliOverrides {
                    skip_initial_delay: true,
                    ..Default::default()
                },
                false,
            );

        assert_eq!(config.initial_delay(), Duration::ZERO);
        assert_eq!(config.backoff_schedule().max_attempts, 8);
        let mint = config.mint_options();
        assert_eq!(mint.admin_user_id, 1);
        assert_eq!(mint.artifact.output, dir.path().join("looker.ini"));
        let seed = config.seed_options();
        assert_eq!(seed.branch, "master");
        assert_eq!(seed.remote_dir, "/home/ubuntu");
        let import = config.dashboard_import();
        assert_eq!(import.file, dir.path().join("Dashboard_1_Overview.json"));
        assert_eq!(import.space_id, "1");
    }
}
