//! Remote half of seeding: a shell session on the instance and the ordered
//! list of commands that turn the uploaded archive into a pushed repository.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{RemoteError, SeedError};
use crate::instance::InstanceDescriptor;

use super::archive::{ARCHIVE_NAME, ARCHIVE_ROOT};

/// Identity used for the seeding commit on the remote host.
const COMMIT_USER: &str = "looker-provision";
const COMMIT_EMAIL: &str = "looker-provision@localhost";

/// Captured result of one remote command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// An authenticated shell on the target host.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Copy `local` into `remote_dir` on the host.
    async fn upload(&self, local: &Path, remote_dir: &str) -> Result<(), RemoteError>;

    /// Run `command` through the remote login shell.
    async fn run(&self, command: &str) -> Result<CommandOutput, RemoteError>;
}

/// Shell session backed by the system `ssh` and `scp` binaries.
#[derive(Debug, Clone)]
pub struct OpenSshShell {
    ssh_cmd: String,
    scp_cmd: String,
    destination: String,
    key: PathBuf,
}

impl OpenSshShell {
    pub fn new(
        ssh_cmd: impl Into<String>,
        scp_cmd: impl Into<String>,
        user: &str,
        host: &str,
        key: PathBuf,
    ) -> Self {
        Self {
            ssh_cmd: ssh_cmd.into(),
            scp_cmd: scp_cmd.into(),
            destination: format!("{}@{}", user, host),
            key,
        }
    }

    /// Build a session against the instance's first public host.
    ///
    /// The private key named in the descriptor is looked up in `key_dir`.
    pub fn for_instance(
        descriptor: &InstanceDescriptor,
        user: &str,
        key_dir: Option<PathBuf>,
        ssh_cmd: impl Into<String>,
        scp_cmd: impl Into<String>,
    ) -> Result<Self, SeedError> {
        let host = descriptor.primary_host().ok_or(SeedError::NoPublicHost)?;
        let key = resolve_key(key_dir, &descriptor.key)?;
        Ok(Self::new(ssh_cmd, scp_cmd, user, host, key))
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    fn common_args(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.key.display().to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
        ]
    }
}

#[async_trait]
impl RemoteShell for OpenSshShell {
    async fn upload(&self, local: &Path, remote_dir: &str) -> Result<(), RemoteError> {
        let target = format!("{}:{}/", self.destination, remote_dir.trim_end_matches('/'));
        debug!(local = %local.display(), target = %target, "scp");
        let output = Command::new(&self.scp_cmd)
            .args(self.common_args())
            .arg(local)
            .arg(&target)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RemoteError::Spawn {
                program: self.scp_cmd.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RemoteError::Transfer {
                local: local.to_path_buf(),
                remote: target,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        debug!(destination = %self.destination, command, "ssh");
        let output = Command::new(&self.ssh_cmd)
            .args(self.common_args())
            .arg(&self.destination)
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RemoteError::Spawn {
                program: self.ssh_cmd.clone(),
                source,
            })?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Locate `key_name` inside `key_dir`; the file must exist.
pub fn resolve_key(key_dir: Option<PathBuf>, key_name: &str) -> Result<PathBuf, SeedError> {
    let key_dir = key_dir.ok_or(SeedError::NoHomeDir)?;
    let key = key_dir.join(key_name);
    if !key.is_file() {
        return Err(SeedError::MissingKey(key));
    }
    Ok(key)
}

/// One named command in the remote sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStep {
    pub name: &'static str,
    pub command: String,
}

impl RemoteStep {
    fn new(name: &'static str, command: String) -> Self {
        Self { name, command }
    }
}

/// Inputs for [`seed_steps`].
#[derive(Debug, Clone)]
pub struct PushPlan<'a> {
    pub remote_dir: &'a str,
    pub bare_repo: &'a str,
    pub branch: &'a str,
    pub commit_message: &'a str,
}

/// The ordered commands that extract the archive and push it into the bare repo.
///
/// The sync step rebases onto the bare repo's branch when it already has one
/// (for example an auto-created initial commit) and is a no-op when the bare
/// repo is empty. `git ls-remote --exit-code` returns 2 for "no such ref";
/// any other non-zero status is a real failure and fails the step.
pub fn seed_steps(plan: &PushPlan<'_>) -> Vec<RemoteStep> {
    let remote_dir = plan.remote_dir.trim_end_matches('/');
    let work = format!("cd {}/{} && ", quote(remote_dir), ARCHIVE_ROOT);
    let branch = quote(plan.branch);

    vec![
        RemoteStep::new(
            "extract",
            format!("cd {} && tar zxvf {}", quote(remote_dir), ARCHIVE_NAME),
        ),
        RemoteStep::new(
            "init",
            format!(
                "{}git init && git symbolic-ref HEAD refs/heads/{}",
                work, branch
            ),
        ),
        RemoteStep::new(
            "add-remote",
            format!("{}git remote add origin {}", work, quote(plan.bare_repo)),
        ),
        RemoteStep::new(
            "commit",
            format!(
                "{}git add --all && git -c user.name={} -c user.email={} commit -m {}",
                work,
                COMMIT_USER,
                COMMIT_EMAIL,
                quote(plan.commit_message)
            ),
        ),
        RemoteStep::new(
            "sync",
            format!(
                "{work}if git ls-remote --exit-code --heads origin {branch} >/dev/null; \
                 then git fetch origin && git rebase origin/{branch}; \
                 else rc=$?; [ $rc -eq 2 ] || exit $rc; fi"
            ),
        ),
        RemoteStep::new("push", format!("{}sudo git push origin {}", work, branch)),
    ]
}

/// Run `steps` in order, stopping at the first non-zero exit.
pub async fn run_steps(shell: &dyn RemoteShell, steps: &[RemoteStep]) -> Result<(), RemoteError> {
    for (i, step) in steps.iter().enumerate() {
        info!(step = step.name, index = i + 1, total = steps.len(), "Running remote step");
        let output = shell.run(&step.command).await?;
        if !output.success() {
            return Err(RemoteError::StepFailed {
                step: step.name.to_string(),
                command: step.command.clone(),
                status: output.status,
                stderr: output.stderr,
            });
        }
    }
    Ok(())
}

/// Single-quote `value` for a POSIX shell.
fn quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:@".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
