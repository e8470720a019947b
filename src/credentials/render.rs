//! The rendered configuration artifact (`looker.ini`) holding host, id and secret.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use tracing::warn;

use super::ApiCredentials;

/// Used when no template file is present.
pub const DEFAULT_TEMPLATE: &str = "[Looker]
base_url={{ url }}:19999
client_id={{ client_id }}
client_secret={{ client_secret }}
verify_ssl=True
";

#[derive(Debug, Clone)]
pub struct ArtifactOptions {
    pub template: PathBuf,
    pub output: PathBuf,
}

/// Render a template with the `url`, `client_id` and `client_secret` placeholders.
pub fn render_artifact(template: &str, url: &str, credentials: &ApiCredentials) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.render_str(
        template,
        context! {
            url => url,
            client_id => &credentials.client_id,
            client_secret => &credentials.client_secret,
        },
    )
    .context("Failed to render configuration template")
}

fn load_template(path: &Path) -> Result<String> {
    if !path.exists() {
        warn!(path = %path.display(), "Template not found, using built-in template");
        return Ok(DEFAULT_TEMPLATE.to_string());
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template: {}", path.display()))
}

/// Render the artifact and write it to `options.output`, readable by the owner only.
pub fn write_artifact(
    url: &str,
    credentials: &ApiCredentials,
    options: &ArtifactOptions,
) -> Result<PathBuf> {
    let template = load_template(&options.template)?;
    let rendered = render_artifact(&template, url, credentials)?;

    if let Some(parent) = options.output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&options.output, rendered)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&options.output, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict {}", options.output.display()))?;
    }

    Ok(options.output.clone())
}

/// Read `client_id` / `client_secret` back out of a rendered artifact.
///
/// Lets later commands reuse credentials minted by an earlier run.
pub fn read_artifact(path: &Path) -> Result<ApiCredentials> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut client_id = None;
    let mut client_secret = None;
    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "client_id" => client_id = Some(value.trim().to_string()),
            "client_secret" => client_secret = Some(value.trim().to_string()),
            _ => {}
        }
    }

    match (client_id, client_secret) {
        (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
            Ok(ApiCredentials::new(id, secret))
        }
        _ => anyhow::bail!(
            "{} does not contain client_id and client_secret",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn creds() -> ApiCredentials {
        ApiCredentials::new("abc", "xyz")
    }

    #[test]
    fn renders_all_placeholders() {
        let out = render_artifact(
            "[Looker]\nbase_url={{ url }}\nclient_id={{client_id}}\nclient_secret={{ client_secret }}\n",
            "https://looker.example.com",
            &creds(),
        )
        .unwrap();
        assert_eq!(
            out,
            "[Looker]\nbase_url=https://looker.example.com\nclient_id=abc\nclient_secret=xyz\n"
        );
    }

    #[test]
    fn invalid_template_is_an_error() {
        assert!(render_artifact("{{ url ", "u", &creds()).is_err());
    }

    #[test]
    fn writes_from_template_file() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("ini_template.ini");
        std::fs::write(&template, "id={{ client_id }}\n").unwrap();
        let options = ArtifactOptions {
            template,
            output: dir.path().join("out/looker.ini"),
        };
        let path = write_artifact("https://h", &creds(), &options).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "id=abc\n");
    }

    #[test]
    fn falls_back_to_default_template() {
        let dir = tempdir().unwrap();
        let options = ArtifactOptions {
            template: dir.path().join("absent.ini"),
            output: dir.path().join("looker.ini"),
        };
        let path = write_artifact("https://h", &creds(), &options).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("[Looker]\nbase_url=https://h:19999\n"));
    }

    #[cfg(unix)]
    #[test]
    fn artifact_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let options = ArtifactOptions {
            template: dir.path().join("absent.ini"),
            output: dir.path().join("looker.ini"),
        };
        let path = write_artifact("https://h", &creds(), &options).unwrap();
        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn read_artifact_round_trips_default_template() {
        let dir = tempdir().unwrap();
        let options = ArtifactOptions {
            template: dir.path().join("absent.ini"),
            output: dir.path().join("looker.ini"),
        };
        let path = write_artifact("https://h", &creds(), &options).unwrap();
        assert_eq!(read_artifact(&path).unwrap(), creds());
    }

    #[test]
    fn read_artifact_without_secret_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("looker.ini");
        std::fs::write(&path, "[Looker]\nclient_id=abc\n").unwrap();
        assert!(read_artifact(&path).is_err());
    }
}
