//! Integration tests for the looker-provision CLI.
//!
//! Everything here runs offline: commands that would reach an instance are
//! pointed at an unreachable address and checked for how they fail.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a looker-provision Command isolated from the caller's environment
fn provision() -> Command {
    let mut cmd = cargo_bin_cmd!("looker-provision");
    for var in [
        "LOOKER_CLIENT_ID",
        "LOOKER_CLIENT_SECRET",
        "LOOKER_PROVISION_OUTPUTS",
        "LOOKER_PROVISION_SOURCE_REPO",
        "LOOKER_PROVISION_GZR_CMD",
        "LOOKER_PROVISION_SSH_CMD",
        "LOOKER_PROVISION_SCP_CMD",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn outputs_json(host_url: &str, nfs_flag: u8) -> String {
    format!(
        r#"{{
  "host_url": {{"value": "{}"}},
  "user": {{"value": "admin@example.com"}},
  "pass": {{"value": "hunter2"}},
  "key": {{"value": "looker.pem"}},
  "node_public_dns": {{"value": ["node-1.example.com"]}},
  "nfs_flag": {{"value": {}}}
}}"#,
        host_url, nfs_flag
    )
}

/// A working directory with an outputs file pointing at an unreachable host.
fn create_workspace(nfs_flag: u8) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("output.json"),
        outputs_json("http://127.0.0.1:1", nfs_flag),
    )
    .unwrap();
    fs::write(
        dir.path().join("provision.toml"),
        "[probe]\ninitial_delay_secs = 0\nmax_attempts = 1\nbase_delay_ms = 1\n\n[api]\ntimeout_secs = 2\n",
    )
    .unwrap();
    dir
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help_lists_pipeline_steps() {
        provision()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("run"))
            .stdout(predicate::str::contains("mint"))
            .stdout(predicate::str::contains("register-models"))
            .stdout(predicate::str::contains("import-dashboard"));
    }

    #[test]
    fn test_version() {
        provision()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("looker-provision"));
    }

    #[test]
    fn test_seed_requires_project_id() {
        provision()
            .arg("seed")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--project-id"));
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config_commands {
    use super::*;

    #[test]
    fn test_config_init_creates_file_once() {
        let dir = TempDir::new().unwrap();

        provision()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created provision.toml"));

        let content = fs::read_to_string(dir.path().join("provision.toml")).unwrap();
        assert!(content.contains("[probe]"));
        assert!(content.contains("thelook"));

        provision()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_show_defaults() {
        let dir = TempDir::new().unwrap();

        provision()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No provision.toml found"))
            .stdout(predicate::str::contains("max_attempts = 8"))
            .stdout(predicate::str::contains("gzr_cmd = \"gzr\""));
    }

    #[test]
    fn test_config_show_masks_deploy_secret() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("provision.toml"),
            "[source]\ndeploy_secret = \"s3cret-value\"\n",
        )
        .unwrap();

        provision()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("s3cret-value").not());
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("provision.toml"),
            "[probe]\nmax_attempts = 0\n\n[api]\nversion = \"2.0\"\n",
        )
        .unwrap();

        provision()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("max_attempts is 0"))
            .stdout(predicate::str::contains("Unsupported api.version"));
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();

        provision()
            .current_dir(dir.path())
            .args(["--config", "nope.toml", "config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read config file"));
    }

    #[test]
    fn test_env_overrides_gzr_cmd() {
        let dir = TempDir::new().unwrap();

        provision()
            .current_dir(dir.path())
            .env("LOOKER_PROVISION_GZR_CMD", "/opt/bin/gzr")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("gzr_cmd = \"/opt/bin/gzr\""));
    }
}

// =============================================================================
// Offline Step Tests
// =============================================================================

mod steps {
    use super::*;

    #[test]
    fn test_destination_shared_storage() {
        let dir = create_workspace(1);

        provision()
            .current_dir(dir.path())
            .args(["destination", "--project-id", "proj42"])
            .assert()
            .success()
            .stdout("/mnt/lookerfiles/bare_models/proj42.git\n");
    }

    #[test]
    fn test_destination_local_storage() {
        let dir = create_workspace(0);

        provision()
            .current_dir(dir.path())
            .args(["destination", "--project-id", "proj42"])
            .assert()
            .success()
            .stdout("/home/looker/looker/bare_models/proj42.git\n");
    }

    #[test]
    fn test_destination_with_outputs_flag() {
        let dir = TempDir::new().unwrap();
        let outputs = dir.path().join("infra.json");
        fs::write(&outputs, outputs_json("https://looker.example.com", 1)).unwrap();

        provision()
            .current_dir(dir.path())
            .args(["--outputs", "infra.json", "destination", "--project-id", "p"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/mnt/lookerfiles/bare_models/p.git"));
    }

    #[test]
    fn test_missing_outputs_file_fails() {
        let dir = TempDir::new().unwrap();

        provision()
            .current_dir(dir.path())
            .args(["destination", "--project-id", "proj42"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read instance outputs"));
    }

    #[test]
    fn test_bad_nfs_flag_fails() {
        let dir = create_workspace(3);

        provision()
            .current_dir(dir.path())
            .args(["destination", "--project-id", "proj42"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("nfs_flag"));
    }

    #[test]
    fn test_register_connection_without_credentials_fails() {
        let dir = create_workspace(0);

        provision()
            .current_dir(dir.path())
            .arg("register-connection")
            .assert()
            .failure()
            .stderr(predicate::str::contains("looker-provision mint"));
    }

    #[test]
    fn test_half_credentials_rejected() {
        let dir = create_workspace(0);

        provision()
            .current_dir(dir.path())
            .args(["create-project", "--client-id", "abc"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("must be given together"));
    }

    #[test]
    fn test_seed_without_key_fails() {
        let dir = create_workspace(0);
        let keys = dir.path().join("keys");
        fs::create_dir(&keys).unwrap();
        fs::write(
            dir.path().join("provision.toml"),
            format!("[ssh]\nkey_dir = \"{}\"\n", keys.display()),
        )
        .unwrap();

        provision()
            .current_dir(dir.path())
            .args(["seed", "--project-id", "proj42"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("SSH key not found"));
    }

    #[test]
    fn test_probe_unreachable_host_exhausts() {
        let dir = create_workspace(0);

        provision()
            .current_dir(dir.path())
            .args(["probe", "--skip-initial-delay"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("did not become alive after 1 attempts"));
    }

    #[test]
    fn test_run_failure_writes_report() {
        let dir = create_workspace(0);

        provision()
            .current_dir(dir.path())
            .args(["run", "--skip-initial-delay"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Step 'probe' failed"));

        let runs = dir.path().join(".looker-provision/runs");
        let reports: Vec<_> = fs::read_dir(&runs).unwrap().collect();
        assert_eq!(reports.len(), 1);
        let content = fs::read_to_string(reports[0].as_ref().unwrap().path()).unwrap();
        assert!(content.contains("\"probe\""));
        assert!(content.contains("\"failed\""));
    }
}
