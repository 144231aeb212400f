use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use predicates::prelude::PredicateBooleanExt;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "WSAGENT_CONFIG",
    "WSAGENT_WORKSPACE_ID",
    "WSAGENT_PROJECT_NAME",
    "WSAGENT_SERVER_API_URL",
    "WSAGENT_SERVER_API_KEY",
    "WSAGENT_PROJECT_DIR",
    "WSAGENT_LOG_FORMAT",
];

fn wsagent_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wsagent"));
    cmd.env("HOME", home).env("USERPROFILE", home);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn config_prints_merged_settings_with_key_redacted() {
    let home = TempDir::new().expect("home");

    wsagent_cmd(home.path())
        .args([
            "config",
            "--workspace-id",
            "ws1",
            "--project-name",
            "app",
            "--server-api-url",
            "http://control-plane:3986",
            "--server-api-key",
            "super-secret",
        ])
        .assert()
        .success()
        .stdout(contains("workspace_id: ws1"))
        .stdout(contains("<redacted>"))
        .stdout(contains("super-secret").not())
        .stdout(contains(format!(
            "project_path: {}",
            home.path().join("app").display()
        )));
}

#[test]
fn config_reads_file_and_environment() {
    let home = TempDir::new().expect("home");
    let file = home.path().join("agent.yaml");
    fs::write(
        &file,
        "workspace_id: ws-file\nproject_name: app\nserver_api_url: http://localhost:3986\nproject_dir: /workspaces\n",
    )
    .expect("write config");

    wsagent_cmd(home.path())
        .env("WSAGENT_CONFIG", &file)
        .env("WSAGENT_PROJECT_NAME", "from-env")
        .arg("config")
        .assert()
        .success()
        .stdout(contains("workspace_id: ws-file"))
        .stdout(contains("project_name: from-env"))
        .stdout(contains("project_path: /workspaces/from-env"));
}

#[test]
fn missing_settings_are_reported() {
    let home = TempDir::new().expect("home");

    wsagent_cmd(home.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(contains("failed to load agent configuration"))
        .stderr(contains("workspace_id"));
}

#[test]
fn bad_log_format_is_rejected_by_parser() {
    let home = TempDir::new().expect("home");

    wsagent_cmd(home.path())
        .args(["config", "--log-format", "xml"])
        .assert()
        .failure()
        .stderr(contains("unknown log format 'xml'"));
}

#[test]
fn start_fails_when_control_plane_is_unreachable() {
    let home = TempDir::new().expect("home");

    wsagent_cmd(home.path())
        .args([
            "start",
            "--workspace-id",
            "ws1",
            "--project-name",
            "app",
            "--server-api-url",
            "http://127.0.0.1:1",
        ])
        .assert()
        .failure()
        .stderr(contains("agent exited with error"))
        .stderr(contains("failed to fetch workspace"));

    assert!(!home.path().join("app").exists(), "nothing cloned");
}
