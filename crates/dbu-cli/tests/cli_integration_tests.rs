//! CLI integration tests
//!
//! Runs the `dbu` binary against throwaway embedded installations.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const ENV_VARS: [&str; 5] = [
    "SYNCWERK_UPGRADE_DIR",
    "CCNET_CONF_DIR",
    "SYNCWERK_CONF_DIR",
    "SYNCWERK_CENTRAL_CONF_DIR",
    "SYNCWERK_SKIP_DB_UPGRADE",
];

/// Path to the compiled dbu binary (resolved at compile time)
fn dbu_bin() -> String {
    env!("CARGO_BIN_EXE_dbu").to_string()
}

struct Installation {
    dir: TempDir,
}

impl Installation {
    fn embedded() -> Self {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["top/server/upgrade/sql", "ccnet", "data", "conf"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        let conf = dir.path().join("conf");
        std::fs::write(conf.join("ccnet.conf"), "[General]\nSERVICE_URL = http://localhost\n").unwrap();
        std::fs::write(conf.join("server.conf"), "[fileserver]\nport = 8082\n").unwrap();
        std::fs::write(
            conf.join("restapi.conf"),
            "[database]\nENGINE = django.db.backends.sqlite3\n",
        )
        .unwrap();
        Self { dir }
    }

    /// Pre-5.0 layout with every config next to its subsystem's data
    fn legacy() -> Self {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["top/server/upgrade/sql", "ccnet", "data"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        std::fs::write(dir.path().join("ccnet/ccnet.conf"), "[General]\nSERVICE_URL = http://localhost\n").unwrap();
        std::fs::write(dir.path().join("data/server.conf"), "[fileserver]\nport = 8082\n").unwrap();
        std::fs::write(
            dir.path().join("top/restapi.conf"),
            "[database]\nENGINE = django.db.backends.sqlite3\n",
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn script(&self, relative: &str, sql: &str) {
        let path = self.path("top/server/upgrade/sql").join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, sql).unwrap();
    }

    /// Command with the installation passed through environment variables
    fn command(&self) -> Command {
        let mut cmd = Command::new(dbu_bin());
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.env("SYNCWERK_UPGRADE_DIR", self.path("top/server/upgrade"))
            .env("CCNET_CONF_DIR", self.path("ccnet"))
            .env("SYNCWERK_CONF_DIR", self.path("data"))
            .env("SYNCWERK_CENTRAL_CONF_DIR", self.path("conf"));
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to run dbu")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ── dbu migrate ────────────────────────────────────────────────────────

#[test]
fn test_migrate_embedded_installation() {
    let install = Installation::embedded();
    install.script(
        "5.0.0/sqlite3/syncwerk.sql",
        "CREATE TABLE IF NOT EXISTS RepoInfo (repo_id TEXT);",
    );

    let output = install.run(&["migrate", "5.0.0"]);

    assert!(
        output.status.success(),
        "migrate should succeed.\nstdout: {}\nstderr: {}",
        stdout(&output),
        stderr(&output)
    );
    assert!(stdout(&output).contains("Database upgrade to 5.0.0 (SQLite3) applied 1 script(s)"));
    assert!(stderr(&output).contains("updating syncwerk database..."));
    assert!(install.path("data/syncwerk.db").exists());
}

#[test]
fn test_migrate_without_scripts_succeeds() {
    let install = Installation::embedded();

    let output = install.run(&["migrate", "5.0.0"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("applied 0 script(s)"));
    assert!(!install.path("ccnet/ccnet.db").exists());
}

#[test]
fn test_migrate_failure_exits_with_one() {
    let install = Installation::embedded();
    install.script(
        "5.0.0/sqlite3/ccnet.sql",
        "ALTER TABLE Missing ADD COLUMN x INTEGER;",
    );

    let output = install.run(&["migrate", "5.0.0"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Database upgrade to 5.0.0 failed"), "stderr: {err}");
    assert!(err.contains("[U002]"), "stderr: {err}");
}

#[test]
fn test_migrate_failure_json() {
    let install = Installation::embedded();
    install.script(
        "5.0.0/sqlite3/ccnet.sql",
        "ALTER TABLE Missing ADD COLUMN x INTEGER;",
    );

    let output = install.run(&["migrate", "5.0.0", "--output", "json"]);

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["version"], "5.0.0");
}

#[test]
fn test_migrate_dry_run_json() {
    let install = Installation::embedded();
    install.script("5.0.0/sqlite3/ccnet.sql", "CREATE TABLE LDAPConfig (cfg_group TEXT);");

    let output = install.run(&["migrate", "5.0.0", "--dry-run", "--output", "json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["backend"], "embedded");
    assert_eq!(json["outcomes"][0]["target"], "ccnet");
    assert_eq!(json["outcomes"][0]["status"], "planned");
    assert!(!install.path("ccnet/ccnet.db").exists());
}

#[test]
fn test_skip_flag_short_circuits() {
    let install = Installation::embedded();
    install.script(
        "5.0.0/sqlite3/ccnet.sql",
        "ALTER TABLE Missing ADD COLUMN x INTEGER;",
    );

    let output = install
        .command()
        .env("SYNCWERK_SKIP_DB_UPGRADE", "on")
        .args(["migrate", "5.0.0"])
        .output()
        .expect("Failed to run dbu");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output)
        .contains("Database upgrade skipped because SYNCWERK_SKIP_DB_UPGRADE=on"));
    assert!(!install.path("ccnet/ccnet.db").exists());
}

#[test]
fn test_missing_ccnet_dir_is_fatal() {
    let install = Installation::embedded();

    let output = install
        .command()
        .env_remove("CCNET_CONF_DIR")
        .args(["migrate", "5.0.0"])
        .output()
        .expect("Failed to run dbu");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("CCNET_CONF_DIR"));
}

#[test]
fn test_invalid_version_is_fatal() {
    let install = Installation::embedded();

    let output = install.run(&["migrate", "five"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("[C006]"));
}

#[test]
fn test_migrate_relocates_legacy_config() {
    let install = Installation::legacy();
    install.script("5.0.0/sqlite3/ccnet.sql", "CREATE TABLE LDAPConfig (cfg_group TEXT);");

    let output = install.run(&["migrate", "5.0.0", "--relocate-config"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("moved"), "stdout: {out}");
    assert!(out.contains("Database upgrade to 5.0.0 (SQLite3) applied 1 script(s)"));
    assert!(install.path("conf/server.conf").is_file());
    assert!(install.path("ccnet/ccnet.db").exists());
}

// ── dbu relocate-config ────────────────────────────────────────────────

#[test]
fn test_relocate_config_json_then_rerun() {
    let install = Installation::legacy();

    let output = install.run(&["relocate-config", "--output", "json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["status"], "moved");
    assert_eq!(json["files"].as_array().unwrap().len(), 3);
    let stub = std::fs::read_to_string(install.path("data/server.conf")).unwrap();
    assert!(stub.starts_with("# This file has been moved to"), "stub: {stub}");

    let rerun = install.run(&["relocate-config"]);
    assert!(rerun.status.success(), "stderr: {}", stderr(&rerun));
    assert!(stdout(&rerun).contains("Config already relocated"));
}

#[test]
fn test_relocate_config_with_missing_file_fails() {
    let install = Installation::legacy();
    std::fs::remove_file(install.path("data/server.conf")).unwrap();

    let output = install.run(&["relocate-config"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("[C001]"), "stderr: {}", stderr(&output));
    assert!(!install.path("conf").exists());
}

// ── dbu detect ─────────────────────────────────────────────────────────

#[test]
fn test_detect_reports_backend() {
    let install = Installation::embedded();

    let output = install.run(&["detect", "5.0.0", "--output", "json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["backend"], "embedded");
    assert!(json["configs"]["ccnet"]
        .as_str()
        .unwrap()
        .ends_with("ccnet.conf"));
    assert!(json["connections"].as_object().unwrap().is_empty());
}
