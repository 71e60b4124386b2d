//! Integration tests for the `plotkeeper` binary's database-free commands.
//!
//! Each test points `XDG_CONFIG_HOME` at its own temp dir so the real
//! config file is never touched.

use std::path::Path;
use std::process::{Command, Output};

fn plotkeeper(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_plotkeeper"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("PLOTKEEPER_DATABASE_URL")
        .output()
        .expect("failed to run plotkeeper binary")
}

#[test]
fn init_writes_config_file() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = plotkeeper(
        tmp.path(),
        &["init", "--db-url", "postgresql://db:5432/plots"],
    );
    assert!(out.status.success(), "init failed: {out:?}");

    let path = tmp.path().join("plotkeeper").join("config.toml");
    let contents = std::fs::read_to_string(&path).expect("config file should exist");
    assert!(contents.contains("postgresql://db:5432/plots"));
    assert!(contents.contains("[server]"));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("plotkeeper db-init"), "unexpected output: {stdout}");
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let tmp = tempfile::TempDir::new().unwrap();

    assert!(plotkeeper(tmp.path(), &["init"]).status.success());

    let second = plotkeeper(tmp.path(), &["init", "--db-url", "postgresql://other:5432/x"]);
    assert!(!second.status.success());
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("already exists"), "unexpected stderr: {stderr}");

    let forced = plotkeeper(
        tmp.path(),
        &["init", "--force", "--db-url", "postgresql://other:5432/x"],
    );
    assert!(forced.status.success());
    let path = tmp.path().join("plotkeeper").join("config.toml");
    let contents = std::fs::read_to_string(path).unwrap();
    assert!(contents.contains("postgresql://other:5432/x"));
}

#[test]
fn help_lists_commands() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = plotkeeper(tmp.path(), &["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for cmd in ["init", "db-init", "serve", "block", "customer"] {
        assert!(stdout.contains(cmd), "help should mention {cmd}: {stdout}");
    }
}
