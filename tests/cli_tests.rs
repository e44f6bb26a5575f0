//! CLI Integration Tests for deep-research
//!
//! Runs the compiled binary against temporary configuration files. Runs that
//! need a model point at a closed local port, so they abort with an agent
//! error instead of reaching the network.

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cli(args: &[&str], working_dir: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_deep-research"));
    cmd.arg("--no-color").args(args).env("RUST_LOG", "off");

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    cmd.output().expect("Failed to execute command")
}

const UNREACHABLE_CONFIG: &str = r#"
[providers.local]
type = "ollama"
base_url = "http://127.0.0.1:9"
default_model = "llama3.1"

[models.default]
provider = "local"
model = "llama3.1"

[summarizer]
mode = "truncate"
"#;

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("research.toml");
    fs::write(&path, content).expect("Failed to write config");
    path.to_string_lossy().into_owned()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let output = run_cli(&["--help"], None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("config"));
    assert!(stdout.contains("agents"));
}

#[test]
fn test_version_command() {
    let output = run_cli(&["--version"], None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("deep-research"));
}

#[test]
fn test_run_help_lists_overrides() {
    let output = run_cli(&["run", "--help"], None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--artifacts"));
    assert!(stdout.contains("--max-rounds"));
    assert!(stdout.contains("--json"));
}

// =============================================================================
// Config and Agents Commands
// =============================================================================

#[test]
fn test_config_validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, UNREACHABLE_CONFIG);

    let output = run_cli(&["--config", &config, "config", "--validate"], None);

    assert!(output.status.success(), "validate failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("PlannerAgent"));
    assert!(stdout.contains("web_search (30s)"));
}

#[test]
fn test_config_validate_rejects_broken_reference() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!("{}\n[swarm]\nentry_agent = \"Nobody\"\n", UNREACHABLE_CONFIG),
    );

    let output = run_cli(&["--config", &config, "config", "--validate"], None);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nobody"));
}

#[test]
fn test_agents_lists_default_team() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, UNREACHABLE_CONFIG);

    let output = run_cli(&["--config", &config, "agents"], None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["PlannerAgent", "SearchAgent", "WriterAgent", "CriticAgent"] {
        assert!(stdout.contains(name), "missing {} in {}", name, stdout);
    }
    assert!(stdout.contains("web_scrape, web_search"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();

    let output = run_cli(&["run", "anything"], Some(dir.path()));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("research.toml"));
}

// =============================================================================
// Run Command
// =============================================================================

#[test]
fn test_run_with_unreachable_model_reports_abort() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, UNREACHABLE_CONFIG);
    let artifacts = dir.path().join("artifacts");

    let output = run_cli(
        &[
            "--config",
            &config,
            "run",
            "--artifacts",
            artifacts.to_str().unwrap(),
            "Survey sodium-ion batteries",
        ],
        None,
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Survey sodium-ion batteries"));
    assert!(stderr.contains("aborted: agent error"), "stderr: {}", stderr);
}

#[test]
fn test_run_json_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, UNREACHABLE_CONFIG);

    let output = run_cli(
        &[
            "--config",
            &config,
            "run",
            "--json",
            "--max-rounds",
            "3",
            "--artifacts",
            dir.path().join("artifacts").to_str().unwrap(),
            "Survey sodium-ion batteries",
        ],
        None,
    );

    assert_eq!(output.status.code(), Some(1));
    let outcome: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(outcome["final_state"]["state"], "aborted");
    assert_eq!(outcome["final_state"]["detail"]["reason"], "agent_error");
    assert_eq!(outcome["final_state"]["detail"]["agent"], "PlannerAgent");
    assert_eq!(outcome["state"]["round_count"], 1);
    assert_eq!(
        outcome["transcript"][0]["content"],
        "Survey sodium-ion batteries"
    );
    assert!(outcome["final_artifact"].is_null());
}
