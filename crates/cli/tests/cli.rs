//! End-to-end tests running the `stavax` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

fn stavax_binary() -> PathBuf {
	let mut path = std::env::current_exe().unwrap();
	path.pop();
	path.pop();
	path.push("stavax");
	path
}

fn run(storage: &Path, args: &[&str]) -> (bool, Value, String) {
	let output = Command::new(stavax_binary())
		.env_remove("RUST_LOG")
		.arg("--storage")
		.arg(storage)
		.args(args)
		.output()
		.expect("failed to execute stavax");

	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).to_string();
	let parsed = serde_json::from_str::<Value>(&stdout).unwrap_or_else(|_| Value::String(stdout));
	(output.status.success(), parsed, stderr)
}

#[test]
fn link_prints_bot_url() {
	let dir = tempfile::tempdir().unwrap();
	let (ok, json, _) = run(&dir.path().join("storage.json"), &["link", "abc123"]);

	assert!(ok);
	assert_eq!(json["ok"], true);
	assert_eq!(json["command"], "link");
	assert_eq!(json["data"], "https://t.me/stavax_account_bot/app?startapp=sid%3Dabc123");
}

#[test]
fn link_text_format_prints_bare_url() {
	let dir = tempfile::tempdir().unwrap();
	let (ok, out, _) = run(&dir.path().join("storage.json"), &["-f", "text", "link", "abc123"]);

	assert!(ok);
	assert_eq!(
		out.as_str().map(str::trim),
		Some("https://t.me/stavax_account_bot/app?startapp=sid%3Dabc123")
	);
}

#[test]
fn device_id_is_persisted_between_runs() {
	let dir = tempfile::tempdir().unwrap();
	let storage = dir.path().join("nested").join("storage.json");

	let (ok, first, _) = run(&storage, &["device-id"]);
	assert!(ok);
	let id = first["data"]["deviceId"].as_str().unwrap().to_string();
	assert_eq!(id.len(), 64);
	assert!(storage.exists());

	let (_, second, _) = run(&storage, &["device-id"]);
	assert_eq!(second["data"]["deviceId"], id.as_str());
}

#[test]
fn session_new_without_project_id_is_config_error() {
	let dir = tempfile::tempdir().unwrap();
	let (ok, json, stderr) = run(&dir.path().join("storage.json"), &["session", "new"]);

	assert!(!ok);
	assert_eq!(json["ok"], false);
	assert_eq!(json["command"], "session new");
	assert_eq!(json["error"]["code"], "CONFIG_ERROR");
	assert!(stderr.contains("projectId is required"), "stderr: {stderr}");
}

#[test]
fn invalid_address_is_rejected_before_any_request() {
	let dir = tempfile::tempdir().unwrap();
	let (ok, json, _) = run(
		&dir.path().join("storage.json"),
		&[
			"--project-id",
			"p1",
			"smart-session",
			"find",
			"--from",
			"not-an-address",
			"--chain-id",
			"1",
			"--to",
			"0x2222222222222222222222222222222222222222",
		],
	);

	assert!(!ok);
	assert_eq!(json["error"]["code"], "INVALID_INPUT");
	assert_eq!(json["error"]["details"]["field"], "from");
}

#[test]
fn config_file_supplies_bot_url() {
	let dir = tempfile::tempdir().unwrap();
	let config = dir.path().join("stavax.json");
	std::fs::write(&config, r#"{"projectId":"p1","tgBotWebAppURL":"https://t.me/other_bot/app"}"#).unwrap();

	let (ok, json, _) = run(
		&dir.path().join("storage.json"),
		&["--config", config.to_str().unwrap(), "link", "s1"],
	);

	assert!(ok);
	assert_eq!(json["data"], "https://t.me/other_bot/app?startapp=sid%3Ds1");
}
