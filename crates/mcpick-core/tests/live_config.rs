use serde_json::{Value, json};
use tempfile::TempDir;

use mcpick_core::config::ConfigReconciler;
use mcpick_core::mcp::ServerDefinition;

fn read(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn missing_host_config_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    let reconciler = ConfigReconciler::new(temp.path().join(".claude.json"));

    let live = reconciler.read_enabled().unwrap();
    assert!(live.is_empty());
    assert!(live.other.is_empty());
}

#[test]
fn write_enabled_preserves_other_keys_and_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".claude.json");
    std::fs::write(
        &path,
        r#"{"numStartups": 4, "mcpServers": {"old": {"command": "x"}}, "projects": {"/p": {}}}"#,
    )
    .unwrap();
    let reconciler = ConfigReconciler::new(path.clone());

    reconciler.write_enabled(&[]).unwrap();

    let doc = read(&path);
    assert_eq!(doc["numStartups"], 4);
    assert_eq!(doc["projects"], json!({"/p": {}}));
    assert_eq!(doc["mcpServers"], json!({}));
    let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["numStartups", "mcpServers", "projects"]);
}

#[test]
fn write_then_read_round_trips_definitions() {
    let temp = TempDir::new().unwrap();
    let reconciler = ConfigReconciler::new(temp.path().join(".claude.json"));
    let servers = vec![
        ServerDefinition::stdio("fs", "npx", vec!["-y".to_string(), "fs".to_string()])
            .with_description("Filesystem"),
        ServerDefinition::http("api", "https://api.example/mcp"),
    ];

    reconciler.write_enabled(&servers).unwrap();

    assert_eq!(reconciler.read_enabled().unwrap().servers, servers);
}

#[test]
fn unparsable_host_config_fails_read_but_not_write() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".claude.json");
    std::fs::write(&path, "{ not json").unwrap();
    let reconciler = ConfigReconciler::new(path.clone());

    assert!(reconciler.read_enabled().is_err());

    reconciler
        .write_enabled(&[ServerDefinition::stdio("a", "a", Vec::new())])
        .unwrap();
    assert_eq!(read(&path), json!({"mcpServers": {"a": {"command": "a", "args": []}}}));
}

#[test]
fn invalid_entry_in_host_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".claude.json");
    std::fs::write(&path, r#"{"mcpServers": {"broken": {"type": "sse"}}}"#).unwrap();

    let err = ConfigReconciler::new(path).read_enabled().unwrap_err();
    assert!(format!("{err:#}").contains("server 'broken'"));
}

#[test]
fn write_enabled_at_nested_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".claude.json");
    std::fs::write(&path, r#"{"projects": {"/work": {"allowedTools": []}}}"#).unwrap();
    let reconciler = ConfigReconciler::new(path.clone());

    reconciler
        .write_enabled_at(
            &["projects", "/work", "mcpServers"],
            &[ServerDefinition::stdio("local", "run", Vec::new())],
        )
        .unwrap();

    let doc = read(&path);
    assert_eq!(doc["projects"]["/work"]["allowedTools"], json!([]));
    assert_eq!(
        doc["projects"]["/work"]["mcpServers"]["local"]["command"],
        "run"
    );
    assert!(doc.get("mcpServers").is_none());
}

#[cfg(unix)]
#[test]
fn write_enabled_keeps_private_host_config_private() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".claude.json");
    std::fs::write(&path, r#"{"oauthAccount": {"email": "u@example.com"}}"#).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();

    ConfigReconciler::new(path.clone())
        .write_enabled(&[ServerDefinition::stdio("fs", "node", Vec::new())])
        .unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(read(&path)["oauthAccount"]["email"], "u@example.com");
}
