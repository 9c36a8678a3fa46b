use serde_json::json;
use tempfile::TempDir;

use mcpick_core::config::LiveConfig;
use mcpick_core::mcp::ServerDefinition;
use mcpick_core::profile::{ProfileError, ProfileStore};

fn store(temp: &TempDir) -> ProfileStore {
    ProfileStore::new(temp.path().join("profiles"))
}

fn write(store: &ProfileStore, file: &str, value: serde_json::Value) {
    std::fs::create_dir_all(store.dir()).unwrap();
    std::fs::write(store.dir().join(file), serde_json::to_string(&value).unwrap()).unwrap();
}

#[test]
fn wrapped_and_bare_profiles_load_the_same() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    let servers = json!({"db": {"command": "uvx", "args": ["mcp-sqlite"]}});
    write(&store, "wrapped.json", json!({"mcpServers": servers.clone()}));
    write(&store, "bare.json", servers);

    let wrapped = store.load("wrapped").unwrap();
    let bare = store.load("bare").unwrap();

    assert_eq!(wrapped.servers, bare.servers);
    assert_eq!(wrapped.server_names(), vec!["db"]);
}

#[test]
fn missing_profile_is_not_found() {
    let temp = TempDir::new().unwrap();
    let err = store(&temp).load("ghost").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProfileError>(),
        Some(ProfileError::NotFound { name, .. }) if name == "ghost"
    ));
}

#[test]
fn invalid_profile_is_a_validation_error() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    write(&store, "bad.json", json!({"mcpServers": {"x": {"type": "http"}}}));

    let err = store.load("bad").unwrap_err();
    assert!(format!("{err:#}").contains("`url` is required"));
}

#[test]
fn save_rejects_empty_set() {
    let temp = TempDir::new().unwrap();
    let err = store(&temp)
        .save("empty", &LiveConfig::default())
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<ProfileError>(), Some(ProfileError::Empty)));
}

#[test]
fn save_sanitizes_name_and_lists_sorted() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    let config = LiveConfig::from_servers(vec![
        ServerDefinition::stdio("a", "a", Vec::new()),
        ServerDefinition::http("b", "https://b"),
    ]);

    let info = store.save("my work/setup", &config).unwrap();
    assert_eq!(info.name, "my_work_setup");
    assert_eq!(info.path, store.dir().join("my_work_setup.json"));

    store.save("alpha", &LiveConfig::from_servers(vec![ServerDefinition::stdio("c", "c", Vec::new())])).unwrap();
    std::fs::write(store.dir().join("zzz.json"), "not json").unwrap();
    std::fs::write(store.dir().join("readme.txt"), "ignored").unwrap();

    let listed: Vec<_> = store
        .list()
        .unwrap()
        .into_iter()
        .map(|profile| (profile.name, profile.server_count))
        .collect();
    assert_eq!(
        listed,
        vec![("alpha".to_string(), 1), ("my_work_setup".to_string(), 2)]
    );
}

#[test]
fn listed_names_load_even_when_not_sanitized() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    write(&store, "My Work.json", json!({"mcpServers": {"gh": {"command": "gh-mcp"}}}));

    let listed: Vec<_> = store.list().unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(listed, vec!["My Work"]);

    let profile = store.load(&listed[0]).unwrap();
    assert_eq!(profile.server_names(), vec!["gh"]);
}

#[test]
fn path_like_names_never_escape_the_profiles_dir() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    std::fs::write(temp.path().join("outside.json"), r#"{"x": {"command": "x"}}"#).unwrap();

    let err = store.load("../outside").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProfileError>(),
        Some(ProfileError::NotFound { .. })
    ));
}
