#![allow(missing_docs)]

use std::path::PathBuf;

use tempfile::TempDir;

use voyage_agent::load_runtime_settings_from_paths;

fn write_file(path: PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write yaml");
}

#[test]
fn merge_user_overrides_system() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("conf/settings.yaml");
    let user = tmp.path().join(".config/voyage/settings.yaml");

    write_file(
        system.clone(),
        r#"
gateway:
  bind: "0.0.0.0:3978"
  turn_timeout_secs: 30
nlu:
  endpoint: "https://system.example/recognize"
  api_key: "system-key"
  min_intent_score: 0.5
  timeout_secs: 10
store:
  valkey_url: "redis://127.0.0.1:6379"
  key_prefix: "system-prefix"
  ttl_secs: 3600
"#,
    );
    write_file(
        user.clone(),
        r#"
nlu:
  endpoint: "https://user.example/recognize"
store:
  key_prefix: "user-prefix"
"#,
    );

    let settings = load_runtime_settings_from_paths(&system, &user);

    // User values win where present.
    assert_eq!(
        settings.nlu.endpoint.as_deref(),
        Some("https://user.example/recognize")
    );
    assert_eq!(settings.store.key_prefix.as_deref(), Some("user-prefix"));

    // System values survive where the user file is silent.
    assert_eq!(settings.nlu.api_key.as_deref(), Some("system-key"));
    assert_eq!(settings.gateway.bind.as_deref(), Some("0.0.0.0:3978"));
    assert_eq!(settings.gateway.turn_timeout_secs, Some(30));
    assert_eq!(
        settings.store.valkey_url.as_deref(),
        Some("redis://127.0.0.1:6379")
    );
    assert_eq!(settings.store.ttl_secs, Some(3600));
}

#[test]
fn missing_files_yield_defaults() {
    let tmp = TempDir::new().expect("tempdir");
    let settings = load_runtime_settings_from_paths(
        &tmp.path().join("conf/settings.yaml"),
        &tmp.path().join(".config/voyage/settings.yaml"),
    );
    assert!(settings.nlu.endpoint.is_none());
    assert!(settings.store.valkey_url.is_none());
    assert!(settings.gateway.bind.is_none());
}

#[test]
fn invalid_yaml_is_ignored_not_fatal() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("conf/settings.yaml");
    let user = tmp.path().join(".config/voyage/settings.yaml");

    write_file(system.clone(), "nlu:\n  endpoint: \"https://ok.example\"\n");
    write_file(user.clone(), ":::: not yaml at all {{{{");

    let settings = load_runtime_settings_from_paths(&system, &user);
    assert_eq!(settings.nlu.endpoint.as_deref(), Some("https://ok.example"));
}
