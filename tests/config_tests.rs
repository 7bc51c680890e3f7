// tests/config_tests.rs
//
// Environment overrides are process-wide, so only
// `test_environment_overrides_file` sets `STATUS_CHECKER__DEFAULT_TIMEOUT_MS`
// and no other test asserts that field.
use status_probe::config::load_config;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

struct TempConfig {
    path: PathBuf,
}

impl TempConfig {
    fn write(extension: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "status-probe-{}.{}",
            Uuid::new_v4(),
            extension
        ));
        fs::write(&path, contents).unwrap();
        Self { path }
    }
}

impl Drop for TempConfig {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

const YAML: &str = r#"
server:
  bind_addr: "127.0.0.1:8181"
checker:
  default_timeout_ms: 4000
  max_concurrency: 8
metrics:
  enabled: false
primary_url: "https://campus.example.edu/"
targets:
  - "https://campus.example.edu/"
  - "https://library.example.edu/"
"#;

#[test]
fn test_load_yaml_file() {
    let file = TempConfig::write("yaml", YAML);
    let config = load_config(&file.path).unwrap();

    assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:8181");
    assert_eq!(config.checker.max_concurrency, 8);
    assert_eq!(config.checker.max_batch_size, 100);
    assert!(!config.metrics.enabled);
    assert_eq!(
        config.primary_url.as_deref(),
        Some("https://campus.example.edu/")
    );
    assert_eq!(config.targets.len(), 2);
}

#[test]
fn test_load_json_file() {
    let file = TempConfig::write(
        "json",
        r#"{ "checker": { "max_redirects": 3 }, "targets": ["https://campus.example.edu/"] }"#,
    );
    let config = load_config(&file.path).unwrap();

    assert_eq!(config.checker.max_redirects, 3);
    assert_eq!(config.targets, vec!["https://campus.example.edu/".to_string()]);
    assert_eq!(config.primary_url, None);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let path = std::env::temp_dir().join(format!("status-probe-{}.yaml", Uuid::new_v4()));
    let config = load_config(&path).unwrap();

    assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(config.checker.max_concurrency, 32);
    assert!(config.targets.is_empty());
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = TempConfig::write(
        "yaml",
        r#"
checker:
  max_batch_size: 1
targets:
  - "https://campus.example.edu/"
  - "https://library.example.edu/"
"#,
    );
    assert!(load_config(&file.path).is_err());
}

#[test]
fn test_environment_overrides_file() {
    let file = TempConfig::write("yaml", YAML);
    std::env::set_var("STATUS_CHECKER__DEFAULT_TIMEOUT_MS", "2500");
    let loaded = load_config(&file.path);
    std::env::remove_var("STATUS_CHECKER__DEFAULT_TIMEOUT_MS");
    let config = loaded.unwrap();

    assert_eq!(config.checker.default_timeout_ms, 2500);
    // untouched keys still come from the file
    assert_eq!(config.checker.max_concurrency, 8);
    assert_eq!(config.targets.len(), 2);
}
