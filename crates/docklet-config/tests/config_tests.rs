use std::fs;
use std::path::Path;
use std::time::Duration;

use docklet_config::{
    ConfigError, ConfigOverrides, OrchestratorConfig, API_URL_ENV, DATA_DIR_ENV,
    REQUEST_TIMEOUT_ENV, TOKEN_ENV,
};
use serial_test::serial;
use tempfile::TempDir;

fn clear_env() {
    for name in [API_URL_ENV, TOKEN_ENV, DATA_DIR_ENV, REQUEST_TIMEOUT_ENV] {
        std::env::remove_var(name);
    }
}

fn with_data_dir(dir: &Path) -> ConfigOverrides {
    ConfigOverrides {
        data_dir: Some(dir.to_path_buf()),
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();

    let config = OrchestratorConfig::load(with_data_dir(dir.path())).unwrap();
    assert_eq!(config.api_base(), "http://127.0.0.1:8080/api");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.token, None);
    assert_eq!(config.data_dir, dir.path());
}

#[test]
#[serial]
fn test_environment_values() {
    clear_env();
    let dir = TempDir::new().unwrap();
    std::env::set_var(DATA_DIR_ENV, dir.path());
    std::env::set_var(API_URL_ENV, "https://control.internal/api/");
    std::env::set_var(TOKEN_ENV, " secret ");
    std::env::set_var(REQUEST_TIMEOUT_ENV, "5");

    let config = OrchestratorConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.api_base(), "https://control.internal/api");
    assert_eq!(config.token.as_deref(), Some("secret"));
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.data_dir, dir.path());
}

#[test]
#[serial]
fn test_overrides_beat_environment() {
    clear_env();
    let dir = TempDir::new().unwrap();
    std::env::set_var(API_URL_ENV, "http://from-env:8080/api");
    std::env::set_var(TOKEN_ENV, "env-token");

    let config = OrchestratorConfig::load(ConfigOverrides {
        api_url: Some("http://from-flag:9090/api".to_string()),
        token: Some("flag-token".to_string()),
        data_dir: Some(dir.path().to_path_buf()),
        request_timeout_secs: Some(12),
    })
    .unwrap();
    clear_env();

    assert_eq!(config.api_base(), "http://from-flag:9090/api");
    assert_eq!(config.token.as_deref(), Some("flag-token"));
    assert_eq!(config.request_timeout, Duration::from_secs(12));
}

#[test]
#[serial]
fn test_token_file_fallback() {
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("token"), "file-token\n").unwrap();

    let config = OrchestratorConfig::load(with_data_dir(dir.path())).unwrap();
    assert_eq!(config.token.as_deref(), Some("file-token"));
    assert_eq!(config.token_path(), dir.path().join("token"));
}

#[test]
#[serial]
fn test_empty_token_file_means_no_token() {
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("token"), "  \n").unwrap();

    let config = OrchestratorConfig::load(with_data_dir(dir.path())).unwrap();
    assert_eq!(config.token, None);
}

#[test]
#[serial]
fn test_invalid_values_are_errors() {
    clear_env();
    let dir = TempDir::new().unwrap();

    std::env::set_var(REQUEST_TIMEOUT_ENV, "0");
    let err = OrchestratorConfig::load(with_data_dir(dir.path())).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    clear_env();

    std::env::set_var(API_URL_ENV, "unix:///var/run/docklet.sock");
    let err = OrchestratorConfig::load(with_data_dir(dir.path())).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedScheme(_)));
    clear_env();

    let err = OrchestratorConfig::load(ConfigOverrides {
        request_timeout_secs: Some(0),
        ..with_data_dir(dir.path())
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout(_)));
}
