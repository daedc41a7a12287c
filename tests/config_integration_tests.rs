//! Integration tests for ConfigManager and configuration file handling
//!
//! These tests verify:
//! - Configuration loading and saving
//! - Default configuration when no file exists
//! - Partial files falling back to defaults
//! - Opening the settings store from the loaded configuration

use camino::Utf8PathBuf;
use idler_settings::store::{KeyValueStore, SETTINGS_KEY};
use idler_settings::{AppConfig, ConfigManager, Metrics, SettingsDocument, SettingsSynchronizer};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), &config_path);
}

#[test]
fn test_create_config_manager_creates_directory() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("nested").join("config");

    ConfigManager::new(&nested).unwrap();

    assert!(nested.exists());
}

#[test]
fn test_load_default_app_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    // Config file doesn't exist, should return defaults
    let config = manager.load_app_config().unwrap();

    assert_eq!(config.session.error_display_ms, 4000);
    assert_eq!(config.session.validation_timeout_secs, 30);
    assert!(!config.logging.debug_mode);
    assert_eq!(config.data_dir, config_path.join("data"));
}

#[test]
fn test_save_and_load_app_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut config = AppConfig::default();
    config.logging.debug_mode = true;
    config.logging.json = true;
    config.session.validation_timeout_secs = 10;

    manager.save_app_config(&config).unwrap();
    let loaded = manager.load_app_config().unwrap();

    assert!(loaded.logging.debug_mode);
    assert!(loaded.logging.json);
    assert_eq!(loaded.session.validation_timeout_secs, 10);
}

#[test]
fn test_partial_config_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let content = r#"
data_dir: "store"
session:
  error_display_ms: 1500
"#;
    fs::write(manager.config_path(), content).unwrap();

    let config = manager.load_app_config().unwrap();

    assert_eq!(config.data_dir, config_path.join("store"));
    assert_eq!(config.session.error_display_ms, 1500);
    assert_eq!(config.session.validation_timeout_secs, 30);
    assert_eq!(config.logging.log_prefix, "idler-settings");
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(manager.config_path(), "session: [not, a, map").unwrap();

    assert!(manager.load_app_config().is_err());
}

#[test]
fn test_open_store_and_synchronize() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    let config = manager.load_app_config().unwrap();

    let store = Arc::new(manager.open_store(&config).unwrap());
    assert!(store.dir().exists());

    let sync = SettingsSynchronizer::new(store.clone(), Arc::new(Metrics::new()));
    sync.load_or_init(SettingsDocument::default());

    assert!(store.get(SETTINGS_KEY).unwrap().is_some());
    assert!(config.data_dir.join("settings.json").exists());
}
