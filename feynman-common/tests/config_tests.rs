//! Tests for bootstrap configuration and root folder resolution
//!
//! - Missing TOML files fall back to defaults instead of failing
//! - Partial TOML files fill unspecified fields with defaults
//! - Root folder priority: CLI → ENV → TOML → OS default
//!
//! Tests that touch FEYNMAN_ROOT_FOLDER are #[serial] to avoid ENV races.

use feynman_common::config::{
    load_toml_config, prepare_root_folder, resolve_root_folder, write_toml_config, TomlConfig,
    DATABASE_FILE, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
fn test_missing_toml_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_toml_config(&dir.path().join("absent.toml")).unwrap();

    assert!(config.root_folder.is_none());
    assert!(config.port.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    assert_eq!(config.llm.timeout_secs, 60);
    assert!(config.review.max_turns.is_none());
    assert_eq!(config.ingest.max_lecture_chars, 200_000);
}

#[test]
fn test_partial_toml_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feynman-tutor.toml");
    std::fs::write(
        &path,
        r#"
port = 6000

[llm]
model = "local-llama"
base_url = "http://127.0.0.1:8080/v1"

[review]
max_turns = 12
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.port, Some(6000));
    assert_eq!(config.llm.model, "local-llama");
    assert_eq!(config.llm.base_url, "http://127.0.0.1:8080/v1");
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.llm.temperature, 0.7);
    assert_eq!(config.review.max_turns, Some(12));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_toml_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(err.to_string().contains("Parse TOML failed"));
}

#[test]
fn test_write_then_load_preserves_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf").join("feynman-tutor.toml");

    let mut config = TomlConfig::default();
    config.llm.api_key = Some("sk-written".to_string());
    write_toml_config(&config, &path).unwrap();

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded.llm.api_key.as_deref(), Some("sk-written"));
}

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(Some(Path::new("/tmp/from-cli")), &config);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, &config);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/tmp/from-env"));
}

#[test]
#[serial]
fn test_toml_used_without_cli_or_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };

    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/tmp/from-toml"));
}

#[test]
#[serial]
fn test_default_root_folder_when_nothing_configured() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolved = resolve_root_folder(None, &TomlConfig::default());
    assert!(resolved.to_string_lossy().contains("feynman"));
}

#[test]
fn test_prepare_root_folder_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("a").join("b");

    let db_path = prepare_root_folder(&root).unwrap();

    assert!(root.is_dir());
    assert_eq!(db_path, root.join(DATABASE_FILE));
}
