//! Tests for layered configuration loading.

use super::*;
use crate::StoreKind;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Options that only see the files a test writes.
fn isolated_options(cwd: &Path) -> LayeredConfigOptions {
    let mut options = LayeredConfigOptions::new(cwd);
    options.system_config_path = None;
    options.user_config_path = None;
    options.requirements_path = None;
    options.use_env = false;
    options
}

/// A minimal config parses with defaults.
#[test]
fn parse_minimal_config() {
    let config = VpcForgeConfig::load_from_str("{}").expect("config");
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.server.api_key_header, "x-api-key");
    assert_eq!(config.provider.region, "us-east-2");
    assert_eq!(
        config.provider.zones(),
        vec![
            "us-east-2a".to_string(),
            "us-east-2b".to_string(),
            "us-east-2c".to_string()
        ]
    );
    assert_eq!(config.store.table_name, "vpc-metadata");
    assert_eq!(config.store.kind, StoreKind::File);
    assert_eq!(config.orchestrator.default_cidr_block, "10.0.0.0/16");
    assert_eq!(config.orchestrator.list_limit, 100);
}

/// Reject unexpected top-level config keys.
#[test]
fn rejects_unknown_top_level_key() {
    let err = VpcForgeConfig::load_from_str(r#"{ unexpected: true }"#).unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

/// Reject unsupported store kinds with the dotted path in the message.
#[test]
fn rejects_invalid_store_kind() {
    let err = VpcForgeConfig::load_from_str(r#"{ store: { kind: "dynamo" } }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("store.kind"), "{msg}");
}

/// An empty api key is refused rather than silently disabling auth.
#[test]
fn rejects_empty_api_key() {
    let err = VpcForgeConfig::load_from_str(r#"{ server: { api_key: "" } }"#).unwrap_err();
    assert!(format!("{err}").contains("server.api_key"));
}

/// Overrides applied after loading are caught by a second validation.
#[test]
fn validate_rejects_blank_settings() {
    let mut config = VpcForgeConfig::load_from_str("{}").expect("config");
    config.server.bind = "  ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyField("server.bind"))
    ));

    let config = VpcForgeConfig::builder()
        .orchestrator(crate::OrchestratorConfig {
            list_limit: 0,
            ..Default::default()
        })
        .build();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotPositive("orchestrator.list_limit"))
    ));
}

/// Later layers override earlier ones key by key.
#[test]
fn layered_config_prefers_later_layers() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let cwd = root.join("work");
    fs::create_dir_all(&cwd).expect("cwd");

    let system_config = root.join("system.json5");
    write_json5(
        &system_config,
        r#"{ provider: { region: "us-west-1" }, store: { table_name: "system" } }"#,
    );
    let user_config = root.join("user.json5");
    write_json5(&user_config, r#"{ store: { table_name: "user" } }"#);
    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ server: { bind: "0.0.0.0:9000" } }"#,
    );

    let mut options = isolated_options(&cwd);
    options.system_config_path = Some(system_config);
    options.user_config_path = Some(user_config);

    let layered = VpcForgeConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.provider.region, "us-west-1");
    assert_eq!(layered.config.store.table_name, "user");
    assert_eq!(layered.config.server.bind, "0.0.0.0:9000");
    assert_eq!(layered.layers.len(), 3);
}

/// Requirements pin values that later layers cannot change.
#[test]
fn requirements_lock_overrides() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();

    let requirements = root.join("requirements.json5");
    write_json5(&requirements, r#"{ server: { api_key_header: "x-locked-key" } }"#);
    let runtime_config = root.join("runtime.json5");
    write_json5(
        &runtime_config,
        r#"{ server: { api_key_header: "x-other", bind: "0.0.0.0:1" } }"#,
    );

    let mut options = isolated_options(root);
    options.requirements_path = Some(requirements);
    options.runtime_paths = vec![runtime_config];

    let layered = VpcForgeConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.server.api_key_header, "x-locked-key");
    assert_eq!(layered.config.server.bind, "0.0.0.0:1");
}

/// Runtime paths are mandatory: a missing one is an error.
#[test]
fn missing_runtime_layer_fails() {
    let temp = TempDir::new().expect("tmp");
    let options = isolated_options(temp.path()).with_runtime_path(temp.path().join("nope.json5"));
    let err = VpcForgeConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

/// Schema errors name the layer they came from.
#[test]
fn layer_errors_carry_layer_label() {
    let temp = TempDir::new().expect("tmp");
    let runtime_config = temp.path().join("runtime.json5");
    write_json5(&runtime_config, r#"{ orchestrator: { list_limit: "ten" } }"#);
    let options = isolated_options(temp.path()).with_runtime_path(&runtime_config);
    let err = VpcForgeConfig::load_layered_with_options(options).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("runtime("), "{msg}");
    assert!(msg.contains("orchestrator.list_limit"), "{msg}");
}

/// The builder produces a config that passes validation.
#[test]
fn builder_output_validates() {
    let config = VpcForgeConfig::builder()
        .store(crate::StoreConfig {
            kind: StoreKind::Memory,
            ..Default::default()
        })
        .build();
    config.validate().expect("valid");
    assert_eq!(config.store.kind, StoreKind::Memory);
}
