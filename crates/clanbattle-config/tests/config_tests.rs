// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use clanbattle_config::diagnostic::ConfigError;
use clanbattle_config::model::StorageBackend;
use clanbattle_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use clanbattle_core::GameServer;

#[test]
fn valid_toml_deserializes() {
    let toml = r#"
[service]
name = "clan-test"
log_level = "debug"

[battle]
daily_attempts = 3
reset_hour = 4

[storage]
backend = "memory"
database_path = "/tmp/test.db"
wal_mode = false

[[stages.cn]]
cycles = [1, 999]
health = [100, 100, 100, 100, 100]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "clan-test");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.battle.reset_hour, 4);
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.stages.levels(GameServer::Cn).len(), 1);
    assert_eq!(config.stages.levels(GameServer::Cn)[0].health, [100; 5]);
    // Untouched servers keep their compiled tables.
    assert_eq!(config.stages.levels(GameServer::Jp).len(), 5);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.service.name, "clanbattle");
    assert_eq!(config.battle.daily_attempts, 3);
    assert_eq!(config.battle.reset_hour, 5);
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    assert_eq!(config.storage.database_path, "clanbattle.db");
    assert!(config.storage.wal_mode);
}

#[test]
fn unknown_field_in_battle_produces_error() {
    let toml = r#"
[battle]
daily_atempts = 2
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("daily_atempts"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_key_carries_suggestion() {
    let toml = r#"
[battle]
daily_atempts = 2
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("daily_attempts"));
}

#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[battle]
reset_hour = "five"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

#[test]
fn unknown_backend_is_rejected() {
    let toml = r#"
[storage]
backend = "postgres"
"#;
    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn semantic_errors_are_collected() {
    let toml = r#"
[battle]
daily_attempts = 0
reset_hour = 30
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn overlapping_stage_levels_are_rejected() {
    let toml = r#"
[[stages.tw]]
cycles = [1, 10]
health = [1, 2, 3, 4, 5]

[[stages.tw]]
cycles = [8, 999]
health = [6, 7, 8, 9, 10]
"#;

    let errors = load_and_validate_str(toml).expect_err("overlap should fail");
    assert!(errors[0].to_string().contains("stages.tw[1]"));
}

#[test]
fn loads_from_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clanbattle.toml");
    std::fs::write(&path, "[storage]\ndatabase_path = \"battle.db\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config should load");
    assert_eq!(config.storage.database_path, "battle.db");
}

#[test]
fn file_errors_name_the_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clanbattle.toml");
    std::fs::write(&path, "[battle]\ndaily_atempts = 2\n").unwrap();

    let errors = load_and_validate_path(&path).expect_err("typo should fail");
    match &errors[0] {
        ConfigError::UnknownKey {
            section,
            suggestion,
            ..
        } => {
            assert_eq!(section, "[battle]");
            assert_eq!(suggestion.as_deref(), Some("daily_attempts"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn env_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[battle]\nreset_hour = 4\n")?;
        jail.set_env("CLANBATTLE_BATTLE_RESET_HOUR", "6");
        jail.set_env("CLANBATTLE_STORAGE_DATABASE_PATH", "env.db");
        jail.set_env("CLANBATTLE_BATTLE_DAILY_ATTEMPTS", "2");
        jail.set_env("CLANBATTLE_SERVICE_LOG_LEVEL", "debug");

        let config = load_config_from_path(std::path::Path::new("custom.toml"))
            .expect("env should merge");
        assert_eq!(config.battle.reset_hour, 6);
        assert_eq!(config.battle.daily_attempts, 2);
        assert_eq!(config.storage.database_path, "env.db");
        assert_eq!(config.service.log_level, "debug");
        Ok(())
    });
}
