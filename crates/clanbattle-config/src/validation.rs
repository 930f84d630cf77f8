// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as contiguous stage ranges and positive boss health.

use clanbattle_core::GameServer;

use crate::diagnostic::ConfigError;
use crate::model::{ClanBattleConfig, StageLevel, StorageBackend};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ClanBattleConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` must be one of {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.battle.daily_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "battle.daily_attempts must be at least 1".to_string(),
        });
    }

    if config.battle.reset_hour >= 24 {
        errors.push(ConfigError::Validation {
            message: format!(
                "battle.reset_hour must be between 0 and 23, got {}",
                config.battle.reset_hour
            ),
        });
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    for server in GameServer::ALL {
        validate_levels(server, config.stages.levels(server), &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Stage levels must start at cycle 1, be contiguous and ascending, and carry
/// positive health for every boss.
fn validate_levels(server: GameServer, levels: &[StageLevel], errors: &mut Vec<ConfigError>) {
    if levels.is_empty() {
        errors.push(ConfigError::Validation {
            message: format!("stages.{server} must define at least one level"),
        });
        return;
    }

    let mut expected_first = 1;
    for (i, level) in levels.iter().enumerate() {
        let [first, last] = level.cycles;
        if first != expected_first {
            errors.push(ConfigError::Validation {
                message: format!(
                    "stages.{server}[{i}] starts at cycle {first}, expected {expected_first}"
                ),
            });
        }
        if last < first {
            errors.push(ConfigError::Validation {
                message: format!(
                    "stages.{server}[{i}] cycle range [{first}, {last}] is reversed"
                ),
            });
        }
        if level.health.contains(&0) {
            errors.push(ConfigError::Validation {
                message: format!("stages.{server}[{i}] boss health must be positive"),
            });
        }
        expected_first = last.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = ClanBattleConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ClanBattleConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn empty_database_path_is_fine_for_memory_backend() {
        let mut config = ClanBattleConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.storage.database_path = "".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_daily_attempts_fails_validation() {
        let mut config = ClanBattleConfig::default();
        config.battle.daily_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("daily_attempts"))));
    }

    #[test]
    fn gap_between_levels_is_reported() {
        let mut config = ClanBattleConfig::default();
        config.stages.cn = vec![
            StageLevel::new(1, 3, [1; 5]),
            StageLevel::new(5, 999, [2; 5]),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("stages.cn[1] starts at cycle 5"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ClanBattleConfig::default();
        config.battle.reset_hour = 24;
        config.service.log_level = "loud".into();
        config.stages.jp = vec![StageLevel::new(1, 999, [1, 2, 0, 4, 5])];
        config.stages.kr.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4, "got: {errors:?}");
    }
}
