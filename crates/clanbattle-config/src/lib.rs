// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clan battle tracker settings: the daily attempt quota, the game-day
//! reset hour, the store backend and the boss stage tables of every game
//! server.
//!
//! Settings come from `clanbattle.toml` files layered over compiled
//! defaults (which carry the real stage tables) and `CLANBATTLE_*`
//! variables. Every `load_and_validate*` entry point returns either a config
//! whose stage tables the engine can use as-is, or every problem found,
//! ready for [`render_errors`].
//!
//! ```no_run
//! let config = clanbattle_config::load_and_validate().expect("config errors");
//! assert!(config.battle.daily_attempts >= 1);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ClanBattleConfig, StageLevel, StageTables, StorageBackend};

use std::path::Path;

/// Load from the system, user and working-directory files plus the
/// environment.
pub fn load_and_validate() -> Result<ClanBattleConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::config_paths()
            .iter()
            .filter_map(|path| read_source(path))
            .collect()
    })
}

/// Load one explicit file (plus the environment), as `--config-file` does.
pub fn load_and_validate_path(path: &Path) -> Result<ClanBattleConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Load an inline TOML document over the defaults, without the environment.
pub fn load_and_validate_str(toml_content: &str) -> Result<ClanBattleConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate a parsed config, or turn the parse error into diagnostics
/// pointing into `sources`. Sources are only read on failure.
fn checked(
    loaded: Result<ClanBattleConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<ClanBattleConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// A config file's content, keyed by the absolute path Figment reports.
fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let name = std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();
    Some((name, content))
}
