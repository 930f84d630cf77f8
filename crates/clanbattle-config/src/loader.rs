// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./clanbattle.toml` > `~/.config/clanbattle/clanbattle.toml`
//! > `/etc/clanbattle/clanbattle.toml` with environment variable overrides via the
//! `CLANBATTLE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ClanBattleConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/clanbattle/clanbattle.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "clanbattle.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/clanbattle/clanbattle.toml` (system-wide)
/// 3. `~/.config/clanbattle/clanbattle.toml` (user XDG config)
/// 4. `./clanbattle.toml` (local directory)
/// 5. `CLANBATTLE_*` environment variables
pub fn load_config() -> Result<ClanBattleConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ClanBattleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClanBattleConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClanBattleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClanBattleConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files in merge order: system, then user, then working directory.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("clanbattle").join(LOCAL_CONFIG_FILE));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
    paths
}

/// The layered Figment behind [`load_config`].
pub fn build_figment() -> Figment {
    config_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(ClanBattleConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Config sections reachable from `CLANBATTLE_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: [&str; 3] = ["service", "battle", "storage"];

/// Environment provider mapping `CLANBATTLE_<SECTION>_<KEY>` to `section.key`.
///
/// Keys contain underscores (`CLANBATTLE_BATTLE_DAILY_ATTEMPTS` is
/// `battle.daily_attempts`), so only the section prefix is split off.
fn env_provider() -> Env {
    Env::prefixed("CLANBATTLE_").map(|key| env_key(key.as_str()).into())
}

/// `BATTLE_RESET_HOUR` -> `battle.reset_hour`. Unknown sections pass
/// through lowercased so `deny_unknown_fields` reports them.
fn env_key(var: &str) -> String {
    let var = var.to_ascii_lowercase();
    ENV_SECTIONS
        .iter()
        .find_map(|section| {
            var.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or(var)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_only_the_section() {
        assert_eq!(env_key("BATTLE_RESET_HOUR"), "battle.reset_hour");
        assert_eq!(env_key("battle_daily_attempts"), "battle.daily_attempts");
        assert_eq!(env_key("STORAGE_DATABASE_PATH"), "storage.database_path");
        assert_eq!(env_key("SERVICE_LOG_LEVEL"), "service.log_level");
    }

    #[test]
    fn local_file_is_merged_last() {
        let paths = config_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG_PATH)));
        assert_eq!(paths.last(), Some(&PathBuf::from(LOCAL_CONFIG_FILE)));
    }

    #[test]
    fn unknown_sections_pass_through_lowercased() {
        assert_eq!(env_key("BATTLEFIELD_X"), "battlefield_x");
        assert_eq!(env_key("STAGES"), "stages");
    }
}
