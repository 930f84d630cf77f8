// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the clan battle tracker.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use clanbattle_core::{GameServer, SLOT_COUNT};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClanBattleConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Battle rules (daily quota, reset hour).
    #[serde(default)]
    pub battle: BattleConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Boss stage tables per game server.
    #[serde(default)]
    pub stages: StageTables,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in log lines.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "clanbattle".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Battle rule configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BattleConfig {
    /// Full attempts each member may make per game day.
    #[serde(default = "default_daily_attempts")]
    pub daily_attempts: u32,

    /// Local hour at which the game day rolls over.
    #[serde(default = "default_reset_hour")]
    pub reset_hour: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            daily_attempts: default_daily_attempts(),
            reset_hour: default_reset_hour(),
        }
    }
}

fn default_daily_attempts() -> u32 {
    3
}

fn default_reset_hour() -> u32 {
    clanbattle_core::calendar::DEFAULT_RESET_HOUR
}

/// Which store implementation backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile in-process maps. State is lost on exit.
    Memory,
    /// SQLite database file.
    #[default]
    Sqlite,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "clanbattle.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// One difficulty level of a server's stage table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StageLevel {
    /// Inclusive cycle range `[first, last]` this level applies to.
    pub cycles: [u32; 2],

    /// Full health of each of the five bosses at this level.
    pub health: [u64; SLOT_COUNT],
}

impl StageLevel {
    pub fn new(first: u32, last: u32, health: [u64; SLOT_COUNT]) -> Self {
        Self {
            cycles: [first, last],
            health,
        }
    }

    pub fn covers(&self, cycle: u32) -> bool {
        cycle >= self.cycles[0] && cycle <= self.cycles[1]
    }
}

/// Stage tables for every game server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StageTables {
    #[serde(default = "default_jp_stages")]
    pub jp: Vec<StageLevel>,

    #[serde(default = "default_tw_stages")]
    pub tw: Vec<StageLevel>,

    #[serde(default = "default_cn_stages")]
    pub cn: Vec<StageLevel>,

    #[serde(default = "default_kr_stages")]
    pub kr: Vec<StageLevel>,
}

impl StageTables {
    /// Levels of one server, in ascending cycle order.
    pub fn levels(&self, server: GameServer) -> &[StageLevel] {
        match server {
            GameServer::Jp => &self.jp,
            GameServer::Tw => &self.tw,
            GameServer::Cn => &self.cn,
            GameServer::Kr => &self.kr,
        }
    }

    /// The same level list for every server. Handy for tests.
    pub fn uniform(levels: Vec<StageLevel>) -> Self {
        Self {
            jp: levels.clone(),
            tw: levels.clone(),
            cn: levels.clone(),
            kr: levels,
        }
    }
}

impl Default for StageTables {
    fn default() -> Self {
        Self {
            jp: default_jp_stages(),
            tw: default_tw_stages(),
            cn: default_cn_stages(),
            kr: default_kr_stages(),
        }
    }
}

fn default_jp_stages() -> Vec<StageLevel> {
    vec![
        StageLevel::new(1, 3, [6_000_000, 8_000_000, 10_000_000, 12_000_000, 15_000_000]),
        StageLevel::new(4, 10, [6_000_000, 8_000_000, 10_000_000, 12_000_000, 15_000_000]),
        StageLevel::new(11, 30, [12_000_000, 14_000_000, 17_000_000, 19_000_000, 22_000_000]),
        StageLevel::new(31, 40, [19_000_000, 20_000_000, 23_000_000, 25_000_000, 27_000_000]),
        StageLevel::new(41, 999, [85_000_000, 90_000_000, 95_000_000, 100_000_000, 110_000_000]),
    ]
}

fn default_tw_stages() -> Vec<StageLevel> {
    vec![
        StageLevel::new(1, 3, [6_000_000, 8_000_000, 10_000_000, 12_000_000, 15_000_000]),
        StageLevel::new(4, 10, [6_000_000, 8_000_000, 10_000_000, 12_000_000, 15_000_000]),
        StageLevel::new(11, 34, [7_000_000, 9_000_000, 13_000_000, 15_000_000, 20_000_000]),
        StageLevel::new(35, 999, [15_000_000, 16_000_000, 18_000_000, 19_000_000, 20_000_000]),
    ]
}

fn default_cn_stages() -> Vec<StageLevel> {
    vec![
        StageLevel::new(1, 3, [6_000_000, 8_000_000, 10_000_000, 12_000_000, 15_000_000]),
        StageLevel::new(4, 10, [6_000_000, 8_000_000, 10_000_000, 12_000_000, 15_000_000]),
        StageLevel::new(11, 34, [7_000_000, 9_000_000, 13_000_000, 15_000_000, 20_000_000]),
        StageLevel::new(35, 999, [17_000_000, 18_000_000, 20_000_000, 21_000_000, 23_000_000]),
    ]
}

fn default_kr_stages() -> Vec<StageLevel> {
    default_tw_stages()
}
