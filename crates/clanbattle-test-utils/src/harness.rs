// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete battle service with mock collaborators
//! and either an in-memory store or a temp SQLite database.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use clanbattle_config::model::{ClanBattleConfig, StageLevel, StageTables, StorageBackend};
use clanbattle_core::{ClanError, ClanStore, GameServer, GroupId, MemberId, Role};
use clanbattle_engine::BattleService;
use clanbattle_storage::{MemoryStore, SqliteStore};

use crate::mock_directory::{FixedClock, MockDirectory};
use crate::mock_notifier::MockNotifier;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    backend: StorageBackend,
    daily_attempts: u32,
    levels: Vec<StageLevel>,
    now: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            backend: StorageBackend::Memory,
            daily_attempts: 3,
            levels: vec![StageLevel::new(1, 999, [100; 5])],
            // 12:00 in cn/tw, 13:00 in jp/kr: well past the daily reset.
            now: Utc.with_ymd_and_hms(2026, 3, 2, 4, 0, 0).single().unwrap_or_default(),
        }
    }

    /// Back the service with a temp SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.backend = StorageBackend::Sqlite;
        self
    }

    pub fn with_daily_attempts(mut self, attempts: u32) -> Self {
        self.daily_attempts = attempts;
        self
    }

    /// Use `levels` for every server.
    pub fn with_stages(mut self, levels: Vec<StageLevel>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ClanError> {
        let mut config = ClanBattleConfig::default();
        config.battle.daily_attempts = self.daily_attempts;
        config.stages = StageTables::uniform(self.levels);
        config.storage.backend = self.backend;

        let mut temp_dir = None;
        let store: Arc<dyn ClanStore> = match self.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Sqlite => {
                let dir = tempfile::TempDir::new().map_err(ClanError::storage)?;
                config.storage.database_path =
                    dir.path().join("test.db").to_string_lossy().to_string();
                let store = SqliteStore::open(&config.storage).await?;
                temp_dir = Some(dir);
                Arc::new(store)
            }
        };

        let notifier = Arc::new(MockNotifier::new());
        let directory = Arc::new(MockDirectory::new());
        let clock = Arc::new(FixedClock::new(self.now));
        let service = Arc::new(BattleService::new(
            Arc::clone(&store),
            notifier.clone(),
            directory.clone(),
            clock.clone(),
            &config,
        )?);

        Ok(TestHarness {
            service,
            store,
            notifier,
            directory,
            clock,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators.
pub struct TestHarness {
    pub service: Arc<BattleService>,
    /// The store behind the service, for direct assertions.
    pub store: Arc<dyn ClanStore>,
    pub notifier: Arc<MockNotifier>,
    pub directory: Arc<MockDirectory>,
    pub clock: Arc<FixedClock>,
    pub config: ClanBattleConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Register a cn group and bind `members` to it as regular members.
    pub async fn group_with_members(
        &self,
        group_id: GroupId,
        members: &[MemberId],
    ) -> Result<(), ClanError> {
        self.service
            .create_group(group_id, GameServer::Cn, None)
            .await?;
        for member in members {
            self.service
                .bind_member(group_id, *member, Role::Member)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness
            .group_with_members(GroupId(1), &[MemberId(10)])
            .await
            .unwrap();
        let members = harness.service.list_members(GroupId(1)).await.unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn sqlite_harness_persists_groups() {
        let harness = TestHarness::builder().with_sqlite().build().await.unwrap();
        harness.group_with_members(GroupId(2), &[]).await.unwrap();
        let group = harness.store.get_group(GroupId(2)).await.unwrap().unwrap();
        assert_eq!(group.cycle, 1);
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().with_sqlite().build().await.unwrap();
        let h2 = TestHarness::builder().with_sqlite().build().await.unwrap();
        h1.group_with_members(GroupId(1), &[]).await.unwrap();
        assert!(h2.store.get_group(GroupId(1)).await.unwrap().is_none());
    }
}
