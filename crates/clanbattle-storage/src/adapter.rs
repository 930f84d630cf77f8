// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`ClanStore`] trait.

use async_trait::async_trait;
use tracing::debug;

use clanbattle_config::model::StorageConfig;
use clanbattle_core::model::{
    BattleState, Challenge, ChallengeQuery, Group, Membership, NewChallenge,
};
use clanbattle_core::{BattleId, ClanError, ClanStore, GroupId, MemberId};

use crate::database::{Database, map_tr_err};
use crate::queries;
use crate::queries::challenges::ChallengeRecord;
use crate::queries::groups::GroupRecord;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// Every `commit_*` method runs in one SQL transaction.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the database configured in `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, ClanError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self { db })
    }

    pub async fn open_in_memory() -> Result<Self, ClanError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), ClanError> {
        self.db.checkpoint().await
    }
}

#[async_trait]
impl ClanStore for SqliteStore {
    // --- Groups ---

    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, ClanError> {
        queries::groups::get_group(&self.db, group_id).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, ClanError> {
        queries::groups::list_groups(&self.db).await
    }

    async fn save_group(&self, group: &Group) -> Result<(), ClanError> {
        queries::groups::save_group(&self.db, group).await
    }

    // --- Memberships ---

    async fn get_membership(
        &self,
        group_id: GroupId,
        member: MemberId,
    ) -> Result<Option<Membership>, ClanError> {
        queries::members::get_membership(&self.db, group_id, member).await
    }

    async fn save_membership(&self, membership: &Membership) -> Result<(), ClanError> {
        queries::members::save_membership(&self.db, membership).await
    }

    async fn delete_memberships(
        &self,
        group_id: GroupId,
        members: &[MemberId],
    ) -> Result<usize, ClanError> {
        queries::members::delete_memberships(&self.db, group_id, members).await
    }

    async fn list_memberships(&self, group_id: GroupId) -> Result<Vec<Membership>, ClanError> {
        queries::members::list_memberships(&self.db, group_id).await
    }

    // --- Challenge ledger ---

    async fn query_challenges(&self, query: &ChallengeQuery) -> Result<Vec<Challenge>, ClanError> {
        queries::challenges::query_challenges(&self.db, query).await
    }

    async fn last_challenge(
        &self,
        group_id: GroupId,
        battle_id: BattleId,
    ) -> Result<Option<Challenge>, ClanError> {
        queries::challenges::last_challenge(&self.db, group_id, battle_id).await
    }

    async fn commit_challenge(
        &self,
        group: &Group,
        challenge: NewChallenge,
    ) -> Result<Challenge, ClanError> {
        let group_record = GroupRecord::from_group(group)?;
        let record = ChallengeRecord::from_new(&challenge);
        let id = self
            .db
            .connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                let tx = conn.transaction()?;
                let id = record.insert(&tx)?;
                group_record.upsert(&tx)?;
                tx.commit()?;
                Ok(id)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(group_id = %group.group_id, id, "challenge committed");
        Ok(Challenge::from_new(id, challenge))
    }

    async fn commit_undo(&self, group: &Group, challenge_id: i64) -> Result<(), ClanError> {
        let group_record = GroupRecord::from_group(group)?;
        let deleted = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                let deleted = queries::challenges::delete_one(&tx, challenge_id)?;
                if deleted == 0 {
                    // Dropping the transaction rolls it back.
                    return Ok(0);
                }
                group_record.upsert(&tx)?;
                tx.commit()?;
                Ok(deleted)
            })
            .await
            .map_err(map_tr_err)?;
        if deleted == 0 {
            return Err(ClanError::Internal(format!(
                "challenge {challenge_id} vanished before undo"
            )));
        }
        debug!(group_id = %group.group_id, challenge_id, "challenge undone");
        Ok(())
    }

    async fn record_counts(&self, group_id: GroupId) -> Result<Vec<(BattleId, u64)>, ClanError> {
        queries::challenges::record_counts(&self.db, group_id).await
    }

    async fn commit_clear_archive(
        &self,
        group: &Group,
        battle_id: BattleId,
    ) -> Result<u64, ClanError> {
        let group_record = GroupRecord::from_group(group)?;
        let group_id = group.group_id.0;
        let deleted = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                let deleted = queries::challenges::delete_archive(&tx, group_id, battle_id)?;
                group_record.upsert(&tx)?;
                tx.commit()?;
                Ok(deleted)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(group_id, battle_id, deleted, "archive cleared");
        Ok(deleted as u64)
    }

    // --- Archive backups ---

    async fn load_backup(
        &self,
        group_id: GroupId,
        battle_id: BattleId,
    ) -> Result<Option<BattleState>, ClanError> {
        queries::backups::load_backup(&self.db, group_id, battle_id).await
    }

    async fn commit_switch_archive(
        &self,
        group: &Group,
        backup_battle_id: BattleId,
        backup: &BattleState,
    ) -> Result<(), ClanError> {
        let group_record = GroupRecord::from_group(group)?;
        let state = serde_json::to_string(backup)?;
        let group_id = group.group_id.0;
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                queries::backups::upsert_backup(&tx, group_id, backup_battle_id, &state)?;
                group_record.upsert(&tx)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(group_id, backup_battle_id, battle_id = group.battle_id, "archive switched");
        Ok(())
    }
}
