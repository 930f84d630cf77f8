// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for groups, memberships, the challenge ledger and
//! archive backups.

use async_trait::async_trait;

use crate::error::ClanError;
use crate::model::{BattleState, Challenge, ChallengeQuery, Group, Membership, NewChallenge};
use crate::types::{BattleId, GroupId, MemberId};

/// Storage backend for the battle engine.
///
/// The `commit_*` methods write several records and must be atomic: either
/// every write is visible afterwards or none is. The engine serializes calls
/// per group, so implementations only need to be safe across groups.
#[async_trait]
pub trait ClanStore: Send + Sync {
    // --- Groups ---

    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, ClanError>;

    async fn list_groups(&self) -> Result<Vec<Group>, ClanError>;

    /// Insert or replace a group row.
    async fn save_group(&self, group: &Group) -> Result<(), ClanError>;

    // --- Memberships ---

    async fn get_membership(
        &self,
        group_id: GroupId,
        member: MemberId,
    ) -> Result<Option<Membership>, ClanError>;

    /// Insert or replace a membership row.
    async fn save_membership(&self, membership: &Membership) -> Result<(), ClanError>;

    /// Delete memberships, returning how many rows existed.
    async fn delete_memberships(
        &self,
        group_id: GroupId,
        members: &[MemberId],
    ) -> Result<usize, ClanError>;

    async fn list_memberships(&self, group_id: GroupId) -> Result<Vec<Membership>, ClanError>;

    // --- Challenge ledger ---

    /// Entries matching `query`, in creation order.
    async fn query_challenges(&self, query: &ChallengeQuery) -> Result<Vec<Challenge>, ClanError>;

    /// The most recently created entry of an archive.
    async fn last_challenge(
        &self,
        group_id: GroupId,
        battle_id: BattleId,
    ) -> Result<Option<Challenge>, ClanError>;

    /// Atomically append `challenge` and save `group`.
    async fn commit_challenge(
        &self,
        group: &Group,
        challenge: NewChallenge,
    ) -> Result<Challenge, ClanError>;

    /// Atomically delete entry `challenge_id` and save `group`.
    async fn commit_undo(&self, group: &Group, challenge_id: i64) -> Result<(), ClanError>;

    /// Number of entries per archive, ordered by archive id.
    async fn record_counts(&self, group_id: GroupId) -> Result<Vec<(BattleId, u64)>, ClanError>;

    /// Atomically save `group` and delete every entry of `battle_id`,
    /// returning the number of deleted entries.
    async fn commit_clear_archive(
        &self,
        group: &Group,
        battle_id: BattleId,
    ) -> Result<u64, ClanError>;

    // --- Archive backups ---

    async fn load_backup(
        &self,
        group_id: GroupId,
        battle_id: BattleId,
    ) -> Result<Option<BattleState>, ClanError>;

    /// Atomically store `backup` under (`group`, `backup_battle_id`) and save `group`.
    async fn commit_switch_archive(
        &self,
        group: &Group,
        backup_battle_id: BattleId,
        backup: &BattleState,
    ) -> Result<(), ClanError>;
}
