// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile in-process [`ClanStore`].
//!
//! All maps sit behind one `tokio::sync::Mutex`, which makes every `commit_*`
//! trivially atomic. State is lost when the process exits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use clanbattle_core::model::{
    BattleState, Challenge, ChallengeQuery, Group, Membership, NewChallenge,
};
use clanbattle_core::{BattleId, ClanError, ClanStore, GroupId, MemberId};

#[derive(Default)]
struct Tables {
    groups: BTreeMap<GroupId, Group>,
    memberships: BTreeMap<(GroupId, MemberId), Membership>,
    challenges: Vec<Challenge>,
    backups: BTreeMap<(GroupId, BattleId), BattleState>,
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClanStore for MemoryStore {
    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, ClanError> {
        Ok(self.tables.lock().await.groups.get(&group_id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, ClanError> {
        Ok(self.tables.lock().await.groups.values().cloned().collect())
    }

    async fn save_group(&self, group: &Group) -> Result<(), ClanError> {
        self.tables
            .lock()
            .await
            .groups
            .insert(group.group_id, group.clone());
        Ok(())
    }

    async fn get_membership(
        &self,
        group_id: GroupId,
        member: MemberId,
    ) -> Result<Option<Membership>, ClanError> {
        Ok(self
            .tables
            .lock()
            .await
            .memberships
            .get(&(group_id, member))
            .cloned())
    }

    async fn save_membership(&self, membership: &Membership) -> Result<(), ClanError> {
        self.tables
            .lock()
            .await
            .memberships
            .insert((membership.group_id, membership.member), membership.clone());
        Ok(())
    }

    async fn delete_memberships(
        &self,
        group_id: GroupId,
        members: &[MemberId],
    ) -> Result<usize, ClanError> {
        let mut tables = self.tables.lock().await;
        Ok(members
            .iter()
            .filter(|m| tables.memberships.remove(&(group_id, **m)).is_some())
            .count())
    }

    async fn list_memberships(&self, group_id: GroupId) -> Result<Vec<Membership>, ClanError> {
        Ok(self
            .tables
            .lock()
            .await
            .memberships
            .range((group_id, MemberId(0))..=(group_id, MemberId(u64::MAX)))
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn query_challenges(&self, query: &ChallengeQuery) -> Result<Vec<Challenge>, ClanError> {
        Ok(self
            .tables
            .lock()
            .await
            .challenges
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect())
    }

    async fn last_challenge(
        &self,
        group_id: GroupId,
        battle_id: BattleId,
    ) -> Result<Option<Challenge>, ClanError> {
        Ok(self
            .tables
            .lock()
            .await
            .challenges
            .iter()
            .rev()
            .find(|c| c.group_id == group_id && c.battle_id == battle_id)
            .cloned())
    }

    async fn commit_challenge(
        &self,
        group: &Group,
        challenge: NewChallenge,
    ) -> Result<Challenge, ClanError> {
        let mut tables = self.tables.lock().await;
        tables.last_id += 1;
        let challenge = Challenge::from_new(tables.last_id, challenge);
        tables.challenges.push(challenge.clone());
        tables.groups.insert(group.group_id, group.clone());
        debug!(group_id = %group.group_id, id = challenge.id, "challenge committed");
        Ok(challenge)
    }

    async fn commit_undo(&self, group: &Group, challenge_id: i64) -> Result<(), ClanError> {
        let mut tables = self.tables.lock().await;
        let pos = tables
            .challenges
            .iter()
            .position(|c| c.id == challenge_id)
            .ok_or_else(|| {
                ClanError::Internal(format!("challenge {challenge_id} vanished before undo"))
            })?;
        tables.challenges.remove(pos);
        tables.groups.insert(group.group_id, group.clone());
        Ok(())
    }

    async fn record_counts(&self, group_id: GroupId) -> Result<Vec<(BattleId, u64)>, ClanError> {
        let tables = self.tables.lock().await;
        let mut counts: BTreeMap<BattleId, u64> = BTreeMap::new();
        for c in tables.challenges.iter().filter(|c| c.group_id == group_id) {
            *counts.entry(c.battle_id).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn commit_clear_archive(
        &self,
        group: &Group,
        battle_id: BattleId,
    ) -> Result<u64, ClanError> {
        let mut tables = self.tables.lock().await;
        let before = tables.challenges.len();
        tables
            .challenges
            .retain(|c| !(c.group_id == group.group_id && c.battle_id == battle_id));
        let deleted = (before - tables.challenges.len()) as u64;
        tables.groups.insert(group.group_id, group.clone());
        Ok(deleted)
    }

    async fn load_backup(
        &self,
        group_id: GroupId,
        battle_id: BattleId,
    ) -> Result<Option<BattleState>, ClanError> {
        Ok(self
            .tables
            .lock()
            .await
            .backups
            .get(&(group_id, battle_id))
            .cloned())
    }

    async fn commit_switch_archive(
        &self,
        group: &Group,
        backup_battle_id: BattleId,
        backup: &BattleState,
    ) -> Result<(), ClanError> {
        let mut tables = self.tables.lock().await;
        tables
            .backups
            .insert((group.group_id, backup_battle_id), backup.clone());
        tables.groups.insert(group.group_id, group.clone());
        Ok(())
    }
}
