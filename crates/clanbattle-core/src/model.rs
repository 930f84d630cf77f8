// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent domain records: groups, memberships, ledger entries and backups.
//!
//! These are the canonical shapes exchanged with [`ClanStore`](crate::traits::ClanStore)
//! implementations. Business rules over them live in `clanbattle-engine`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::health::BossHealth;
use crate::types::{BattleId, BossSlot, GameServer, GroupId, MemberId, Role};

/// A member's open attempt on a boss slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    /// The attempt is funded by a leftover (compensation) credit.
    pub compensation: bool,
    /// Member who claimed on the attacker's behalf, if any.
    pub behalf: Option<MemberId>,
    /// Last self-reported seconds left in the fight.
    pub seconds: u32,
    /// Last self-reported damage so far.
    pub damage: u64,
    /// The member is stuck ("on the tree") and waiting for the boss to die.
    pub tree: bool,
    /// Free-text note left when going up the tree.
    pub note: Option<String>,
}

/// Open attempts per slot. Invariant: no slot maps to an empty member map.
pub type EngagementMap = BTreeMap<BossSlot, BTreeMap<MemberId, Engagement>>;

/// Subscription waitlists per slot, in subscription order. Invariant: no empty lists.
pub type SubscriptionMap = BTreeMap<BossSlot, Vec<MemberId>>;

/// Battle state of a group that is saved and restored on archive switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    pub name: Option<String>,
    pub server: GameServer,
    pub cycle: u32,
    pub now_health: BossHealth,
    pub next_health: BossHealth,
    #[serde(default)]
    pub engagements: EngagementMap,
    #[serde(default)]
    pub subscriptions: SubscriptionMap,
}

/// A registered chat group and its live boss state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub group_id: GroupId,
    pub name: Option<String>,
    pub server: GameServer,
    /// Active archive slot.
    pub battle_id: BattleId,
    /// Current cycle, starting at 1.
    pub cycle: u32,
    pub now_health: BossHealth,
    pub next_health: BossHealth,
    pub engagements: EngagementMap,
    pub subscriptions: SubscriptionMap,
    /// Soft-deleted groups are revived by re-registration.
    pub deleted: bool,
}

impl Group {
    /// Slot on which `member` currently holds an engagement, if any.
    pub fn engaged_slot(&self, member: MemberId) -> Option<BossSlot> {
        self.engagements
            .iter()
            .find(|(_, members)| members.contains_key(&member))
            .map(|(slot, _)| *slot)
    }

    /// The member's open engagement, if any.
    pub fn engagement(&self, member: MemberId) -> Option<(BossSlot, &Engagement)> {
        self.engagements
            .iter()
            .find_map(|(slot, members)| members.get(&member).map(|e| (*slot, e)))
    }

    pub fn engagement_mut(&mut self, member: MemberId) -> Option<(BossSlot, &mut Engagement)> {
        self.engagements
            .iter_mut()
            .find_map(|(slot, members)| members.get_mut(&member).map(|e| (*slot, e)))
    }

    /// Snapshot of the archive-scoped state.
    pub fn battle_state(&self) -> BattleState {
        BattleState {
            name: self.name.clone(),
            server: self.server,
            cycle: self.cycle,
            now_health: self.now_health,
            next_health: self.next_health,
            engagements: self.engagements.clone(),
            subscriptions: self.subscriptions.clone(),
        }
    }

    /// Overwrite the archive-scoped state from a backup.
    pub fn restore(&mut self, state: BattleState) {
        self.name = state.name;
        self.server = state.server;
        self.cycle = state.cycle;
        self.now_health = state.now_health;
        self.next_health = state.next_health;
        self.engagements = state.engagements;
        self.subscriptions = state.subscriptions;
    }
}

/// A member's membership row in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: GroupId,
    pub member: MemberId,
    pub role: Role,
    /// Game date on which the member last used their save-slot.
    pub last_save_slot: Option<NaiveDate>,
}

/// A ledger entry not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChallenge {
    pub group_id: GroupId,
    pub battle_id: BattleId,
    /// The member who actually dealt the damage.
    pub member: MemberId,
    /// Game date (daily reset aware).
    pub date: NaiveDate,
    /// Seconds since the daily reset.
    pub seconds: u32,
    pub cycle: u32,
    pub slot: BossSlot,
    /// Health left after this attempt; 0 iff the boss was defeated.
    pub health_remain: u64,
    pub damage: u64,
    pub compensation: bool,
    /// Member who reported on the attacker's behalf.
    pub behalf: Option<MemberId>,
    pub message: Option<String>,
}

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Monotonic creation sequence; defines total order.
    pub id: i64,
    pub group_id: GroupId,
    pub battle_id: BattleId,
    pub member: MemberId,
    pub date: NaiveDate,
    pub seconds: u32,
    pub cycle: u32,
    pub slot: BossSlot,
    pub health_remain: u64,
    pub damage: u64,
    pub compensation: bool,
    pub behalf: Option<MemberId>,
    pub message: Option<String>,
}

impl Challenge {
    pub fn from_new(id: i64, c: NewChallenge) -> Self {
        Self {
            id,
            group_id: c.group_id,
            battle_id: c.battle_id,
            member: c.member,
            date: c.date,
            seconds: c.seconds,
            cycle: c.cycle,
            slot: c.slot,
            health_remain: c.health_remain,
            damage: c.damage,
            compensation: c.compensation,
            behalf: c.behalf,
            message: c.message,
        }
    }

    /// The attempt defeated its boss.
    pub fn is_defeat(&self) -> bool {
        self.health_remain == 0
    }
}

/// Which archive(s) a ledger query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveSelector {
    /// The group's active archive.
    #[default]
    Current,
    /// Every archive.
    All,
    /// A specific archive.
    Id(BattleId),
}

/// Filter for ledger queries. `battle_id: None` means every archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeQuery {
    pub group_id: GroupId,
    pub battle_id: Option<BattleId>,
    pub member: Option<MemberId>,
    pub date: Option<NaiveDate>,
}

impl ChallengeQuery {
    /// Entries of one archive on one game date.
    pub fn day(group_id: GroupId, battle_id: BattleId, date: NaiveDate) -> Self {
        Self {
            group_id,
            battle_id: Some(battle_id),
            member: None,
            date: Some(date),
        }
    }

    pub fn member(mut self, member: MemberId) -> Self {
        self.member = Some(member);
        self
    }

    pub fn matches(&self, c: &Challenge) -> bool {
        c.group_id == self.group_id
            && self.battle_id.is_none_or(|b| b == c.battle_id)
            && self.member.is_none_or(|m| m == c.member)
            && self.date.is_none_or(|d| d == c.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Group {
        Group {
            group_id: GroupId(1),
            name: None,
            server: GameServer::Cn,
            battle_id: 0,
            cycle: 1,
            now_health: BossHealth::new([1; 5]),
            next_health: BossHealth::new([2; 5]),
            engagements: EngagementMap::new(),
            subscriptions: SubscriptionMap::new(),
            deleted: false,
        }
    }

    #[test]
    fn engaged_slot_finds_member() {
        let mut g = group();
        let slot = BossSlot::ALL[2];
        g.engagements
            .entry(slot)
            .or_default()
            .insert(MemberId(7), Engagement::default());
        assert_eq!(g.engaged_slot(MemberId(7)), Some(slot));
        assert_eq!(g.engaged_slot(MemberId(8)), None);
    }

    #[test]
    fn engagement_map_round_trips_through_json() {
        let mut g = group();
        g.engagements.entry(BossSlot::ALL[0]).or_default().insert(
            MemberId(42),
            Engagement {
                tree: true,
                note: Some("no stamina".into()),
                ..Engagement::default()
            },
        );
        let json = serde_json::to_string(&g.engagements).unwrap();
        let back: EngagementMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g.engagements);
    }

    #[test]
    fn backup_restores_battle_state() {
        let mut g = group();
        let saved = g.battle_state();
        g.cycle = 9;
        g.now_health = BossHealth::ZERO;
        g.restore(saved);
        assert_eq!(g.cycle, 1);
        assert_eq!(g.now_health, BossHealth::new([1; 5]));
    }
}
