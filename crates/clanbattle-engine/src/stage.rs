// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boss health table: stage levels by cycle and the attackability rules
//! derived from them.

use clanbattle_config::model::{StageLevel, StageTables};
use clanbattle_core::model::Group;
use clanbattle_core::{BossHealth, BossSlot, ClanError, GameServer};

/// Highest cycle a group can be moved to or advance into.
pub const MAX_CYCLE: u32 = 9_999;

/// Levels of one server. Never empty.
#[derive(Debug, Clone)]
struct ServerStages {
    levels: Vec<StageLevel>,
}

impl ServerStages {
    /// Index of the level covering `cycle`. Cycles past every range map to
    /// the last level.
    fn index(&self, cycle: u32) -> usize {
        self.levels
            .iter()
            .position(|level| level.covers(cycle))
            .unwrap_or(self.levels.len() - 1)
    }
}

/// Read-only stage tables for every server.
#[derive(Debug, Clone)]
pub struct StageBook {
    jp: ServerStages,
    tw: ServerStages,
    cn: ServerStages,
    kr: ServerStages,
}

impl StageBook {
    pub fn new(tables: &StageTables) -> Result<Self, ClanError> {
        let server = |s: GameServer| -> Result<ServerStages, ClanError> {
            let levels = tables.levels(s).to_vec();
            if levels.is_empty() {
                return Err(ClanError::Config(format!("no stage levels for server {s}")));
            }
            Ok(ServerStages { levels })
        };
        Ok(Self {
            jp: server(GameServer::Jp)?,
            tw: server(GameServer::Tw)?,
            cn: server(GameServer::Cn)?,
            kr: server(GameServer::Kr)?,
        })
    }

    fn server(&self, server: GameServer) -> &ServerStages {
        match server {
            GameServer::Jp => &self.jp,
            GameServer::Tw => &self.tw,
            GameServer::Cn => &self.cn,
            GameServer::Kr => &self.kr,
        }
    }

    pub fn level_index(&self, server: GameServer, cycle: u32) -> usize {
        self.server(server).index(cycle)
    }

    /// Full health of every boss at the level covering `cycle`.
    pub fn full_health(&self, server: GameServer, cycle: u32) -> BossHealth {
        let stages = self.server(server);
        BossHealth::new(stages.levels[stages.index(cycle)].health)
    }

    /// Fill `now` from the level of `cycle` and `next` from the level of
    /// `cycle + 1`, and move the group to `cycle`.
    pub fn initialize(&self, group: &mut Group, cycle: u32) {
        group.cycle = cycle;
        group.now_health = self.full_health(group.server, cycle);
        group.next_health = self.full_health(group.server, cycle.saturating_add(1));
    }

    /// Whether `slot` can be fought in the next cycle while the group is
    /// still in its current one.
    ///
    /// False when both pools are empty, or when the next cycle belongs to a
    /// different stage level.
    pub fn can_continue(&self, group: &Group, slot: BossSlot) -> bool {
        if group.now_health[slot] == 0 && group.next_health[slot] == 0 {
            return false;
        }
        self.level_index(group.server, group.cycle)
            == self.level_index(group.server, group.cycle.saturating_add(1))
    }

    /// A slot can be claimed while its current boss lives, or when its
    /// next-cycle boss is reachable.
    pub fn claimable(&self, group: &Group, slot: BossSlot) -> bool {
        group.now_health[slot] > 0 || self.can_continue(group, slot)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use clanbattle_core::GroupId;
    use clanbattle_core::model::{EngagementMap, SubscriptionMap};

    /// Two levels: cycles 1..=3 at 100 per boss, 4.. at 200 per boss.
    pub(crate) fn two_level_book() -> StageBook {
        StageBook::new(&StageTables::uniform(vec![
            StageLevel::new(1, 3, [100; 5]),
            StageLevel::new(4, 999, [200; 5]),
        ]))
        .unwrap()
    }

    pub(crate) fn fresh_group(book: &StageBook, cycle: u32) -> Group {
        let mut group = Group {
            group_id: GroupId(1),
            name: None,
            server: GameServer::Cn,
            battle_id: 0,
            cycle: 1,
            now_health: BossHealth::ZERO,
            next_health: BossHealth::ZERO,
            engagements: EngagementMap::new(),
            subscriptions: SubscriptionMap::new(),
            deleted: false,
        };
        book.initialize(&mut group, cycle);
        group
    }

    #[test]
    fn initialize_reads_both_levels() {
        let book = two_level_book();
        let g = fresh_group(&book, 3);
        assert_eq!(g.now_health, BossHealth::new([100; 5]));
        assert_eq!(g.next_health, BossHealth::new([200; 5]));
    }

    #[test]
    fn cycles_past_the_table_use_last_level() {
        let book = StageBook::new(&StageTables::uniform(vec![
            StageLevel::new(1, 2, [1; 5]),
            StageLevel::new(3, 5, [9; 5]),
        ]))
        .unwrap();
        assert_eq!(book.level_index(GameServer::Jp, 6), 1);
        assert_eq!(book.full_health(GameServer::Jp, 4000), BossHealth::new([9; 5]));
    }

    #[test]
    fn empty_server_table_is_a_config_error() {
        let mut tables = StageTables::uniform(vec![StageLevel::new(1, 999, [1; 5])]);
        tables.kr.clear();
        assert!(matches!(StageBook::new(&tables), Err(ClanError::Config(_))));
    }

    #[test]
    fn cannot_continue_across_stage_boundary() {
        let book = two_level_book();
        let slot = BossSlot::ALL[1];

        let mut g = fresh_group(&book, 2);
        g.now_health[slot] = 0;
        assert!(book.can_continue(&g, slot));
        assert!(book.claimable(&g, slot));

        let mut g = fresh_group(&book, 3);
        g.now_health[slot] = 0;
        assert!(!book.can_continue(&g, slot));
        assert!(!book.claimable(&g, slot));
    }

    #[test]
    fn both_pools_empty_is_not_claimable() {
        let book = two_level_book();
        let slot = BossSlot::ALL[4];
        let mut g = fresh_group(&book, 1);
        g.now_health[slot] = 0;
        g.next_health[slot] = 0;
        assert!(!book.can_continue(&g, slot));
        assert!(!book.claimable(&g, slot));
    }
}
