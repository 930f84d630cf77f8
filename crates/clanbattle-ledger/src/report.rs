// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only views over the challenge ledger.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use clanbattle_core::calendar::{GameDateTime, pcr_timestamp};
use clanbattle_core::model::Challenge;
use clanbattle_core::{BattleId, BossSlot, GameServer, MemberId};
use serde::Serialize;

use crate::quota::DailyTally;

/// One ledger entry as shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: i64,
    pub battle_id: BattleId,
    pub member: MemberId,
    pub date: NaiveDate,
    /// Wall-clock instant of the attempt.
    pub timestamp: DateTime<Utc>,
    pub cycle: u32,
    pub slot: BossSlot,
    pub health_remain: u64,
    pub damage: u64,
    pub compensation: bool,
    pub behalf: Option<MemberId>,
    pub message: Option<String>,
}

impl ReportRow {
    pub fn from_challenge(c: &Challenge, server: GameServer, reset_hour: u32) -> Self {
        let at = GameDateTime {
            date: c.date,
            seconds: c.seconds,
        };
        Self {
            id: c.id,
            battle_id: c.battle_id,
            member: c.member,
            date: c.date,
            timestamp: pcr_timestamp(server, reset_hour, at),
            cycle: c.cycle,
            slot: c.slot,
            health_remain: c.health_remain,
            damage: c.damage,
            compensation: c.compensation,
            behalf: c.behalf,
            message: c.message.clone(),
        }
    }
}

/// Distinct members appearing in `challenges`, in ascending id order.
pub fn battle_members<'a>(challenges: impl IntoIterator<Item = &'a Challenge>) -> Vec<MemberId> {
    challenges
        .into_iter()
        .map(|c| c.member)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The group's progress for one game day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyOverview {
    /// Full attempts made by the whole group.
    pub full_attempts: u32,
    /// Members still holding unspent leftover credits, with their count.
    pub leftover_holders: Vec<(MemberId, u32)>,
}

/// Summarize one day of the group's ledger.
pub fn daily_overview<'a>(challenges: impl IntoIterator<Item = &'a Challenge>) -> DailyOverview {
    let mut per_member: BTreeMap<MemberId, Vec<&Challenge>> = BTreeMap::new();
    for c in challenges {
        per_member.entry(c.member).or_default().push(c);
    }

    let mut overview = DailyOverview::default();
    for (member, entries) in per_member {
        let tally = DailyTally::from_challenges(entries);
        overview.full_attempts += tally.finished;
        if tally.balance() > 0 {
            overview.leftover_holders.push((member, tally.balance()));
        }
    }
    overview
}
