// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Challenge ledger rules: recording an attempt and undoing the last one.
//!
//! Both functions work on a working copy of the group. The service commits
//! the copy together with the ledger write, or drops it on error.

use clanbattle_core::calendar::GameDateTime;
use clanbattle_core::model::{Challenge, Group, NewChallenge};
use clanbattle_core::{BossHealth, BossSlot, ClanError, MemberId};
use clanbattle_ledger::{AttemptKind, DailyTally};
use tracing::debug;

use crate::cycle::advance_cycle;
use crate::effects::Outbound;
use crate::engagement::{self, ClaimRequest, ReleaseScope};
use crate::stage::StageBook;
use crate::subscription;

/// A member reporting an attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordRequest {
    pub reporter: MemberId,
    pub defeated: bool,
    /// Required unless `defeated`.
    pub damage: Option<u64>,
    /// The member who actually fought, when reporting for someone else.
    pub behalf: Option<MemberId>,
    pub compensation: bool,
    /// Book the attempt on the previous game day.
    pub previous_day: bool,
    /// Boss to record against; defaults to the dealer's engagement.
    pub slot: Option<BossSlot>,
    pub message: Option<String>,
}

impl RecordRequest {
    pub fn hit(reporter: MemberId, slot: BossSlot, damage: u64) -> Self {
        Self {
            reporter,
            damage: Some(damage),
            slot: Some(slot),
            ..Self::default()
        }
    }

    pub fn defeat(reporter: MemberId, slot: BossSlot) -> Self {
        Self {
            reporter,
            defeated: true,
            slot: Some(slot),
            ..Self::default()
        }
    }

    /// Reject a partial hit without damage.
    pub fn check_damage(&self) -> Result<(), ClanError> {
        if !self.defeated && self.damage.is_none() {
            return Err(ClanError::invalid("damage is required unless the boss was defeated"));
        }
        Ok(())
    }

    /// The member who dealt the damage and the member recorded as behalf.
    pub fn dealer(&self) -> (MemberId, Option<MemberId>) {
        match self.behalf {
            Some(dealer) if dealer != self.reporter => (dealer, Some(self.reporter)),
            _ => (self.reporter, None),
        }
    }
}

/// The dealer's ledger as of the request, read before planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerView {
    pub today: DailyTally,
    /// Only read when the request books the previous day.
    pub yesterday: DailyTally,
    /// Anyone in the group has an entry today in the active archive.
    pub group_has_entries_today: bool,
}

/// Outcome of planning a record.
#[derive(Debug, Clone)]
pub struct RecordPlan {
    pub challenge: NewChallenge,
    pub kind: AttemptKind,
    /// 1-based attempt number of the dealer on the booked day.
    pub ordinal: u32,
    pub day_label: &'static str,
    pub outbound: Vec<Outbound>,
}

/// Apply `request` to `group` and build the ledger entry for it.
pub fn plan_record(
    group: &mut Group,
    stages: &StageBook,
    request: &RecordRequest,
    view: &LedgerView,
    now: GameDateTime,
    daily_attempts: u32,
) -> Result<RecordPlan, ClanError> {
    request.check_damage()?;
    let (dealer, behalf) = request.dealer();

    let slot = match (group.engaged_slot(dealer), request.slot) {
        (Some(_), Some(slot)) => {
            engagement::release(group, ReleaseScope::Member(dealer))?;
            slot
        }
        (Some(held), None) => held,
        (None, Some(slot)) => slot,
        (None, None) => {
            return Err(ClanError::invalid("neither claimed nor named a boss"));
        }
    };

    if group.engagement(dealer).is_none() {
        let claim = ClaimRequest {
            member: dealer,
            slot,
            behalf,
            compensation: request.compensation,
        };
        engagement::claim(group, stages, &claim, &view.today, daily_attempts)?;
    }

    let (cycle, active) = if group.now_health[slot] == 0 {
        if group.next_health[slot] == 0 {
            return Err(ClanError::invalid(format!("boss {slot} has no health left")));
        }
        (group.cycle.saturating_add(1), group.next_health[slot])
    } else {
        (group.cycle, group.now_health[slot])
    };

    let damage = if request.defeated {
        active
    } else {
        let damage = request.damage.unwrap_or_default();
        if damage >= active {
            return Err(ClanError::invalid(format!(
                "{damage} damage would defeat boss {slot} ({active} left); report a defeat instead"
            )));
        }
        damage
    };

    let (at, tally, day_label) = if request.previous_day {
        if view.group_has_entries_today {
            return Err(ClanError::group(
                "today already has records, cannot book on yesterday",
            ));
        }
        (now.previous_day(), view.yesterday, "yesterday")
    } else {
        (now, view.today, "today")
    };

    let held = group.engagement(dealer).map(|(_, e)| e.compensation);
    let compensation = request.compensation || held.unwrap_or(false);
    tally.check(daily_attempts, compensation, day_label)?;

    let health_remain = active - damage;
    let pool = if cycle == group.cycle {
        &mut group.now_health
    } else {
        &mut group.next_health
    };
    pool[slot] = health_remain;

    let mut outbound = Vec::new();
    if request.defeated {
        let tree: Vec<MemberId> = engagement::blocked_on(group, slot)
            .into_iter()
            .filter(|m| *m != dealer)
            .collect();
        if !tree.is_empty() {
            outbound.push(Outbound::Group {
                group_id: group.group_id,
                text: format!("Boss {slot} is down, you can come off the tree"),
                mentions: tree,
            });
        }
        if group.now_health.all_cleared() {
            outbound.extend(advance_cycle(group, stages)?);
            if group.now_health.all_cleared() {
                // Every next-cycle boss was already down as well.
                outbound.extend(advance_cycle(group, stages)?);
            }
        }
        engagement::release(group, ReleaseScope::Slot(slot))?;
        if stages.can_continue(group, slot) {
            outbound.extend(subscription::drain(group, slot));
        }
    } else if let Err(e) = engagement::release(group, ReleaseScope::Member(dealer)) {
        debug!(error = %e, %dealer, "no engagement to release after hit");
    }

    Ok(RecordPlan {
        challenge: NewChallenge {
            group_id: group.group_id,
            battle_id: group.battle_id,
            member: dealer,
            date: at.date,
            seconds: at.seconds,
            cycle,
            slot,
            health_remain,
            damage,
            compensation,
            behalf,
            message: request.message.clone(),
        },
        kind: AttemptKind::of(request.defeated, compensation),
        ordinal: tally.next_ordinal(),
        day_label,
        outbound,
    })
}

/// Reverse `entry`, the last ledger entry of the group's active archive.
pub fn plan_undo(
    group: &mut Group,
    stages: &StageBook,
    entry: &Challenge,
    requester: MemberId,
    privileged: bool,
) -> Result<(), ClanError> {
    if entry.member != requester && !privileged {
        return Err(ClanError::user(format!(
            "the last record belongs to {}, only they or an admin can undo it",
            entry.member
        )));
    }

    if entry.cycle < group.cycle {
        // The entry cleared its cycle and advanced the group. Two cycles
        // ahead means the carried-in pool was already empty.
        group.next_health = if group.cycle > entry.cycle + 1 {
            BossHealth::ZERO
        } else {
            group.now_health
        };
        group.now_health = BossHealth::ZERO;
        group.now_health[entry.slot] = entry.damage;
        group.cycle = entry.cycle;
        return Ok(());
    }

    let full = stages.full_health(group.server, entry.cycle)[entry.slot];
    let pool = if entry.cycle == group.cycle {
        &mut group.now_health
    } else {
        &mut group.next_health
    };
    pool[entry.slot] = pool[entry.slot].saturating_add(entry.damage).min(full);
    Ok(())
}
