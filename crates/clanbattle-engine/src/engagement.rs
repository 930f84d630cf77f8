// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engagement registry: who is currently fighting which boss.
//!
//! A member holds at most one engagement across all slots. Empty per-slot
//! maps are always removed, so an empty outer map means nobody is fighting.

use clanbattle_core::model::{Engagement, Group};
use clanbattle_core::{BossSlot, ClanError, MemberId};
use clanbattle_ledger::DailyTally;

use crate::stage::StageBook;

/// Which engagements a release drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseScope {
    All,
    Member(MemberId),
    Slot(BossSlot),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub member: MemberId,
    pub slot: BossSlot,
    /// The member reporting for `member`, if any.
    pub behalf: Option<MemberId>,
    pub compensation: bool,
}

/// Open an engagement for `request.member`.
///
/// `tally` is the member's quota for today. Returns the effective
/// compensation flag, which is forced on when only leftover credits remain.
pub fn claim(
    group: &mut Group,
    stages: &StageBook,
    request: &ClaimRequest,
    tally: &DailyTally,
    daily_attempts: u32,
) -> Result<bool, ClanError> {
    if let Some(held) = group.engaged_slot(request.member) {
        return Err(ClanError::group(format!("already fighting boss {held}")));
    }
    if !stages.claimable(group, request.slot) {
        return Err(ClanError::group(format!(
            "boss {} cannot be challenged until this cycle's bosses are all down",
            request.slot
        )));
    }
    tally.check(daily_attempts, request.compensation, "today")?;

    let compensation = request.compensation || tally.forces_compensation(daily_attempts);
    group.engagements.entry(request.slot).or_default().insert(
        request.member,
        Engagement {
            compensation,
            behalf: request.behalf,
            ..Engagement::default()
        },
    );
    Ok(compensation)
}

/// Store the member's mid-fight progress. `(0, 0)` clears it.
pub fn report_progress(
    group: &mut Group,
    member: MemberId,
    seconds: u32,
    damage: u64,
) -> Result<BossSlot, ClanError> {
    let Some((slot, engagement)) = group.engagement_mut(member) else {
        return Err(ClanError::group("not fighting any boss"));
    };
    engagement.seconds = seconds;
    engagement.damage = damage;
    Ok(slot)
}

pub fn mark_blocked(
    group: &mut Group,
    member: MemberId,
    note: Option<String>,
) -> Result<BossSlot, ClanError> {
    let Some((slot, engagement)) = group.engagement_mut(member) else {
        return Err(ClanError::group("not fighting any boss"));
    };
    if engagement.tree {
        return Err(ClanError::group("already on the tree"));
    }
    engagement.tree = true;
    engagement.note = note;
    Ok(slot)
}

pub fn unblock(group: &mut Group, member: MemberId) -> Result<BossSlot, ClanError> {
    let Some((slot, engagement)) = group.engagement_mut(member) else {
        return Err(ClanError::group("not fighting any boss"));
    };
    engagement.tree = false;
    engagement.note = None;
    Ok(slot)
}

/// Drop engagements in `scope`, returning how many were dropped.
pub fn release(group: &mut Group, scope: ReleaseScope) -> Result<usize, ClanError> {
    if group.engagements.is_empty() {
        return Err(ClanError::group("nobody is fighting any boss"));
    }
    let released = match scope {
        ReleaseScope::All => {
            let count = group.engagements.values().map(|m| m.len()).sum();
            group.engagements.clear();
            count
        }
        ReleaseScope::Member(member) => {
            let Some(slot) = group.engaged_slot(member) else {
                return Err(ClanError::group("not fighting any boss"));
            };
            if let Some(members) = group.engagements.get_mut(&slot) {
                members.remove(&member);
                if members.is_empty() {
                    group.engagements.remove(&slot);
                }
            }
            1
        }
        ReleaseScope::Slot(slot) => group
            .engagements
            .remove(&slot)
            .map(|members| members.len())
            .unwrap_or(0),
    };
    Ok(released)
}

/// Members blocked on `slot`, in id order.
pub fn blocked_on(group: &Group, slot: BossSlot) -> Vec<MemberId> {
    group
        .engagements
        .get(&slot)
        .map(|members| {
            members
                .iter()
                .filter(|(_, e)| e.tree)
                .map(|(m, _)| *m)
                .collect()
        })
        .unwrap_or_default()
}
