// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot types carried on the status channel.

use clanbattle_core::{BossSlot, GroupId, MemberId};
use serde::Serialize;

/// A member currently fighting a boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claimant {
    pub member: MemberId,
    pub compensation: bool,
    pub behalf: Option<MemberId>,
    /// Seconds left on the last progress report, 0 if none.
    pub seconds: u32,
    /// Damage on the last progress report, 0 if none.
    pub damage: u64,
    /// Blocked waiting for the boss to die ("on the tree").
    pub tree: bool,
    pub note: Option<String>,
}

/// The state of one boss as seen by players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub slot: BossSlot,
    /// Health of the pool players attack next.
    pub health: u64,
    pub full_health: u64,
    /// Cycle the attackable pool belongs to.
    pub cycle: u32,
    /// True when this cycle's boss is dead and the next cycle's is up.
    pub is_next: bool,
    pub claimants: Vec<Claimant>,
    pub subscribers: Vec<MemberId>,
}

/// One published snapshot of a group's battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BossStatus {
    pub group_id: GroupId,
    /// Monotonic per group, stamped by the bus.
    pub version: u64,
    pub cycle: u32,
    pub slots: Vec<SlotStatus>,
    /// Result text of the mutation that produced this snapshot.
    pub message: Option<String>,
}

impl BossStatus {
    pub fn slot(&self, slot: BossSlot) -> Option<&SlotStatus> {
        self.slots.iter().find(|s| s.slot == slot)
    }
}
