// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boss-cycle state machine and challenge ledger orchestration.
//!
//! The [`BattleService`] is the central coordinator that:
//! - Serializes every operation per group
//! - Applies the claim, record and undo rules to the group's bosses
//! - Commits groups and ledger entries through a [`ClanStore`](clanbattle_core::ClanStore)
//! - Publishes a status snapshot after every change
//! - Sends notifications once the group is unlocked
//!
//! The rule modules are pure functions over a [`Group`](clanbattle_core::model::Group)
//! and can be used without the service.

pub mod archive;
pub mod challenge;
pub mod cycle;
pub mod effects;
pub mod engagement;
pub mod service;
pub mod stage;
pub mod subscription;
pub mod summary;

pub use challenge::{RecordRequest, plan_record, plan_undo};
pub use effects::Outbound;
pub use engagement::{ClaimRequest, ReleaseScope};
pub use service::{BattleService, RecordOutcome, SaveSlotAction, SlotOverride};
pub use stage::StageBook;
