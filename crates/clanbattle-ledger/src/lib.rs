// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily quota accounting and reporting over the challenge ledger.
//!
//! This crate provides:
//! - **Quota tally**: full attempts, last hits and leftover (compensation)
//!   credits of one member on one game day
//! - **Reports**: ledger rows with computed timestamps, battle members and the
//!   group's daily overview

pub mod quota;
pub mod report;

pub use quota::{AttemptKind, DailyTally};
pub use report::{DailyOverview, ReportRow, battle_members, daily_overview};
