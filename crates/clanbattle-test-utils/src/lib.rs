// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for clan battle integration tests.
//!
//! Provides mock collaborators and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a chat platform.
//!
//! # Components
//!
//! - [`MockNotifier`] - Captures outbound notifications
//! - [`MockDirectory`] - Name lookup from a fixed map
//! - [`FixedClock`] - A clock tests move by hand
//! - [`TestHarness`] - A complete [`BattleService`](clanbattle_engine::BattleService) stack

pub mod harness;
pub mod mock_directory;
pub mod mock_notifier;

pub use harness::TestHarness;
pub use mock_directory::{FixedClock, MockDirectory};
pub use mock_notifier::{MockNotifier, Notification};
