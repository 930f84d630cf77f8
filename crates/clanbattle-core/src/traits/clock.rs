// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock source.

use chrono::{DateTime, Utc};

/// Source of the current instant. Tests substitute a fixed clock.
pub trait GameClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl GameClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
