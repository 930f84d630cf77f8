// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily attempt quota for one member.
//!
//! A member gets `daily_attempts` full attempts per game day. Every attempt
//! that defeats a boss without itself being a compensation attempt earns one
//! leftover credit, which is spent by a later compensation attempt.
//!
//! The tally is always rebuilt from the ledger, so it survives restarts and
//! undo without any extra bookkeeping.

use clanbattle_core::ClanError;
use clanbattle_core::model::Challenge;
use serde::Serialize;
use strum::Display;
use tracing::debug;

/// Counters over one member's entries for one game day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyTally {
    /// Attempts that consumed a full slot of the daily quota: every entry
    /// that left the boss alive, plus every compensation entry.
    pub finished: u32,
    /// Defeats that were not themselves compensation attempts.
    pub tail: u32,
    /// Compensation attempts made.
    pub compensation_used: u32,
}

impl DailyTally {
    /// Tally `challenges`, which must all belong to the same member and day.
    pub fn from_challenges<'a>(challenges: impl IntoIterator<Item = &'a Challenge>) -> Self {
        let mut tally = Self::default();
        for c in challenges {
            tally.push(c.health_remain, c.compensation);
        }
        tally
    }

    fn push(&mut self, health_remain: u64, compensation: bool) {
        if health_remain > 0 || compensation {
            self.finished += 1;
        }
        if health_remain == 0 && !compensation {
            self.tail += 1;
        }
        if compensation {
            self.compensation_used += 1;
        }
    }

    /// Unspent leftover credits.
    pub fn balance(&self) -> u32 {
        self.tail.saturating_sub(self.compensation_used)
    }

    /// Ordinal of the next attempt within the day (1-based).
    pub fn next_ordinal(&self) -> u32 {
        self.finished + 1
    }

    pub fn is_exhausted(&self, daily_attempts: u32) -> bool {
        self.finished >= daily_attempts
    }

    /// Reject an attempt the quota does not allow.
    ///
    /// `day_label` names the day in the error ("today", "yesterday").
    pub fn check(
        &self,
        daily_attempts: u32,
        compensation: bool,
        day_label: &str,
    ) -> Result<(), ClanError> {
        if self.is_exhausted(daily_attempts) {
            debug!(finished = self.finished, daily_attempts, "daily quota exhausted");
            return Err(ClanError::group(format!(
                "{daily_attempts} full attempts already made {day_label}"
            )));
        }
        if compensation && self.balance() == 0 {
            return Err(ClanError::group("no leftover attempt available"));
        }
        Ok(())
    }

    /// Whether a fresh claim should be flagged as compensation on its own:
    /// every full attempt is spoken for and only leftover credits remain.
    pub fn forces_compensation(&self, daily_attempts: u32) -> bool {
        let spoken_for = (self.finished + self.tail).saturating_sub(self.compensation_used);
        spoken_for >= daily_attempts && self.balance() != 0
    }
}

/// What an attempt counted as, for result messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum AttemptKind {
    #[strum(serialize = "full attempt")]
    Full,
    #[strum(serialize = "leftover attempt")]
    Leftover,
    #[strum(serialize = "last hit")]
    LastHit,
    #[strum(serialize = "leftover last hit")]
    LeftoverLastHit,
}

impl AttemptKind {
    pub fn of(defeated: bool, compensation: bool) -> Self {
        match (defeated, compensation) {
            (false, false) => Self::Full,
            (false, true) => Self::Leftover,
            (true, false) => Self::LastHit,
            (true, true) => Self::LeftoverLastHit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tally(entries: &[(u64, bool)]) -> DailyTally {
        let mut t = DailyTally::default();
        for &(remain, comp) in entries {
            t.push(remain, comp);
        }
        t
    }

    #[test]
    fn empty_day_allows_full_attempt() {
        let t = DailyTally::default();
        assert!(t.check(3, false, "today").is_ok());
        assert_eq!(t.next_ordinal(), 1);
    }

    #[test]
    fn three_partial_hits_exhaust_quota() {
        let t = tally(&[(10, false), (20, false), (30, false)]);
        assert_eq!(t.finished, 3);
        let err = t.check(3, false, "today").unwrap_err();
        assert!(matches!(err, ClanError::GroupError(_)));
        assert!(err.to_string().contains("today"));
    }

    #[test]
    fn last_hit_earns_leftover_credit() {
        let t = tally(&[(0, false)]);
        assert_eq!(t.finished, 0);
        assert_eq!(t.tail, 1);
        assert_eq!(t.balance(), 1);
        assert!(t.check(3, true, "today").is_ok());
    }

    #[test]
    fn compensation_without_credit_is_rejected() {
        let t = tally(&[(10, false)]);
        let err = t.check(3, true, "today").unwrap_err();
        assert_eq!(err.to_string(), "no leftover attempt available");
    }

    #[test]
    fn compensation_spends_credit_and_counts_as_finished() {
        let t = tally(&[(0, false), (50, true)]);
        assert_eq!(t.finished, 1);
        assert_eq!(t.compensation_used, 1);
        assert_eq!(t.balance(), 0);
    }

    #[test]
    fn forced_compensation_after_full_quota_of_last_hits() {
        // Two partial attempts plus a last hit: the third slot is spoken for,
        // the leftover credit is the only attempt left.
        let t = tally(&[(10, false), (20, false), (0, false)]);
        assert!(t.forces_compensation(3));
        assert!(!tally(&[(10, false), (0, false)]).forces_compensation(3));
        assert!(!tally(&[(10, false), (20, false), (30, false)]).forces_compensation(3));
    }

    #[test]
    fn attempt_kind_labels() {
        assert_eq!(AttemptKind::of(false, false).to_string(), "full attempt");
        assert_eq!(AttemptKind::of(true, true).to_string(), "leftover last hit");
    }

    proptest! {
        // Any sequence the quota check lets through keeps finished within
        // the quota and the compensation balance non-negative.
        #[test]
        fn checked_sequences_stay_within_quota(
            attempts in prop::collection::vec((0u64..3, any::<bool>()), 0..12)
        ) {
            let mut t = DailyTally::default();
            for (remain, comp) in attempts {
                if t.check(3, comp, "today").is_ok() {
                    t.push(remain, comp);
                }
                prop_assert!(t.finished <= 3);
                prop_assert!(t.compensation_used <= t.tail);
            }
        }
    }
}
