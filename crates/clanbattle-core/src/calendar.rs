// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game calendar: maps wall-clock time onto the game's daily-reset days.
//!
//! A game day starts at `reset_hour` local time of the region, so an attempt
//! at 03:00 local still belongs to the previous game day.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

use crate::types::GameServer;

/// Default local hour at which the game day rolls over.
pub const DEFAULT_RESET_HOUR: u32 = 5;

/// A point in game time: the game date and seconds elapsed since its reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameDateTime {
    pub date: NaiveDate,
    pub seconds: u32,
}

impl GameDateTime {
    /// The same instant expressed relative to the previous game day.
    pub fn previous_day(self) -> Self {
        Self {
            date: self.date.pred_opt().unwrap_or(self.date),
            seconds: self.seconds + 86_400,
        }
    }
}

/// Convert a UTC instant into game time for `server`.
pub fn pcr_datetime(server: GameServer, reset_hour: u32, now: DateTime<Utc>) -> GameDateTime {
    let shifted = now.naive_utc() + Duration::hours(i64::from(server.utc_offset_hours()))
        - Duration::hours(i64::from(reset_hour));
    GameDateTime {
        date: shifted.date(),
        seconds: shifted.num_seconds_from_midnight(),
    }
}

/// Convert game time back into a UTC instant.
pub fn pcr_timestamp(server: GameServer, reset_hour: u32, at: GameDateTime) -> DateTime<Utc> {
    let midnight = at.date.and_time(chrono::NaiveTime::MIN);
    let naive = midnight + Duration::hours(i64::from(reset_hour))
        + Duration::seconds(i64::from(at.seconds))
        - Duration::hours(i64::from(server.utc_offset_hours()));
    naive.and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn before_reset_belongs_to_previous_day() {
        // 20:00 UTC = 04:00 next day in UTC+8, before the 05:00 reset.
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap();
        let t = pcr_datetime(GameServer::Cn, 5, now);
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(t.seconds, 23 * 3600);
    }

    #[test]
    fn after_reset_is_new_day() {
        // 21:30 UTC = 06:30 next day in UTC+9.
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 21, 30, 0).unwrap();
        let t = pcr_datetime(GameServer::Jp, 5, now);
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(t.seconds, 5400);
    }

    #[test]
    fn timestamp_inverts_datetime() {
        let now = Utc.with_ymd_and_hms(2026, 7, 14, 11, 22, 33).unwrap();
        for server in GameServer::ALL {
            let t = pcr_datetime(server, 5, now);
            assert_eq!(pcr_timestamp(server, 5, t), now);
            assert_eq!(pcr_timestamp(server, 5, t.previous_day()), now);
        }
    }
}
