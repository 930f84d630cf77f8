// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock member directory and fixed clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use clanbattle_core::{ClanError, Directory, GameClock, MemberId};

/// A directory backed by a name map. Unknown members resolve to `None`.
pub struct MockDirectory {
    names: Mutex<HashMap<MemberId, String>>,
    failing: AtomicBool,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            names: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub async fn set_name(&self, member: MemberId, name: &str) {
        self.names.lock().await.insert(member, name.to_string());
    }

    /// Make every later lookup fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn display_name(&self, member: MemberId) -> Result<Option<String>, ClanError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClanError::Internal("directory unavailable".to_string()));
        }
        Ok(self.names.lock().await.get(&member).cloned())
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl GameClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn known_unknown_and_failing_lookups() {
        let dir = MockDirectory::new();
        dir.set_name(MemberId(1), "Aoi").await;
        assert_eq!(dir.display_name(MemberId(1)).await.unwrap().as_deref(), Some("Aoi"));
        assert_eq!(dir.display_name(MemberId(2)).await.unwrap(), None);
        dir.set_failing(true);
        assert!(dir.display_name(MemberId(1)).await.is_err());
    }

    #[test]
    fn clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 4, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::hours(25));
        assert_eq!(clock.now(), start + Duration::hours(25));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
