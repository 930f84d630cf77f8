// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the clan battle tracker.
//!
//! This crate provides the domain records, the shared error type, the game
//! calendar and the collaborator traits (store, notifier, directory, clock)
//! used throughout the workspace.

pub mod calendar;
pub mod error;
pub mod health;
pub mod model;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ClanError;
pub use health::BossHealth;
pub use types::{BattleId, BossSlot, GameServer, GroupId, MemberId, Role, SLOT_COUNT};

pub use traits::{ClanStore, Directory, GameClock, Notifier, SystemClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clan_error_business_kinds() {
        assert!(ClanError::invalid("x").is_business());
        assert!(ClanError::GroupNotFound(GroupId(1)).is_business());
        assert!(ClanError::UserNotInGroup(MemberId(1)).is_business());
        assert!(ClanError::group("x").is_business());
        assert!(ClanError::user("x").is_business());
        assert!(!ClanError::storage(std::io::Error::other("disk")).is_business());
        assert!(!ClanError::Internal("x".into()).is_business());
    }

    #[test]
    fn malformed_json_is_a_storage_error() {
        let err: ClanError = serde_json::from_str::<BossHealth>("[1, 2]")
            .unwrap_err()
            .into();
        assert!(matches!(err, ClanError::Storage { .. }));
        assert!(!err.is_business());
    }

    #[test]
    fn group_error_displays_bare_message() {
        let err = ClanError::group("quota exhausted");
        assert_eq!(err.to_string(), "quota exhausted");
        let err = ClanError::GroupNotFound(GroupId(77));
        assert_eq!(err.to_string(), "group 77 is not registered");
    }

    #[test]
    fn all_traits_are_object_safe() {
        fn _store(_: &dyn ClanStore) {}
        fn _notifier(_: &dyn Notifier) {}
        fn _directory(_: &dyn Directory) {}
        fn _clock(_: &dyn GameClock) {}
    }
}
