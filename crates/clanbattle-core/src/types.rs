// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier and enum types shared across the workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ClanError;

/// Chat group (guild) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Member (chat user) identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Archive slot ("battle id") partitioning one competitive period's records.
pub type BattleId = u32;

/// Number of boss slots fought in sequence each cycle.
pub const SLOT_COUNT: usize = 5;

/// One of the five ordered boss positions, always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BossSlot(u8);

impl BossSlot {
    /// All five slots in fight order.
    pub const ALL: [BossSlot; SLOT_COUNT] = [
        BossSlot(1),
        BossSlot(2),
        BossSlot(3),
        BossSlot(4),
        BossSlot(5),
    ];

    /// Build a slot from its 1-based number.
    pub fn new(number: u8) -> Result<Self, ClanError> {
        if (1..=SLOT_COUNT as u8).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ClanError::invalid(format!(
                "boss slot must be between 1 and {SLOT_COUNT}, got {number}"
            )))
        }
    }

    /// The 1-based slot number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// The 0-based array index.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for BossSlot {
    type Error = ClanError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BossSlot> for u8 {
    fn from(slot: BossSlot) -> Self {
        slot.0
    }
}

impl FromStr for BossSlot {
    type Err = ClanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| ClanError::invalid(format!("`{s}` is not a boss slot number")))?;
        Self::new(n)
    }
}

impl fmt::Display for BossSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game-server region. Determines the stage table and the daily reset time zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameServer {
    Jp,
    Tw,
    Cn,
    Kr,
}

impl GameServer {
    /// Every supported region.
    pub const ALL: [GameServer; 4] = [GameServer::Jp, GameServer::Tw, GameServer::Cn, GameServer::Kr];

    /// Offset of the region's local time from UTC, in hours.
    pub fn utc_offset_hours(self) -> i32 {
        match self {
            GameServer::Jp | GameServer::Kr => 9,
            GameServer::Tw | GameServer::Cn => 8,
        }
    }

    /// Parse a region name, mapping failures to [`ClanError::InvalidInput`].
    pub fn parse(name: &str) -> Result<Self, ClanError> {
        Self::from_str(name.trim())
            .map_err(|_| ClanError::invalid(format!("game server `{name}` does not exist")))
    }
}

/// Role of a member inside a group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Group owner or administrator; may undo other members' records.
    Admin,
    /// Regular member.
    #[default]
    Member,
}

impl Role {
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_slot_rejects_out_of_range() {
        assert!(BossSlot::new(0).is_err());
        assert!(BossSlot::new(6).is_err());
        assert_eq!(BossSlot::new(3).unwrap().index(), 2);
    }

    #[test]
    fn boss_slot_parses_and_serializes_as_number() {
        let slot: BossSlot = " 4 ".parse().unwrap();
        assert_eq!(slot.number(), 4);
        assert_eq!(serde_json::to_string(&slot).unwrap(), "4");
        let back: BossSlot = serde_json::from_str("2").unwrap();
        assert_eq!(back, BossSlot::ALL[1]);
        assert!(serde_json::from_str::<BossSlot>("9").is_err());
    }

    #[test]
    fn game_server_parse_and_display() {
        assert_eq!(GameServer::parse("cn").unwrap(), GameServer::Cn);
        assert_eq!(GameServer::Jp.to_string(), "jp");
        let err = GameServer::parse("us").unwrap_err();
        assert!(matches!(err, ClanError::InvalidInput(_)));
    }

    #[test]
    fn only_admin_is_privileged() {
        assert!(Role::Admin.is_privileged());
        assert!(!Role::Member.is_privileged());
        assert_eq!(Role::default(), Role::Member);
    }
}
