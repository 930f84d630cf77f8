// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the clan battle tracker.

use thiserror::Error;

use crate::types::{GroupId, MemberId};

/// The primary error type returned by every clan battle operation.
///
/// The first five variants are business outcomes the caller is expected to
/// surface to the user. The remaining variants are infrastructure failures.
#[derive(Debug, Error)]
pub enum ClanError {
    /// Malformed or out-of-range argument (negative damage, unknown region,
    /// missing boss slot).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The group has not been registered.
    #[error("group {0} is not registered")]
    GroupNotFound(GroupId),

    /// The member has no membership row in the group.
    #[error("member {0} has not joined the group")]
    UserNotInGroup(MemberId),

    /// A business rule was violated (quota exhausted, duplicate claim, no
    /// attackable boss, nothing to cancel, empty ledger).
    #[error("{0}")]
    GroupError(String),

    /// A member-scoped action was attempted without the right to do so.
    #[error("{0}")]
    UserError(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid stage table, missing server).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClanError {
    /// Shorthand for [`ClanError::InvalidInput`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Shorthand for [`ClanError::GroupError`].
    pub fn group(msg: impl Into<String>) -> Self {
        Self::GroupError(msg.into())
    }

    /// Shorthand for [`ClanError::UserError`].
    pub fn user(msg: impl Into<String>) -> Self {
        Self::UserError(msg.into())
    }

    /// Wrap any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// True for the rule-violation kinds a caller should show to the user
    /// rather than log as a fault.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::GroupNotFound(_)
                | Self::UserNotInGroup(_)
                | Self::GroupError(_)
                | Self::UserError(_)
        )
    }
}

impl From<serde_json::Error> for ClanError {
    fn from(e: serde_json::Error) -> Self {
        Self::storage(e)
    }
}
