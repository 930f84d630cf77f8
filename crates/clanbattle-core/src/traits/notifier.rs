// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound human notifications.

use async_trait::async_trait;

use crate::error::ClanError;
use crate::types::{GroupId, MemberId};

/// Best-effort delivery of chat messages.
///
/// Failures are logged by the engine and never fail the operation that
/// triggered the message.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text` to the group, mentioning `mentions`.
    async fn notify_group(
        &self,
        group: GroupId,
        text: &str,
        mentions: &[MemberId],
    ) -> Result<(), ClanError>;

    /// Send `text` privately to one member.
    async fn notify_member(&self, member: MemberId, text: &str) -> Result<(), ClanError>;
}
