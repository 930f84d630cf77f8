// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborators for running the service from a terminal.
//!
//! The operator CLI has no chat platform behind it: outbound messages go to
//! the log and members are shown by id.

use async_trait::async_trait;
use clanbattle_core::{ClanError, Directory, GroupId, MemberId, Notifier};
use tracing::info;

pub struct Console;

#[async_trait]
impl Notifier for Console {
    async fn notify_group(
        &self,
        group: GroupId,
        text: &str,
        mentions: &[MemberId],
    ) -> Result<(), ClanError> {
        info!(group_id = %group, mentions = mentions.len(), "{text}");
        Ok(())
    }

    async fn notify_member(&self, member: MemberId, text: &str) -> Result<(), ClanError> {
        info!(%member, "{text}");
        Ok(())
    }
}

#[async_trait]
impl Directory for Console {
    async fn display_name(&self, _member: MemberId) -> Result<Option<String>, ClanError> {
        Ok(None)
    }
}
