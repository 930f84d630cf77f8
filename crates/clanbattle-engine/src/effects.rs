// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notifications produced by a mutation.
//!
//! Operations collect [`Outbound`] values while working on the group and the
//! service hands them to [`dispatch`] once the group lock is released.

use std::sync::Arc;

use clanbattle_core::{GroupId, MemberId, Notifier};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A message to the whole group, mentioning `mentions`.
    Group {
        group_id: GroupId,
        text: String,
        mentions: Vec<MemberId>,
    },
    /// A private message to one member.
    Member { member: MemberId, text: String },
}

/// Send every message on its own task. Failures are logged and dropped.
pub fn dispatch(notifier: &Arc<dyn Notifier>, outbound: Vec<Outbound>) {
    for message in outbound {
        let notifier = Arc::clone(notifier);
        tokio::spawn(async move {
            let result = match &message {
                Outbound::Group {
                    group_id,
                    text,
                    mentions,
                } => notifier.notify_group(*group_id, text, mentions).await,
                Outbound::Member { member, text } => notifier.notify_member(*member, text).await,
            };
            match result {
                Ok(()) => debug!(?message, "notification delivered"),
                Err(e) => warn!(error = %e, ?message, "notification failed"),
            }
        });
    }
}
