// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notifier for deterministic testing.
//!
//! `MockNotifier` implements `Notifier` by capturing every message for
//! assertion in tests. Notifications are sent from spawned tasks, so tests
//! wait for them with [`MockNotifier::wait_for`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use clanbattle_core::{ClanError, GroupId, MemberId, Notifier};

/// A captured outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Group {
        group_id: GroupId,
        text: String,
        mentions: Vec<MemberId>,
    },
    Member {
        member: MemberId,
        text: String,
    },
}

impl Notification {
    pub fn text(&self) -> &str {
        match self {
            Notification::Group { text, .. } | Notification::Member { text, .. } => text,
        }
    }
}

pub struct MockNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    notify: Arc<Notify>,
    failing: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every later delivery fail. Failed messages are still captured.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Wait until at least `count` messages were captured or `timeout`
    /// elapsed, returning what was captured.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            {
                let sent = self.sent.lock().await;
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.sent().await;
            }
        }
    }

    async fn capture(&self, notification: Notification) -> Result<(), ClanError> {
        self.sent.lock().await.push(notification);
        self.notify.notify_waiters();
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClanError::Internal("mock notifier failure".to_string()));
        }
        Ok(())
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify_group(
        &self,
        group: GroupId,
        text: &str,
        mentions: &[MemberId],
    ) -> Result<(), ClanError> {
        self.capture(Notification::Group {
            group_id: group,
            text: text.to_string(),
            mentions: mentions.to_vec(),
        })
        .await
    }

    async fn notify_member(&self, member: MemberId, text: &str) -> Result<(), ClanError> {
        self.capture(Notification::Member {
            member,
            text: text.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_group_and_member_messages() {
        let notifier = MockNotifier::new();
        notifier
            .notify_group(GroupId(1), "hello", &[MemberId(2)])
            .await
            .unwrap();
        notifier.notify_member(MemberId(3), "psst").await.unwrap();

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text(), "hello");
        assert_eq!(
            sent[1],
            Notification::Member {
                member: MemberId(3),
                text: "psst".to_string()
            }
        );
    }

    #[tokio::test]
    async fn failing_notifier_still_captures() {
        let notifier = MockNotifier::new();
        notifier.set_failing(true);
        assert!(notifier.notify_member(MemberId(1), "x").await.is_err());
        assert_eq!(notifier.sent_count().await, 1);
    }

    #[tokio::test]
    async fn wait_for_sees_messages_from_other_tasks() {
        let notifier = Arc::new(MockNotifier::new());
        let sender = Arc::clone(&notifier);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sender.notify_member(MemberId(1), "late").await.unwrap();
        });
        let sent = notifier.wait_for(1, Duration::from_secs(5)).await;
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn wait_for_times_out_with_what_it_has() {
        let notifier = MockNotifier::new();
        let sent = notifier.wait_for(1, Duration::from_millis(20)).await;
        assert!(sent.is_empty());
    }
}
