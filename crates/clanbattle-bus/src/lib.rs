// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-group boss status channel.
//!
//! Every committed mutation publishes a fresh [`BossStatus`] snapshot for its
//! group. Listeners hold a [`StatusWatch`] and await
//! [`StatusWatch::next_update`]; all listeners waiting at the same time see
//! the same snapshot, and a new wait point exists as soon as a publish
//! returns. Dropping a watch has no effect on the battle state.

pub mod status;

use std::sync::Arc;

use clanbattle_core::GroupId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use tracing::trace;

pub use status::{BossStatus, Claimant, SlotStatus};

/// Registry of one `watch` channel per group.
#[derive(Default)]
pub struct StatusBus {
    channels: DashMap<GroupId, watch::Sender<Arc<BossStatus>>>,
}

impl StatusBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `status` for its group, stamping it with the next version.
    ///
    /// Returns the published snapshot.
    pub fn publish(&self, mut status: BossStatus) -> Arc<BossStatus> {
        let group_id = status.group_id;
        match self.channels.entry(group_id) {
            Entry::Occupied(entry) => {
                status.version = entry.get().borrow().version + 1;
                let status = Arc::new(status);
                entry.get().send_replace(Arc::clone(&status));
                trace!(%group_id, version = status.version, "status published");
                status
            }
            Entry::Vacant(entry) => {
                let status = Arc::new(status);
                entry.insert(watch::channel(Arc::clone(&status)).0);
                status
            }
        }
    }

    /// The last published snapshot of a group, if any.
    pub fn current(&self, group_id: GroupId) -> Option<Arc<BossStatus>> {
        self.channels.get(&group_id).map(|tx| Arc::clone(&tx.borrow()))
    }

    /// Watch a group, seeding its channel with `seed` when nothing has been
    /// published yet.
    pub fn watch(&self, group_id: GroupId, seed: impl FnOnce() -> BossStatus) -> StatusWatch {
        let tx = self
            .channels
            .entry(group_id)
            .or_insert_with(|| watch::channel(Arc::new(seed())).0);
        StatusWatch {
            rx: tx.subscribe(),
        }
    }

    /// Drop a group's channel. Its watches get `None` from
    /// [`StatusWatch::next_update`]; a later publish opens a new channel
    /// starting again at version 0.
    pub fn close(&self, group_id: GroupId) -> bool {
        let closed = self.channels.remove(&group_id).is_some();
        if closed {
            trace!(%group_id, "status channel closed");
        }
        closed
    }

    /// Number of listeners currently watching a group.
    pub fn listener_count(&self, group_id: GroupId) -> usize {
        self.channels
            .get(&group_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

/// A listener's handle on one group's status.
pub struct StatusWatch {
    rx: watch::Receiver<Arc<BossStatus>>,
}

impl StatusWatch {
    /// The snapshot this watch has seen most recently.
    pub fn current(&self) -> Arc<BossStatus> {
        Arc::clone(&self.rx.borrow())
    }

    /// Wait for the next publish after the last one this watch observed.
    ///
    /// Returns `None` once the group's channel is closed or the bus dropped.
    pub async fn next_update(&mut self) -> Option<Arc<BossStatus>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn status(group: u64) -> BossStatus {
        BossStatus {
            group_id: GroupId(group),
            version: 0,
            cycle: 1,
            slots: Vec::new(),
            message: None,
        }
    }

    #[test]
    fn versions_increase_per_group() {
        let bus = StatusBus::new();
        assert_eq!(bus.publish(status(1)).version, 0);
        assert_eq!(bus.publish(status(1)).version, 1);
        assert_eq!(bus.publish(status(2)).version, 0);
        assert_eq!(bus.current(GroupId(1)).unwrap().version, 1);
        assert!(bus.current(GroupId(3)).is_none());
    }

    #[tokio::test]
    async fn every_waiter_sees_the_same_update() {
        let bus = Arc::new(StatusBus::new());
        let mut a = bus.watch(GroupId(1), || status(1));
        let mut b = bus.watch(GroupId(1), || unreachable!("already seeded"));
        assert_eq!(bus.listener_count(GroupId(1)), 2);

        let wait_a = tokio::spawn(async move { a.next_update().await });
        let wait_b = tokio::spawn(async move { b.next_update().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut next = status(1);
        next.message = Some("boss 3 down".into());
        bus.publish(next);

        let seen_a = wait_a.await.unwrap().unwrap();
        let seen_b = wait_b.await.unwrap().unwrap();
        assert_eq!(seen_a.version, 1);
        assert_eq!(seen_a, seen_b);
        assert_eq!(seen_a.message.as_deref(), Some("boss 3 down"));
    }

    #[tokio::test]
    async fn fresh_wait_point_after_publish() {
        let bus = StatusBus::new();
        let mut w = bus.watch(GroupId(1), || status(1));
        bus.publish(status(1));
        assert_eq!(w.next_update().await.unwrap().version, 1);

        // Nothing new yet: the next wait must block until another publish.
        let pending =
            tokio::time::timeout(Duration::from_millis(20), w.next_update()).await;
        assert!(pending.is_err());

        bus.publish(status(1));
        assert_eq!(w.next_update().await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn dropped_watch_leaves_bus_intact() {
        let bus = StatusBus::new();
        let w = bus.watch(GroupId(1), || status(1));
        drop(w);
        assert_eq!(bus.listener_count(GroupId(1)), 0);
        assert_eq!(bus.publish(status(1)).version, 1);
    }

    #[tokio::test]
    async fn next_update_ends_when_bus_dropped() {
        let bus = StatusBus::new();
        let mut w = bus.watch(GroupId(1), || status(1));
        drop(bus);
        assert!(w.next_update().await.is_none());
    }

    #[tokio::test]
    async fn closing_a_group_ends_its_watches_only() {
        let bus = StatusBus::new();
        let mut closed = bus.watch(GroupId(1), || status(1));
        let mut other = bus.watch(GroupId(2), || status(2));

        assert!(bus.close(GroupId(1)));
        assert!(!bus.close(GroupId(1)));
        assert!(closed.next_update().await.is_none());
        assert!(bus.current(GroupId(1)).is_none());

        bus.publish(status(2));
        assert_eq!(other.next_update().await.unwrap().version, 1);
        assert_eq!(bus.publish(status(1)).version, 0);
    }
}
