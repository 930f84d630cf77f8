// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription registry: per-slot waitlists of members who want to hear
//! when a boss becomes attackable again.

use clanbattle_core::model::Group;
use clanbattle_core::{BossSlot, ClanError, MemberId};

use crate::effects::Outbound;

pub fn subscribe(group: &mut Group, member: MemberId, slot: BossSlot) -> Result<(), ClanError> {
    let waitlist = group.subscriptions.entry(slot).or_default();
    if waitlist.contains(&member) {
        return Err(ClanError::group(format!(
            "already subscribed to boss {slot}"
        )));
    }
    waitlist.push(member);
    Ok(())
}

/// Remove `member` from the slot's waitlist, or clear the whole waitlist
/// when `member` is `None`.
pub fn unsubscribe(
    group: &mut Group,
    slot: BossSlot,
    member: Option<MemberId>,
) -> Result<(), ClanError> {
    let Some(waitlist) = group.subscriptions.get_mut(&slot) else {
        return Err(ClanError::group(format!("nobody is subscribed to boss {slot}")));
    };
    match member {
        None => {
            group.subscriptions.remove(&slot);
        }
        Some(member) => {
            let Some(pos) = waitlist.iter().position(|m| *m == member) else {
                return Err(ClanError::group(format!("not subscribed to boss {slot}")));
            };
            waitlist.remove(pos);
            if waitlist.is_empty() {
                group.subscriptions.remove(&slot);
            }
        }
    }
    Ok(())
}

/// Non-empty waitlists in slot order.
pub fn list_all(group: &Group) -> Vec<(BossSlot, Vec<MemberId>)> {
    group
        .subscriptions
        .iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(slot, members)| (*slot, members.clone()))
        .collect()
}

/// Take the slot's waitlist and turn it into one group notification.
pub fn drain(group: &mut Group, slot: BossSlot) -> Option<Outbound> {
    let members = group.subscriptions.remove(&slot)?;
    if members.is_empty() {
        return None;
    }
    Some(Outbound::Group {
        group_id: group.group_id,
        text: format!("Boss {slot} is up again"),
        mentions: members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::tests::{fresh_group, two_level_book};

    #[test]
    fn duplicate_subscription_is_rejected() {
        let mut g = fresh_group(&two_level_book(), 1);
        let slot = BossSlot::ALL[2];
        subscribe(&mut g, MemberId(1), slot).unwrap();
        let err = subscribe(&mut g, MemberId(1), slot).unwrap_err();
        assert!(matches!(err, ClanError::GroupError(_)));
        subscribe(&mut g, MemberId(2), slot).unwrap();
        assert_eq!(list_all(&g), vec![(slot, vec![MemberId(1), MemberId(2)])]);
    }

    #[test]
    fn unsubscribe_errors_and_cleanup() {
        let mut g = fresh_group(&two_level_book(), 1);
        let slot = BossSlot::ALL[0];
        assert!(unsubscribe(&mut g, slot, None).is_err());

        subscribe(&mut g, MemberId(1), slot).unwrap();
        assert!(unsubscribe(&mut g, slot, Some(MemberId(9))).is_err());
        unsubscribe(&mut g, slot, Some(MemberId(1))).unwrap();
        assert!(g.subscriptions.is_empty());

        subscribe(&mut g, MemberId(1), slot).unwrap();
        subscribe(&mut g, MemberId(2), slot).unwrap();
        unsubscribe(&mut g, slot, None).unwrap();
        assert!(list_all(&g).is_empty());
    }

    #[test]
    fn drain_mentions_everyone_once() {
        let mut g = fresh_group(&two_level_book(), 1);
        let slot = BossSlot::ALL[3];
        subscribe(&mut g, MemberId(5), slot).unwrap();
        subscribe(&mut g, MemberId(6), slot).unwrap();

        let Some(Outbound::Group { mentions, .. }) = drain(&mut g, slot) else {
            panic!("expected a group notification");
        };
        assert_eq!(mentions, vec![MemberId(5), MemberId(6)]);
        assert!(drain(&mut g, slot).is_none());
    }
}
