// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cycle engine.

use clanbattle_core::model::Group;
use clanbattle_core::{BossSlot, ClanError};
use tracing::info;

use crate::effects::Outbound;
use crate::stage::{MAX_CYCLE, StageBook};
use crate::subscription;

/// Move the group into its next cycle.
///
/// `next` becomes `now`; every slot carried in already at zero has its
/// waitlist drained before `next` is reseeded from the level of the new
/// `cycle + 1`. Returns the drain notifications. A group at
/// [`MAX_CYCLE`] is left untouched and a `GroupError` is returned.
pub fn advance_cycle(group: &mut Group, stages: &StageBook) -> Result<Vec<Outbound>, ClanError> {
    let cycle = match group.cycle.checked_add(1) {
        Some(cycle) if cycle <= MAX_CYCLE => cycle,
        _ => {
            return Err(ClanError::group(format!(
                "cycle {} is the last cycle that can be tracked",
                group.cycle
            )));
        }
    };
    group.cycle = cycle;
    group.now_health = group.next_health;

    let empty: Vec<BossSlot> = BossSlot::ALL
        .into_iter()
        .filter(|slot| group.now_health[*slot] == 0)
        .collect();
    let drained = empty
        .into_iter()
        .filter_map(|slot| subscription::drain(group, slot))
        .collect();

    group.next_health = stages.full_health(group.server, group.cycle + 1);
    info!(group_id = %group.group_id, cycle = group.cycle, "cycle advanced");
    Ok(drained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::tests::{fresh_group, two_level_book};
    use crate::subscription::subscribe;
    use clanbattle_core::{BossHealth, MemberId};
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn next_moves_into_now_and_reseeds() {
        let book = two_level_book();
        let mut g = fresh_group(&book, 2);
        g.now_health = BossHealth::ZERO;
        g.next_health = BossHealth::new([100, 40, 100, 100, 100]);

        let drained = advance_cycle(&mut g, &book).unwrap();
        assert!(drained.is_empty());
        assert_eq!(g.cycle, 3);
        assert_eq!(g.now_health, BossHealth::new([100, 40, 100, 100, 100]));
        assert_eq!(g.next_health, BossHealth::new([200; 5]));
        assert!(logs_contain("cycle advanced"));
    }

    #[test]
    fn zero_carry_in_drains_that_slot_only() {
        let book = two_level_book();
        let mut g = fresh_group(&book, 1);
        let third = BossSlot::ALL[2];
        g.now_health = BossHealth::ZERO;
        g.next_health = BossHealth::new([100, 100, 0, 100, 100]);
        subscribe(&mut g, MemberId(3), third).unwrap();
        subscribe(&mut g, MemberId(4), BossSlot::ALL[0]).unwrap();

        let drained = advance_cycle(&mut g, &book).unwrap();
        assert_eq!(drained.len(), 1);
        assert!(!g.subscriptions.contains_key(&third));
        assert!(g.subscriptions.contains_key(&BossSlot::ALL[0]));
    }

    #[test]
    fn last_cycle_does_not_advance() {
        let book = two_level_book();
        let mut g = fresh_group(&book, MAX_CYCLE);
        g.now_health = BossHealth::ZERO;
        let before = g.clone();

        let err = advance_cycle(&mut g, &book).unwrap_err();
        assert!(matches!(err, ClanError::GroupError(_)));
        assert_eq!(g, before);

        let mut g = fresh_group(&book, MAX_CYCLE - 1);
        advance_cycle(&mut g, &book).unwrap();
        assert_eq!(g.cycle, MAX_CYCLE);
    }
}
