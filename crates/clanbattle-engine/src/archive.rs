// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive slots: resetting a battle and swapping the live state between
//! saved archives.

use clanbattle_core::model::{BattleState, EngagementMap, Group, SubscriptionMap};
use clanbattle_core::{BattleId, ClanError};

use crate::stage::StageBook;

/// Put the group back at cycle 1 with nobody fighting or waiting.
pub fn reset_battle(group: &mut Group, stages: &StageBook) {
    stages.initialize(group, 1);
    group.engagements = EngagementMap::new();
    group.subscriptions = SubscriptionMap::new();
}

/// Move `group` to archive `target`.
///
/// Returns the backup of the state being left, to be stored under the old
/// archive id. The target's own backup is restored when there is one,
/// otherwise the battle starts fresh.
pub fn switch_to(
    group: &mut Group,
    stages: &StageBook,
    target: BattleId,
    target_backup: Option<BattleState>,
) -> Result<BattleState, ClanError> {
    if target == group.battle_id {
        return Err(ClanError::invalid(format!("archive {target} is already active")));
    }
    let leaving = group.battle_state();
    match target_backup {
        Some(state) => group.restore(state),
        None => reset_battle(group, stages),
    }
    group.battle_id = target;
    Ok(leaving)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::tests::{fresh_group, two_level_book};
    use clanbattle_core::model::Engagement;
    use clanbattle_core::{BossHealth, BossSlot, MemberId};

    #[test]
    fn reset_clears_engagements_and_waitlists() {
        let book = two_level_book();
        let mut g = fresh_group(&book, 5);
        g.engagements
            .entry(BossSlot::ALL[0])
            .or_default()
            .insert(MemberId(1), Engagement::default());
        g.subscriptions.insert(BossSlot::ALL[1], vec![MemberId(2)]);

        reset_battle(&mut g, &book);
        assert_eq!(g.cycle, 1);
        assert_eq!(g.now_health, BossHealth::new([100; 5]));
        assert!(g.engagements.is_empty());
        assert!(g.subscriptions.is_empty());
    }

    #[test]
    fn switching_back_and_forth_restores_state() {
        let book = two_level_book();
        let mut g = fresh_group(&book, 2);
        g.now_health[BossSlot::ALL[3]] = 17;

        let saved = switch_to(&mut g, &book, 1, None).unwrap();
        assert_eq!(g.battle_id, 1);
        assert_eq!(g.cycle, 1);
        assert_eq!(saved.cycle, 2);

        let fresh = switch_to(&mut g, &book, 0, Some(saved)).unwrap();
        assert_eq!(fresh.cycle, 1);
        assert_eq!(g.battle_id, 0);
        assert_eq!(g.cycle, 2);
        assert_eq!(g.now_health[BossSlot::ALL[3]], 17);
    }

    #[test]
    fn switching_to_active_archive_is_rejected() {
        let book = two_level_book();
        let mut g = fresh_group(&book, 1);
        assert!(matches!(
            switch_to(&mut g, &book, 0, None),
            Err(ClanError::InvalidInput(_))
        ));
    }
}
