// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boss status snapshots and their plain-text rendering.

use std::collections::HashMap;
use std::fmt::Write;

use clanbattle_bus::{BossStatus, Claimant, SlotStatus};
use clanbattle_core::model::Group;
use clanbattle_core::{BossSlot, MemberId};
use clanbattle_ledger::DailyOverview;

use crate::stage::StageBook;

/// Snapshot of every slot as players see it. The bus stamps the version.
pub fn build_status(group: &Group, stages: &StageBook, message: Option<String>) -> BossStatus {
    let slots = BossSlot::ALL
        .into_iter()
        .map(|slot| slot_status(group, stages, slot))
        .collect();
    BossStatus {
        group_id: group.group_id,
        version: 0,
        cycle: group.cycle,
        slots,
        message,
    }
}

fn slot_status(group: &Group, stages: &StageBook, slot: BossSlot) -> SlotStatus {
    let is_next = group.now_health[slot] == 0;
    let cycle = if is_next { group.cycle.saturating_add(1) } else { group.cycle };
    let health = if !is_next {
        group.now_health[slot]
    } else if stages.can_continue(group, slot) {
        group.next_health[slot]
    } else {
        0
    };

    let claimants = group
        .engagements
        .get(&slot)
        .map(|members| {
            members
                .iter()
                .map(|(member, e)| Claimant {
                    member: *member,
                    compensation: e.compensation,
                    behalf: e.behalf,
                    seconds: e.seconds,
                    damage: e.damage,
                    tree: e.tree,
                    note: e.note.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    SlotStatus {
        slot,
        health,
        full_health: stages.full_health(group.server, cycle)[slot],
        cycle,
        is_next,
        claimants,
        subscribers: group.subscriptions.get(&slot).cloned().unwrap_or_default(),
    }
}

/// `1234567` as `1,234,567`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Multi-line status board. Members missing from `names` show as their id.
pub fn render_status(
    status: &BossStatus,
    overview: &DailyOverview,
    names: &HashMap<MemberId, String>,
) -> String {
    let name = |member: &MemberId| {
        names
            .get(member)
            .cloned()
            .unwrap_or_else(|| member.to_string())
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cycle {} | {} full attempts today, {} members holding leftovers",
        status.cycle,
        overview.full_attempts,
        overview.leftover_holders.len()
    );

    for slot in &status.slots {
        if slot.health == 0 {
            let _ = writeln!(out, "Boss {}: cannot be challenged", slot.slot);
            continue;
        }
        let _ = writeln!(
            out,
            "Boss {} (cycle {}): {} / {}",
            slot.slot,
            slot.cycle,
            thousands(slot.health),
            thousands(slot.full_health)
        );
        if slot.claimants.is_empty() {
            let _ = writeln!(out, "  nobody fighting");
            continue;
        }
        let _ = writeln!(out, "  {} fighting", slot.claimants.len());
        for c in &slot.claimants {
            let mut line = format!("  - {}", name(&c.member));
            if c.compensation {
                line.push_str(" (leftover)");
            }
            if let Some(behalf) = &c.behalf {
                let _ = write!(line, " [by {}]", name(behalf));
            }
            if c.seconds > 0 || c.damage > 0 {
                let _ = write!(line, " {}s {}", c.seconds, thousands(c.damage));
            }
            if c.tree {
                line.push_str(" [tree");
                if let Some(note) = &c.note {
                    let _ = write!(line, ": {note}");
                }
                line.push(']');
            }
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::tests::{fresh_group, two_level_book};
    use clanbattle_core::model::Engagement;

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn dead_slot_shows_next_cycle_or_nothing() {
        let book = two_level_book();
        let mut g = fresh_group(&book, 2);
        g.now_health[BossSlot::ALL[0]] = 0;
        let status = build_status(&g, &book, None);
        let first = &status.slots[0];
        assert!(first.is_next);
        assert_eq!((first.cycle, first.health, first.full_health), (3, 100, 100));

        let mut g = fresh_group(&book, 3);
        g.now_health[BossSlot::ALL[0]] = 0;
        let status = build_status(&g, &book, None);
        let first = &status.slots[0];
        assert_eq!((first.cycle, first.health, first.full_health), (4, 0, 200));
    }

    #[test]
    fn render_lists_claimants_with_flags() {
        let book = two_level_book();
        let mut g = fresh_group(&book, 3);
        g.now_health[BossSlot::ALL[4]] = 0;
        g.engagements.entry(BossSlot::ALL[1]).or_default().insert(
            MemberId(7),
            Engagement {
                compensation: true,
                behalf: Some(MemberId(8)),
                seconds: 40,
                damage: 1_500,
                tree: true,
                note: Some("wait".into()),
            },
        );
        let names = HashMap::from([(MemberId(7), "Aoi".to_string())]);
        let text = render_status(
            &build_status(&g, &book, None),
            &DailyOverview::default(),
            &names,
        );

        assert!(text.starts_with("Cycle 3 | 0 full attempts today"));
        assert!(text.contains("Boss 1 (cycle 3): 100 / 100\n  nobody fighting"));
        assert!(text.contains("  - Aoi (leftover) [by 8] 40s 1,500 [tree: wait]"));
        assert!(text.contains("Boss 5: cannot be challenged"));
    }
}
