// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `clanbattle status` and `clanbattle archives` command implementations.

use clanbattle_core::{BattleId, ClanError, GroupId};
use clanbattle_engine::BattleService;

/// Run the `clanbattle status` command.
///
/// Prints the boss board, or the raw snapshot with `--json`.
pub async fn run_status(
    service: &BattleService,
    group: GroupId,
    json: bool,
) -> Result<(), ClanError> {
    if json {
        let status = service.current_state(group).await?;
        println!(
            "{}",
            serde_json::to_string_pretty(status.as_ref())
                .map_err(|e| ClanError::Internal(format!("failed to encode status: {e}")))?
        );
    } else {
        println!("{}", service.status_summary(group).await?);
    }
    Ok(())
}

/// Run the `clanbattle archives` command.
pub async fn run_archives(service: &BattleService, group: GroupId) -> Result<(), ClanError> {
    let active = service.group(group).await?.battle_id;
    let counts = service.record_counts(group).await?;
    for line in archive_lines(active, &counts) {
        println!("{line}");
    }
    Ok(())
}

fn archive_lines(active: BattleId, counts: &[(BattleId, u64)]) -> Vec<String> {
    let mut lines: Vec<String> = counts
        .iter()
        .map(|(id, n)| {
            let marker = if *id == active { " (active)" } else { "" };
            format!("archive {id}: {n} records{marker}")
        })
        .collect();
    if !counts.iter().any(|(id, _)| *id == active) {
        lines.push(format!("archive {active}: 0 records (active)"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use clanbattle_core::{BossSlot, MemberId};
    use clanbattle_engine::RecordRequest;
    use clanbattle_test_utils::TestHarness;

    #[test]
    fn active_archive_is_marked() {
        let lines = archive_lines(1, &[(0, 12), (1, 3)]);
        assert_eq!(lines, vec!["archive 0: 12 records", "archive 1: 3 records (active)"]);
    }

    #[test]
    fn empty_active_archive_is_still_listed() {
        let lines = archive_lines(2, &[(0, 4)]);
        assert_eq!(lines, vec!["archive 0: 4 records", "archive 2: 0 records (active)"]);
    }

    #[tokio::test]
    async fn status_and_archives_run_against_a_group() {
        let h = TestHarness::builder().build().await.unwrap();
        h.group_with_members(GroupId(1), &[MemberId(1)]).await.unwrap();
        h.service
            .record(
                GroupId(1),
                RecordRequest::hit(MemberId(1), BossSlot::new(1).unwrap(), 10),
            )
            .await
            .unwrap();

        run_status(&h.service, GroupId(1), false).await.unwrap();
        run_status(&h.service, GroupId(1), true).await.unwrap();
        run_archives(&h.service, GroupId(1)).await.unwrap();
        assert!(matches!(
            run_status(&h.service, GroupId(9), false).await,
            Err(ClanError::GroupNotFound(_))
        ));
    }
}
