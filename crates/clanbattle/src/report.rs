// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `clanbattle report` command implementation.

use chrono::NaiveDate;
use clanbattle_core::model::ArchiveSelector;
use clanbattle_core::{BattleId, ClanError, GroupId, MemberId};
use clanbattle_engine::BattleService;
use clanbattle_ledger::ReportRow;

/// Filters accepted by `clanbattle report`.
#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    pub member: Option<MemberId>,
    pub date: Option<NaiveDate>,
    pub archive: Option<BattleId>,
    pub all: bool,
    pub json: bool,
}

impl ReportArgs {
    fn selector(&self) -> ArchiveSelector {
        match (self.all, self.archive) {
            (true, _) => ArchiveSelector::All,
            (false, Some(id)) => ArchiveSelector::Id(id),
            (false, None) => ArchiveSelector::Current,
        }
    }
}

/// Run the `clanbattle report` command.
///
/// Prints one line per ledger entry, or a JSON array with `--json`.
pub async fn run_report(
    service: &BattleService,
    group: GroupId,
    args: &ReportArgs,
) -> Result<(), ClanError> {
    let rows = service
        .report(group, args.selector(), args.member, args.date)
        .await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows)
                .map_err(|e| ClanError::Internal(format!("failed to encode report: {e}")))?
        );
        return Ok(());
    }

    if rows.is_empty() {
        println!("no records");
    }
    for row in &rows {
        println!("{}", format_row(row));
    }
    Ok(())
}

fn format_row(row: &ReportRow) -> String {
    let mut line = format!(
        "#{} {} {} cycle {} boss {} member {} damage {} remaining {}",
        row.id,
        row.date,
        row.timestamp.format("%H:%M:%S"),
        row.cycle,
        row.slot,
        row.member,
        row.damage,
        row.health_remain,
    );
    if row.compensation {
        line.push_str(" leftover");
    }
    if let Some(by) = row.behalf {
        line.push_str(&format!(" by {by}"));
    }
    if let Some(message) = &row.message {
        line.push_str(&format!(" \"{message}\""));
    }
    line
}
