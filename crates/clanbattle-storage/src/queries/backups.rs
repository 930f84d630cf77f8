// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive backups: one serialized battle state per (group, archive).

use clanbattle_core::model::BattleState;
use clanbattle_core::{BattleId, ClanError, GroupId};
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub async fn load_backup(
    db: &Database,
    group_id: GroupId,
    battle_id: BattleId,
) -> Result<Option<BattleState>, ClanError> {
    let json = db
        .connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT state FROM group_backups WHERE group_id = ?1 AND battle_id = ?2",
                params![group_id.0, battle_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(json.map(|s| serde_json::from_str(&s)).transpose()?)
}

pub(crate) fn upsert_backup(
    conn: &Connection,
    group_id: u64,
    battle_id: BattleId,
    state: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO group_backups (group_id, battle_id, state) VALUES (?1, ?2, ?3)
         ON CONFLICT (group_id, battle_id) DO UPDATE SET state = excluded.state",
        params![group_id, battle_id, state],
    )?;
    Ok(())
}
