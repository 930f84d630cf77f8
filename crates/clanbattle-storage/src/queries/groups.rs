// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group rows. Health maps, engagements and subscriptions are JSON columns.

use clanbattle_core::model::Group;
use clanbattle_core::{ClanError, GameServer, GroupId};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "group_id, name, server, battle_id, cycle, now_health, next_health,
                       engagements, subscriptions, deleted";

/// A group row as stored.
#[derive(Debug, Clone)]
pub(crate) struct GroupRecord {
    group_id: u64,
    name: Option<String>,
    server: String,
    battle_id: u32,
    cycle: u32,
    now_health: String,
    next_health: String,
    engagements: String,
    subscriptions: String,
    deleted: bool,
}

impl GroupRecord {
    pub(crate) fn from_group(group: &Group) -> Result<Self, ClanError> {
        Ok(Self {
            group_id: group.group_id.0,
            name: group.name.clone(),
            server: group.server.to_string(),
            battle_id: group.battle_id,
            cycle: group.cycle,
            now_health: serde_json::to_string(&group.now_health)?,
            next_health: serde_json::to_string(&group.next_health)?,
            engagements: serde_json::to_string(&group.engagements)?,
            subscriptions: serde_json::to_string(&group.subscriptions)?,
            deleted: group.deleted,
        })
    }

    pub(crate) fn into_group(self) -> Result<Group, ClanError> {
        Ok(Group {
            group_id: GroupId(self.group_id),
            name: self.name,
            server: GameServer::parse(&self.server)?,
            battle_id: self.battle_id,
            cycle: self.cycle,
            now_health: serde_json::from_str(&self.now_health)?,
            next_health: serde_json::from_str(&self.next_health)?,
            engagements: serde_json::from_str(&self.engagements)?,
            subscriptions: serde_json::from_str(&self.subscriptions)?,
            deleted: self.deleted,
        })
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            group_id: row.get(0)?,
            name: row.get(1)?,
            server: row.get(2)?,
            battle_id: row.get(3)?,
            cycle: row.get(4)?,
            now_health: row.get(5)?,
            next_health: row.get(6)?,
            engagements: row.get(7)?,
            subscriptions: row.get(8)?,
            deleted: row.get(9)?,
        })
    }

    /// Insert or replace this row. Usable inside a transaction.
    pub(crate) fn upsert(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO groups (group_id, name, server, battle_id, cycle, now_health,
                                 next_health, engagements, subscriptions, deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (group_id) DO UPDATE SET
                name = excluded.name,
                server = excluded.server,
                battle_id = excluded.battle_id,
                cycle = excluded.cycle,
                now_health = excluded.now_health,
                next_health = excluded.next_health,
                engagements = excluded.engagements,
                subscriptions = excluded.subscriptions,
                deleted = excluded.deleted",
            params![
                self.group_id,
                self.name,
                self.server,
                self.battle_id,
                self.cycle,
                self.now_health,
                self.next_health,
                self.engagements,
                self.subscriptions,
                self.deleted,
            ],
        )?;
        Ok(())
    }
}

pub async fn get_group(db: &Database, group_id: GroupId) -> Result<Option<Group>, ClanError> {
    let record = db
        .connection()
        .call(move |conn| -> Result<Option<GroupRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM groups WHERE group_id = ?1"),
                params![group_id.0],
                GroupRecord::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    record.map(GroupRecord::into_group).transpose()
}

pub async fn list_groups(db: &Database) -> Result<Vec<Group>, ClanError> {
    let records = db
        .connection()
        .call(|conn| -> Result<Vec<GroupRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM groups ORDER BY group_id"))?;
            let rows = stmt
                .query_map([], GroupRecord::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;
    records.into_iter().map(GroupRecord::into_group).collect()
}

pub async fn save_group(db: &Database, group: &Group) -> Result<(), ClanError> {
    let record = GroupRecord::from_group(group)?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> { record.upsert(conn) })
        .await
        .map_err(map_tr_err)
}
