// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Challenge ledger rows.

use chrono::NaiveDate;
use clanbattle_core::model::{Challenge, ChallengeQuery, NewChallenge};
use clanbattle_core::{BattleId, BossSlot, ClanError, GroupId, MemberId};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

const DATE_FORMAT: &str = "%Y-%m-%d";

const COLUMNS: &str = "id, group_id, battle_id, member, date, seconds, cycle, slot,
                       health_remain, damage, compensation, behalf, message";

#[derive(Debug, Clone)]
pub(crate) struct ChallengeRecord {
    id: i64,
    group_id: u64,
    battle_id: u32,
    member: u64,
    date: String,
    seconds: u32,
    cycle: u32,
    slot: u8,
    health_remain: u64,
    damage: u64,
    compensation: bool,
    behalf: Option<u64>,
    message: Option<String>,
}

impl ChallengeRecord {
    pub(crate) fn from_new(c: &NewChallenge) -> Self {
        Self {
            id: 0,
            group_id: c.group_id.0,
            battle_id: c.battle_id,
            member: c.member.0,
            date: c.date.format(DATE_FORMAT).to_string(),
            seconds: c.seconds,
            cycle: c.cycle,
            slot: c.slot.number(),
            health_remain: c.health_remain,
            damage: c.damage,
            compensation: c.compensation,
            behalf: c.behalf.map(|m| m.0),
            message: c.message.clone(),
        }
    }

    fn into_challenge(self) -> Result<Challenge, ClanError> {
        Ok(Challenge {
            id: self.id,
            group_id: GroupId(self.group_id),
            battle_id: self.battle_id,
            member: MemberId(self.member),
            date: NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(ClanError::storage)?,
            seconds: self.seconds,
            cycle: self.cycle,
            slot: BossSlot::new(self.slot)?,
            health_remain: self.health_remain,
            damage: self.damage,
            compensation: self.compensation,
            behalf: self.behalf.map(MemberId),
            message: self.message,
        })
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            group_id: row.get(1)?,
            battle_id: row.get(2)?,
            member: row.get(3)?,
            date: row.get(4)?,
            seconds: row.get(5)?,
            cycle: row.get(6)?,
            slot: row.get(7)?,
            health_remain: row.get(8)?,
            damage: row.get(9)?,
            compensation: row.get(10)?,
            behalf: row.get(11)?,
            message: row.get(12)?,
        })
    }

    /// Append this entry, returning its new id. Usable inside a transaction.
    pub(crate) fn insert(&self, conn: &Connection) -> rusqlite::Result<i64> {
        conn.execute(
            "INSERT INTO challenges (group_id, battle_id, member, date, seconds, cycle, slot,
                                     health_remain, damage, compensation, behalf, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                self.group_id,
                self.battle_id,
                self.member,
                self.date,
                self.seconds,
                self.cycle,
                self.slot,
                self.health_remain,
                self.damage,
                self.compensation,
                self.behalf,
                self.message,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

/// Entries matching `query`, oldest first.
pub async fn query_challenges(
    db: &Database,
    query: &ChallengeQuery,
) -> Result<Vec<Challenge>, ClanError> {
    let group_id = query.group_id.0;
    let battle_id = query.battle_id;
    let member = query.member.map(|m| m.0);
    let date = query.date.map(|d| d.format(DATE_FORMAT).to_string());
    let records = db
        .connection()
        .call(move |conn| -> Result<Vec<ChallengeRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM challenges
                 WHERE group_id = ?1
                   AND (?2 IS NULL OR battle_id = ?2)
                   AND (?3 IS NULL OR member = ?3)
                   AND (?4 IS NULL OR date = ?4)
                 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map(params![group_id, battle_id, member, date], ChallengeRecord::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;
    records
        .into_iter()
        .map(ChallengeRecord::into_challenge)
        .collect()
}

pub async fn last_challenge(
    db: &Database,
    group_id: GroupId,
    battle_id: BattleId,
) -> Result<Option<Challenge>, ClanError> {
    let record = db
        .connection()
        .call(move |conn| -> Result<Option<ChallengeRecord>, rusqlite::Error> {
            conn.query_row(
                &format!(
                    "SELECT {COLUMNS} FROM challenges
                     WHERE group_id = ?1 AND battle_id = ?2
                     ORDER BY id DESC LIMIT 1"
                ),
                params![group_id.0, battle_id],
                ChallengeRecord::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    record.map(ChallengeRecord::into_challenge).transpose()
}

/// Entry count per archive, ordered by archive id.
pub async fn record_counts(
    db: &Database,
    group_id: GroupId,
) -> Result<Vec<(BattleId, u64)>, ClanError> {
    db.connection()
        .call(move |conn| -> Result<Vec<(BattleId, u64)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT battle_id, COUNT(*) FROM challenges
                 WHERE group_id = ?1 GROUP BY battle_id ORDER BY battle_id",
            )?;
            let rows = stmt
                .query_map(params![group_id.0], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

pub(crate) fn delete_one(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM challenges WHERE id = ?1", params![id])
}

pub(crate) fn delete_archive(
    conn: &Connection,
    group_id: u64,
    battle_id: BattleId,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM challenges WHERE group_id = ?1 AND battle_id = ?2",
        params![group_id, battle_id],
    )
}
