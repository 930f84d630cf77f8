// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Membership rows.

use chrono::NaiveDate;
use clanbattle_core::model::Membership;
use clanbattle_core::{ClanError, GroupId, MemberId, Role};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
struct MembershipRecord {
    group_id: u64,
    member: u64,
    role: String,
    last_save_slot: Option<String>,
}

impl MembershipRecord {
    fn from_membership(m: &Membership) -> Self {
        Self {
            group_id: m.group_id.0,
            member: m.member.0,
            role: m.role.to_string(),
            last_save_slot: m.last_save_slot.map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }

    fn into_membership(self) -> Result<Membership, ClanError> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|_| ClanError::storage(format!("unknown role `{}`", self.role)))?;
        let last_save_slot = self
            .last_save_slot
            .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT))
            .transpose()
            .map_err(ClanError::storage)?;
        Ok(Membership {
            group_id: GroupId(self.group_id),
            member: MemberId(self.member),
            role,
            last_save_slot,
        })
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            group_id: row.get(0)?,
            member: row.get(1)?,
            role: row.get(2)?,
            last_save_slot: row.get(3)?,
        })
    }
}

pub async fn get_membership(
    db: &Database,
    group_id: GroupId,
    member: MemberId,
) -> Result<Option<Membership>, ClanError> {
    let record = db
        .connection()
        .call(move |conn| -> Result<Option<MembershipRecord>, rusqlite::Error> {
            conn.query_row(
                "SELECT group_id, member, role, last_save_slot FROM memberships
                 WHERE group_id = ?1 AND member = ?2",
                params![group_id.0, member.0],
                MembershipRecord::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    record.map(MembershipRecord::into_membership).transpose()
}

pub async fn save_membership(db: &Database, membership: &Membership) -> Result<(), ClanError> {
    let record = MembershipRecord::from_membership(membership);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO memberships (group_id, member, role, last_save_slot)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (group_id, member) DO UPDATE SET
                    role = excluded.role,
                    last_save_slot = excluded.last_save_slot",
                params![record.group_id, record.member, record.role, record.last_save_slot],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_memberships(
    db: &Database,
    group_id: GroupId,
    members: &[MemberId],
) -> Result<usize, ClanError> {
    let members: Vec<u64> = members.iter().map(|m| m.0).collect();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            let mut deleted = 0;
            {
                let mut stmt =
                    tx.prepare("DELETE FROM memberships WHERE group_id = ?1 AND member = ?2")?;
                for member in &members {
                    deleted += stmt.execute(params![group_id.0, member])?;
                }
            }
            tx.commit()?;
            Ok(deleted)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_memberships(db: &Database, group_id: GroupId) -> Result<Vec<Membership>, ClanError> {
    let records = db
        .connection()
        .call(move |conn| -> Result<Vec<MembershipRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT group_id, member, role, last_save_slot FROM memberships
                 WHERE group_id = ?1 ORDER BY member",
            )?;
            let rows = stmt
                .query_map(params![group_id.0], MembershipRecord::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;
    records
        .into_iter()
        .map(MembershipRecord::into_membership)
        .collect()
}
