// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The battle service: the public entry point for every group operation.
//!
//! Each mutating call takes the group's lock, loads the group, applies the
//! rules to a working copy, commits through the store in one step and
//! publishes a fresh snapshot. Notifications go out after the lock is
//! released and never affect the result.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use clanbattle_bus::{BossStatus, StatusBus, StatusWatch};
use clanbattle_config::model::{BattleConfig, ClanBattleConfig};
use clanbattle_core::calendar::{GameDateTime, pcr_datetime};
use clanbattle_core::model::{
    ArchiveSelector, Challenge, ChallengeQuery, EngagementMap, Group, Membership, SubscriptionMap,
};
use clanbattle_core::{
    BattleId, BossHealth, BossSlot, ClanError, ClanStore, Directory, GameClock, GameServer,
    GroupId, MemberId, Notifier, Role,
};
use clanbattle_ledger::{DailyOverview, DailyTally, ReportRow};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::archive;
use crate::challenge::{self, LedgerView, RecordRequest};
use crate::effects::{self, Outbound};
use crate::engagement::{self, ClaimRequest, ReleaseScope};
use crate::stage::{MAX_CYCLE, StageBook};
use crate::subscription;
use crate::summary;

/// Admin override for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOverride {
    pub slot: BossSlot,
    /// The slot's current-cycle boss is dead and `health` belongs to the
    /// next cycle.
    pub is_next: bool,
    pub health: u64,
}

/// Save-slot (SL) actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveSlotAction {
    Use,
    Check,
    Cancel,
}

/// Result of a recorded attempt.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub challenge: Challenge,
    pub message: String,
    pub status: Arc<BossStatus>,
}

pub struct BattleService {
    store: Arc<dyn ClanStore>,
    bus: Arc<StatusBus>,
    notifier: Arc<dyn Notifier>,
    directory: Arc<dyn Directory>,
    clock: Arc<dyn GameClock>,
    stages: StageBook,
    battle: BattleConfig,
    locks: DashMap<GroupId, Arc<Mutex<()>>>,
}

impl BattleService {
    pub fn new(
        store: Arc<dyn ClanStore>,
        notifier: Arc<dyn Notifier>,
        directory: Arc<dyn Directory>,
        clock: Arc<dyn GameClock>,
        config: &ClanBattleConfig,
    ) -> Result<Self, ClanError> {
        let stages = StageBook::new(&config.stages)?;
        info!(
            daily_attempts = config.battle.daily_attempts,
            reset_hour = config.battle.reset_hour,
            "battle service initialized"
        );
        Ok(Self {
            store,
            bus: Arc::new(StatusBus::new()),
            notifier,
            directory,
            clock,
            stages,
            battle: config.battle.clone(),
            locks: DashMap::new(),
        })
    }

    pub fn bus(&self) -> &Arc<StatusBus> {
        &self.bus
    }

    pub fn stages(&self) -> &StageBook {
        &self.stages
    }

    async fn lock(&self, group_id: GroupId) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(group_id).or_default().value().clone();
        lock.lock_owned().await
    }

    async fn load_group(&self, group_id: GroupId) -> Result<Group, ClanError> {
        match self.store.get_group(group_id).await? {
            Some(group) if !group.deleted => Ok(group),
            _ => Err(ClanError::GroupNotFound(group_id)),
        }
    }

    async fn membership(
        &self,
        group_id: GroupId,
        member: MemberId,
    ) -> Result<Membership, ClanError> {
        self.store
            .get_membership(group_id, member)
            .await?
            .ok_or(ClanError::UserNotInGroup(member))
    }

    fn game_now(&self, server: GameServer) -> GameDateTime {
        pcr_datetime(server, self.battle.reset_hour, self.clock.now())
    }

    async fn tally(
        &self,
        group: &Group,
        member: MemberId,
        date: NaiveDate,
    ) -> Result<DailyTally, ClanError> {
        let query = ChallengeQuery::day(group.group_id, group.battle_id, date).member(member);
        let entries = self.store.query_challenges(&query).await?;
        Ok(DailyTally::from_challenges(&entries))
    }

    fn publish(&self, group: &Group, message: Option<String>) -> Arc<BossStatus> {
        self.bus
            .publish(summary::build_status(group, &self.stages, message))
    }

    /// Display name of a member, falling back to the numeric id.
    pub async fn display_name(&self, member: MemberId) -> String {
        match self.directory.display_name(member).await {
            Ok(Some(name)) => name,
            Ok(None) => member.to_string(),
            Err(e) => {
                warn!(error = %e, %member, "name lookup failed");
                member.to_string()
            }
        }
    }

    /// Lock, load, apply, save, publish.
    async fn update_group<T>(
        &self,
        group_id: GroupId,
        apply: impl FnOnce(&mut Group) -> Result<T, ClanError>,
    ) -> Result<T, ClanError> {
        let _guard = self.lock(group_id).await;
        let mut work = self.load_group(group_id).await?;
        let out = apply(&mut work)?;
        self.store.save_group(&work).await?;
        self.publish(&work, None);
        Ok(out)
    }

    // --- group lifecycle ---

    /// Register a group, or revive a deleted one on `server`.
    pub async fn create_group(
        &self,
        group_id: GroupId,
        server: GameServer,
        name: Option<String>,
    ) -> Result<Group, ClanError> {
        let _guard = self.lock(group_id).await;
        let group = match self.store.get_group(group_id).await? {
            Some(group) if !group.deleted => {
                return Err(ClanError::group(format!("group {group_id} already exists")));
            }
            Some(mut group) => {
                group.deleted = false;
                group.server = server;
                if name.is_some() {
                    group.name = name;
                }
                info!(%group_id, %server, "group revived");
                group
            }
            None => {
                let mut group = Group {
                    group_id,
                    name,
                    server,
                    battle_id: 0,
                    cycle: 1,
                    now_health: BossHealth::ZERO,
                    next_health: BossHealth::ZERO,
                    engagements: EngagementMap::new(),
                    subscriptions: SubscriptionMap::new(),
                    deleted: false,
                };
                self.stages.initialize(&mut group, 1);
                info!(%group_id, %server, "group created");
                group
            }
        };
        self.store.save_group(&group).await?;
        self.publish(&group, None);
        Ok(group)
    }

    /// Soft-delete a group. Its records stay and `create_group` revives it.
    ///
    /// Nothing is published; the group's status channel is closed instead.
    pub async fn delete_group(&self, group_id: GroupId) -> Result<(), ClanError> {
        let _guard = self.lock(group_id).await;
        let mut work = self.load_group(group_id).await?;
        work.deleted = true;
        self.store.save_group(&work).await?;
        self.bus.close(group_id);
        info!(%group_id, "group deleted");
        Ok(())
    }

    pub async fn change_game_server(&self, group_id: GroupId, server: &str) -> Result<(), ClanError> {
        let server = GameServer::parse(server)?;
        self.update_group(group_id, |group| {
            group.server = server;
            Ok(())
        })
        .await?;
        info!(%group_id, %server, "game server changed");
        Ok(())
    }

    /// Admin override of the cycle and any slots' health.
    pub async fn modify_status(
        &self,
        group_id: GroupId,
        cycle: Option<u32>,
        slots: &[SlotOverride],
    ) -> Result<Arc<BossStatus>, ClanError> {
        if let Some(cycle) = cycle {
            if !(1..=MAX_CYCLE).contains(&cycle) {
                return Err(ClanError::invalid(format!(
                    "cycle must be between 1 and {MAX_CYCLE}, got {cycle}"
                )));
            }
        }
        let _guard = self.lock(group_id).await;
        let mut work = self.load_group(group_id).await?;
        if let Some(cycle) = cycle {
            work.cycle = cycle;
        }
        let next_full = self.stages.full_health(work.server, work.cycle.saturating_add(1));
        for o in slots {
            if o.is_next {
                work.now_health[o.slot] = 0;
                work.next_health[o.slot] = o.health;
            } else {
                work.now_health[o.slot] = o.health;
                work.next_health[o.slot] = next_full[o.slot];
            }
        }
        self.store.save_group(&work).await?;
        info!(%group_id, cycle = work.cycle, "status modified");
        Ok(self.publish(&work, Some("boss status modified".to_string())))
    }

    // --- membership ---

    /// Add or update a member, keeping their save-slot mark.
    pub async fn bind_member(
        &self,
        group_id: GroupId,
        member: MemberId,
        role: Role,
    ) -> Result<Membership, ClanError> {
        let _guard = self.lock(group_id).await;
        self.load_group(group_id).await?;
        let last_save_slot = self
            .store
            .get_membership(group_id, member)
            .await?
            .and_then(|m| m.last_save_slot);
        let membership = Membership {
            group_id,
            member,
            role,
            last_save_slot,
        };
        self.store.save_membership(&membership).await?;
        debug!(%group_id, %member, %role, "member bound");
        Ok(membership)
    }

    pub async fn drop_members(
        &self,
        group_id: GroupId,
        members: &[MemberId],
    ) -> Result<usize, ClanError> {
        let _guard = self.lock(group_id).await;
        self.load_group(group_id).await?;
        let dropped = self.store.delete_memberships(group_id, members).await?;
        info!(%group_id, dropped, "members dropped");
        Ok(dropped)
    }

    pub async fn list_members(&self, group_id: GroupId) -> Result<Vec<Membership>, ClanError> {
        self.load_group(group_id).await?;
        self.store.list_memberships(group_id).await
    }

    // --- engagements ---

    /// Start fighting `slot`. Returns whether the attempt uses a leftover credit.
    pub async fn claim(
        &self,
        group_id: GroupId,
        member: MemberId,
        slot: BossSlot,
        behalf: Option<MemberId>,
        compensation: bool,
    ) -> Result<bool, ClanError> {
        let _guard = self.lock(group_id).await;
        let mut work = self.load_group(group_id).await?;
        self.membership(group_id, member).await?;

        let today = self.game_now(work.server).date;
        let tally = self.tally(&work, member, today).await?;
        let request = ClaimRequest {
            member,
            slot,
            behalf: behalf.filter(|b| *b != member),
            compensation,
        };
        let compensation = engagement::claim(
            &mut work,
            &self.stages,
            &request,
            &tally,
            self.battle.daily_attempts,
        )?;

        self.store.save_group(&work).await?;
        self.publish(&work, None);
        info!(%group_id, %member, %slot, compensation, "boss claimed");
        Ok(compensation)
    }

    pub async fn report_progress(
        &self,
        group_id: GroupId,
        member: MemberId,
        seconds: u32,
        damage: u64,
    ) -> Result<(), ClanError> {
        self.update_group(group_id, |group| {
            engagement::report_progress(group, member, seconds, damage).map(|_| ())
        })
        .await
    }

    /// Go up the tree on the member's current boss.
    pub async fn mark_blocked(
        &self,
        group_id: GroupId,
        member: MemberId,
        note: Option<String>,
    ) -> Result<BossSlot, ClanError> {
        self.update_group(group_id, |group| {
            engagement::mark_blocked(group, member, note)
        })
        .await
    }

    pub async fn unblock(&self, group_id: GroupId, member: MemberId) -> Result<BossSlot, ClanError> {
        self.update_group(group_id, |group| engagement::unblock(group, member))
            .await
    }

    pub async fn release(&self, group_id: GroupId, scope: ReleaseScope) -> Result<usize, ClanError> {
        let released = self
            .update_group(group_id, |group| engagement::release(group, scope))
            .await?;
        debug!(%group_id, ?scope, released, "engagements released");
        Ok(released)
    }

    // --- subscriptions ---

    pub async fn subscribe(
        &self,
        group_id: GroupId,
        member: MemberId,
        slot: BossSlot,
    ) -> Result<(), ClanError> {
        self.membership(group_id, member).await?;
        self.update_group(group_id, |group| {
            subscription::subscribe(group, member, slot)
        })
        .await
    }

    pub async fn unsubscribe(
        &self,
        group_id: GroupId,
        slot: BossSlot,
        member: Option<MemberId>,
    ) -> Result<(), ClanError> {
        self.update_group(group_id, |group| {
            subscription::unsubscribe(group, slot, member)
        })
        .await
    }

    pub async fn subscriptions(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<(BossSlot, Vec<MemberId>)>, ClanError> {
        let group = self.load_group(group_id).await?;
        Ok(subscription::list_all(&group))
    }

    // --- ledger ---

    /// Record an attempt and update the bosses.
    pub async fn record(
        &self,
        group_id: GroupId,
        request: RecordRequest,
    ) -> Result<RecordOutcome, ClanError> {
        request.check_damage()?;
        let (dealer, behalf) = request.dealer();
        let dealer_name = self.display_name(dealer).await;
        let reporter_name = match behalf {
            Some(reporter) => Some(self.display_name(reporter).await),
            None => None,
        };

        let guard = self.lock(group_id).await;
        let group = self.load_group(group_id).await?;
        self.membership(group_id, request.reporter).await?;
        if behalf.is_some() {
            self.membership(group_id, dealer).await?;
        }

        let now = self.game_now(group.server);
        let mut view = LedgerView {
            today: self.tally(&group, dealer, now.date).await?,
            ..LedgerView::default()
        };
        if request.previous_day {
            let today = ChallengeQuery::day(group.group_id, group.battle_id, now.date);
            view.group_has_entries_today = !self.store.query_challenges(&today).await?.is_empty();
            view.yesterday = self
                .tally(&group, dealer, now.previous_day().date)
                .await?;
        }

        let mut work = group;
        let plan = challenge::plan_record(
            &mut work,
            &self.stages,
            &request,
            &view,
            now,
            self.battle.daily_attempts,
        )?;
        let challenge = self.store.commit_challenge(&work, plan.challenge).await?;

        let verb = if challenge.is_defeat() { "defeated" } else { "hit" };
        let message = format!(
            "{dealer_name} {verb} boss {} for {} damage ({}, attempt {} {})",
            challenge.slot,
            summary::thousands(challenge.damage),
            plan.kind,
            plan.ordinal,
            plan.day_label,
        );
        let status = self.publish(&work, Some(message.clone()));
        drop(guard);

        info!(
            %group_id,
            member = %dealer,
            slot = %challenge.slot,
            cycle = challenge.cycle,
            damage = challenge.damage,
            defeated = challenge.is_defeat(),
            "challenge recorded"
        );

        let mut outbound = plan.outbound;
        if let Some(reporter_name) = reporter_name {
            outbound.push(Outbound::Member {
                member: dealer,
                text: format!(
                    "{reporter_name} recorded your attempt on boss {}: {} damage",
                    challenge.slot,
                    summary::thousands(challenge.damage)
                ),
            });
        }
        effects::dispatch(&self.notifier, outbound);

        Ok(RecordOutcome {
            challenge,
            message,
            status,
        })
    }

    /// Remove the last entry of the active archive and restore the bosses.
    ///
    /// Admins may always undo; others only their own entries.
    pub async fn undo(
        &self,
        group_id: GroupId,
        requester: MemberId,
        privileged: bool,
    ) -> Result<Challenge, ClanError> {
        let _guard = self.lock(group_id).await;
        let mut work = self.load_group(group_id).await?;
        let privileged = privileged
            || self
                .store
                .get_membership(group_id, requester)
                .await?
                .is_some_and(|m| m.role.is_privileged());

        let Some(entry) = self.store.last_challenge(group_id, work.battle_id).await? else {
            return Err(ClanError::group("no records to undo"));
        };
        challenge::plan_undo(&mut work, &self.stages, &entry, requester, privileged)?;
        self.store.commit_undo(&work, entry.id).await?;
        self.publish(&work, Some(format!("record {} undone", entry.id)));
        info!(%group_id, challenge_id = entry.id, %requester, "challenge undone");
        Ok(entry)
    }

    // --- status ---

    /// A registered group's stored record.
    pub async fn group(&self, group_id: GroupId) -> Result<Group, ClanError> {
        self.load_group(group_id).await
    }

    /// The latest snapshot of a group's bosses.
    pub async fn current_state(&self, group_id: GroupId) -> Result<Arc<BossStatus>, ClanError> {
        let group = self.load_group(group_id).await?;
        Ok(self
            .bus
            .current(group_id)
            .unwrap_or_else(|| Arc::new(summary::build_status(&group, &self.stages, None))))
    }

    /// Watch a group's snapshots.
    pub async fn subscribe_status(&self, group_id: GroupId) -> Result<StatusWatch, ClanError> {
        let group = self.load_group(group_id).await?;
        Ok(self.bus.watch(group_id, || {
            summary::build_status(&group, &self.stages, None)
        }))
    }

    /// Text board of every boss plus today's overview.
    pub async fn status_summary(&self, group_id: GroupId) -> Result<String, ClanError> {
        let status = self.current_state(group_id).await?;
        let overview = self.daily_overview(group_id).await?;

        let mut names = HashMap::new();
        for slot in &status.slots {
            for c in &slot.claimants {
                for member in std::iter::once(c.member).chain(c.behalf) {
                    if !names.contains_key(&member) {
                        let name = self.display_name(member).await;
                        names.insert(member, name);
                    }
                }
            }
        }
        Ok(summary::render_status(&status, &overview, &names))
    }

    // --- archives ---

    pub async fn record_counts(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<(BattleId, u64)>, ClanError> {
        self.load_group(group_id).await?;
        self.store.record_counts(group_id).await
    }

    /// Reset the battle to cycle 1 and delete one archive's entries
    /// (the active archive by default).
    pub async fn clear_archive(
        &self,
        group_id: GroupId,
        battle_id: Option<BattleId>,
    ) -> Result<u64, ClanError> {
        let _guard = self.lock(group_id).await;
        let mut work = self.load_group(group_id).await?;
        let battle_id = battle_id.unwrap_or(work.battle_id);
        archive::reset_battle(&mut work, &self.stages);
        let deleted = self.store.commit_clear_archive(&work, battle_id).await?;
        self.publish(&work, Some(format!("archive {battle_id} cleared")));
        info!(%group_id, battle_id, deleted, "archive cleared");
        Ok(deleted)
    }

    /// Save the live battle under the active archive and load `battle_id`.
    pub async fn switch_archive(
        &self,
        group_id: GroupId,
        battle_id: BattleId,
    ) -> Result<(), ClanError> {
        let _guard = self.lock(group_id).await;
        let mut work = self.load_group(group_id).await?;
        let leaving_id = work.battle_id;
        let target_backup = self.store.load_backup(group_id, battle_id).await?;
        let restored = target_backup.is_some();
        let leaving = archive::switch_to(&mut work, &self.stages, battle_id, target_backup)?;
        self.store
            .commit_switch_archive(&work, leaving_id, &leaving)
            .await?;
        self.publish(&work, Some(format!("switched to archive {battle_id}")));
        info!(%group_id, from = leaving_id, to = battle_id, restored, "archive switched");
        Ok(())
    }

    // --- save slot ---

    /// Use, check or cancel the member's save-slot for today.
    ///
    /// Returns whether the save-slot is marked as used today afterwards.
    pub async fn save_slot(
        &self,
        group_id: GroupId,
        member: MemberId,
        action: SaveSlotAction,
    ) -> Result<bool, ClanError> {
        let _guard = self.lock(group_id).await;
        let group = self.load_group(group_id).await?;
        let mut membership = self.membership(group_id, member).await?;
        let today = self.game_now(group.server).date;
        let used_today = membership.last_save_slot == Some(today);

        match action {
            SaveSlotAction::Check => return Ok(used_today),
            SaveSlotAction::Use if used_today => {
                return Err(ClanError::user("save slot already used today"));
            }
            SaveSlotAction::Use => membership.last_save_slot = Some(today),
            SaveSlotAction::Cancel if !used_today => {
                return Err(ClanError::user("save slot not used today"));
            }
            SaveSlotAction::Cancel => membership.last_save_slot = None,
        }
        self.store.save_membership(&membership).await?;
        debug!(%group_id, %member, ?action, "save slot updated");
        Ok(membership.last_save_slot.is_some())
    }

    // --- reports ---

    fn archive_filter(group: &Group, selector: ArchiveSelector) -> Option<BattleId> {
        match selector {
            ArchiveSelector::Current => Some(group.battle_id),
            ArchiveSelector::All => None,
            ArchiveSelector::Id(id) => Some(id),
        }
    }

    pub async fn report(
        &self,
        group_id: GroupId,
        selector: ArchiveSelector,
        member: Option<MemberId>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<ReportRow>, ClanError> {
        let group = self.load_group(group_id).await?;
        let query = ChallengeQuery {
            group_id,
            battle_id: Self::archive_filter(&group, selector),
            member,
            date,
        };
        let rows = self
            .store
            .query_challenges(&query)
            .await?
            .iter()
            .map(|c| ReportRow::from_challenge(c, group.server, self.battle.reset_hour))
            .collect();
        Ok(rows)
    }

    pub async fn battle_members(
        &self,
        group_id: GroupId,
        selector: ArchiveSelector,
    ) -> Result<Vec<MemberId>, ClanError> {
        let group = self.load_group(group_id).await?;
        let query = ChallengeQuery {
            group_id,
            battle_id: Self::archive_filter(&group, selector),
            member: None,
            date: None,
        };
        let entries = self.store.query_challenges(&query).await?;
        Ok(clanbattle_ledger::battle_members(&entries))
    }

    /// Today's full attempts and leftover holders in the active archive.
    pub async fn daily_overview(&self, group_id: GroupId) -> Result<DailyOverview, ClanError> {
        let group = self.load_group(group_id).await?;
        let today = self.game_now(group.server).date;
        let query = ChallengeQuery::day(group_id, group.battle_id, today);
        let entries = self.store.query_challenges(&query).await?;
        Ok(clanbattle_ledger::daily_overview(&entries))
    }

    // --- reminders ---

    /// Ask `members` to finish today's attempts. Returns the number of
    /// messages queued.
    pub async fn send_reminder(
        &self,
        group_id: GroupId,
        members: &[MemberId],
        sender: MemberId,
        private: bool,
    ) -> Result<usize, ClanError> {
        self.load_group(group_id).await?;
        if members.is_empty() {
            return Ok(0);
        }
        let text = format!(
            "{} reminds you to finish today's attempts",
            self.display_name(sender).await
        );
        let outbound: Vec<Outbound> = if private {
            members
                .iter()
                .map(|member| Outbound::Member {
                    member: *member,
                    text: text.clone(),
                })
                .collect()
        } else {
            vec![Outbound::Group {
                group_id,
                text,
                mentions: members.to_vec(),
            }]
        };
        let queued = outbound.len();
        effects::dispatch(&self.notifier, outbound);
        info!(%group_id, %sender, queued, private, "reminder sent");
        Ok(queued)
    }
}
