//! Pending speculative commits.
//!
//! A preview workflow ends by registering a `PendingCommit`. Two triggers
//! race to resolve it: the delay timer and an early exit (disconnect, area
//! change, reopening a session). Both go through this table, and removing the
//! entry is the only way to obtain the commit, so whichever trigger comes
//! second finds nothing.

use std::collections::HashMap;

use realmkeep_geometry::{Border, ExpansionLevel, OverlayRegion};
use realmkeep_model::{Tick, UserId, WorldId};
use thiserror::Error;

use crate::scheduler::{Task, TaskHandle, TaskId, TaskScheduler};

/// The mutation a pending commit will perform.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitAction {
    /// Grow the border. Applied only if the world is still at `from_level`.
    Expand {
        border: Border,
        level: ExpansionLevel,
        from_level: ExpansionLevel,
    },
    GlobalOverlay { label: String },
    PartialOverlay { region: OverlayRegion },
}

#[derive(Debug)]
pub struct PendingCommit {
    pub user_id: UserId,
    pub world_id: WorldId,
    /// Amount already debited; refunded if the commit cannot land.
    pub cost: u64,
    pub action: CommitAction,
    pub scheduled_at: Tick,
    pub handle: TaskHandle,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeferredError {
    #[error("user {0} already has a pending commit")]
    AlreadyPending(UserId),
}

#[derive(Debug, Default)]
pub struct DeferredCommits {
    pending: HashMap<UserId, PendingCommit>,
}

impl DeferredCommits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a commit and arm its timer.
    pub fn schedule(
        &mut self,
        scheduler: &mut TaskScheduler,
        user_id: UserId,
        world_id: WorldId,
        cost: u64,
        action: CommitAction,
        delay_ticks: u64,
    ) -> Result<TaskHandle, DeferredError> {
        if self.pending.contains_key(&user_id) {
            return Err(DeferredError::AlreadyPending(user_id));
        }
        let handle = scheduler.schedule(Task::CommitDue(user_id), delay_ticks);
        self.pending.insert(
            user_id,
            PendingCommit {
                user_id,
                world_id,
                cost,
                action,
                scheduled_at: scheduler.now(),
                handle: handle.clone(),
            },
        );
        Ok(handle)
    }

    /// Early-exit trigger: take the commit and disarm its timer.
    pub fn flush_now(&mut self, user: UserId) -> Option<PendingCommit> {
        let commit = self.pending.remove(&user)?;
        commit.handle.cancel();
        Some(commit)
    }

    /// Timer trigger: take the commit only if `task` is the timer armed for it.
    pub fn take_fired(&mut self, user: UserId, task: TaskId) -> Option<PendingCommit> {
        if self.pending.get(&user)?.handle.id() != task {
            return None;
        }
        self.pending.remove(&user)
    }

    pub fn get(&self, user: UserId) -> Option<&PendingCommit> {
        self.pending.get(&user)
    }

    pub fn is_pending(&self, user: UserId) -> bool {
        self.pending.contains_key(&user)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
