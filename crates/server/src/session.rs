//! Per-user sessions.
//!
//! At most one session exists per user. Starting a new one replaces the old
//! one, which the caller receives back so it can clean up after it.

use std::collections::HashMap;

use realmkeep_geometry::{Cell, Direction};
use realmkeep_model::{SpawnKind, SpawnPoint, Tick, UserId, WorldId};

use crate::state::MenuState;

/// Transient per-workflow values not yet written to the world.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scratch {
    pub direction: Option<Direction>,
    pub overlay_label: Option<String>,
    pub radius: Option<i32>,
    pub center: Option<Cell>,
    pub cost: Option<u64>,
    pub subject: Option<UserId>,
    pub spawn: Option<(SpawnKind, SpawnPoint)>,
    /// State that opened the current confirmation.
    pub return_to: Option<MenuState>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    /// World being edited.
    pub target: WorldId,
    pub state: MenuState,
    pub created_at: Tick,
    pub last_active: Tick,
    /// Set while a redraw is in flight; all input is dropped meanwhile.
    pub transitioning: bool,
    pub scratch: Scratch,
}

impl Session {
    pub fn new(user_id: UserId, target: WorldId, now: Tick) -> Self {
        Self {
            user_id,
            target,
            state: MenuState::Overview,
            created_at: now,
            last_active: now,
            transitioning: false,
            scratch: Scratch::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session, returning the one it replaced.
    pub fn begin(&mut self, session: Session) -> Option<Session> {
        self.sessions.insert(session.user_id, session)
    }

    pub fn get(&self, user: UserId) -> Option<&Session> {
        self.sessions.get(&user)
    }

    pub fn get_mut(&mut self, user: UserId) -> Option<&mut Session> {
        self.sessions.get_mut(&user)
    }

    pub fn end(&mut self, user: UserId) -> Option<Session> {
        self.sessions.remove(&user)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Users with no accepted input since before `cutoff`.
    pub fn idle_since(&self, cutoff: Tick) -> Vec<UserId> {
        self.sessions
            .values()
            .filter(|s| s.last_active < cutoff)
            .map(|s| s.user_id)
            .collect()
    }
}
