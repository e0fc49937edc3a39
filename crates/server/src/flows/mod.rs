//! Workflow handlers.
//!
//! Each submodule owns the routes of one branch of the menu tree and
//! registers them into the shared `TransitionTable`. Handlers receive a
//! `Ctx` with the collaborators and the scheduler, the caller's session, and
//! a freshly loaded copy of the edited world. They persist through
//! `Ctx::save`; a handler that returns an error leaves the stored world as it
//! was.

pub(crate) mod commit;
pub mod critical;
pub mod environment;
pub mod expansion;
pub mod membership;
pub mod navigation;
pub mod settings;

use realmkeep_geometry::{OverlayRegion, OverlayTarget, apply_overlay, repaint};
use realmkeep_model::{Preview, StoreError, Tick, UserId, UserStats, WorldConfig, WorldId};
use tracing::{debug, info};

use crate::Collaborators;
use crate::config::CoreConfig;
use crate::deferred::{CommitAction, DeferredCommits};
use crate::error::{Denial, FlowError};
use crate::event::InputEvent;
use crate::router::{Outcome, TransitionTable};
use crate::scheduler::TaskScheduler;
use crate::session::Session;
use crate::surface::Notice;
use crate::validation::ValidationError;

pub(crate) fn register_all(table: &mut TransitionTable) {
    navigation::register(table);
    settings::register(table);
    membership::register(table);
    critical::register(table);
    expansion::register(table);
    environment::register(table);
}

/// Everything a handler may touch besides the session and the world.
pub struct Ctx<'a> {
    pub config: &'a CoreConfig,
    pub env: &'a mut Collaborators,
    pub scheduler: &'a mut TaskScheduler,
    pub deferred: &'a mut DeferredCommits,
}

impl Ctx<'_> {
    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    /// Refresh the expiry and persist.
    pub fn save(&mut self, world: &mut WorldConfig) -> Result<(), FlowError> {
        world.refresh_expiry(self.now().saturating_add(self.config.retention_ticks));
        self.env.worlds.save(world).map_err(|err| match err {
            StoreError::NameTaken(name) => ValidationError::NameTaken(name).into(),
            other => FlowError::Store(other),
        })?;
        info!(world = %world.id, name = %world.name, "world saved");
        Ok(())
    }

    /// Edit a user's stats record. Users without one are skipped.
    pub fn update_stats(
        &mut self,
        user: UserId,
        change: impl FnOnce(&mut UserStats),
    ) -> Result<(), FlowError> {
        let Some(mut stats) = self.env.users.find_by_id(user) else {
            debug!(user = %user, "no stats record to update");
            return Ok(());
        };
        change(&mut stats);
        self.env.users.save(&stats)?;
        Ok(())
    }

    /// Debit `cost`. Returns the amount actually taken, which is zero when no
    /// ledger is installed.
    pub fn charge(&mut self, user: UserId, cost: u64) -> Result<u64, FlowError> {
        if cost == 0 || !self.env.ledger.is_available() {
            return Ok(0);
        }
        if !self.env.ledger.debit(user, cost) {
            return Err(FlowError::InsufficientBalance {
                needed: cost,
                balance: self.env.ledger.balance(user),
            });
        }
        debug!(user = %user, cost, "charged");
        Ok(cost)
    }

    pub fn refund(&mut self, user: UserId, amount: u64) {
        if amount == 0 {
            return;
        }
        self.env.ledger.credit(user, amount);
        self.notify_online(user, Notice::Refunded(amount));
    }

    pub fn notify(&mut self, user: UserId, notice: Notice) {
        self.env.surface.notify(user, notice);
    }

    /// Notify only if the user is still around to read it.
    pub fn notify_online(&mut self, user: UserId, notice: Notice) {
        if self.env.directory.is_online(user) {
            self.env.surface.notify(user, notice);
        }
    }

    pub fn resolve_player(&self, name: &str) -> Result<UserId, ValidationError> {
        let name = name.trim();
        self.env
            .directory
            .resolve_name(name)
            .ok_or_else(|| ValidationError::UnknownPlayer(name.to_string()))
    }

    /// Charge, show a preview, and arm the commit timer. Ends the session.
    pub fn stage_commit(
        &mut self,
        user: UserId,
        world: &WorldConfig,
        cost: u64,
        action: CommitAction,
        preview: Preview,
    ) -> Result<Outcome, FlowError> {
        if self.deferred.is_pending(user) {
            return Err(Denial::PreviewPending.into());
        }
        let charged = self.charge(user, cost)?;
        let delay = self.config.preview_delay_ticks;
        if self
            .deferred
            .schedule(self.scheduler, user, world.id, charged, action, delay)
            .is_err()
        {
            self.env.ledger.credit(user, charged);
            return Err(Denial::PreviewPending.into());
        }
        self.env.host.show_preview(user, world.id, preview);
        self.notify(user, Notice::PreviewStarted { delay_ticks: delay });
        info!(user = %user, world = %world.id, cost = charged, delay, "preview staged");
        Ok(Outcome::Close)
    }

    /// Clear and repaint every loaded unit of `world`.
    pub fn repaint_loaded(&mut self, world: &WorldConfig) -> usize {
        let global = world.global_overlay(self.config.overlay.global_margin);
        let partials = &world.overlay_regions;
        let mut changed = 0;
        self.env
            .host
            .for_each_loaded_unit(world.id, &mut |unit: &mut dyn OverlayTarget| {
                changed += repaint(global.as_ref(), partials, unit);
            });
        changed
    }

    /// Paint one new region onto every loaded unit of `world`.
    pub fn paint_loaded(&mut self, world: WorldId, region: &OverlayRegion) -> usize {
        let mut changed = 0;
        self.env
            .host
            .for_each_loaded_unit(world, &mut |unit: &mut dyn OverlayTarget| {
                changed += apply_overlay(region, unit);
            });
        changed
    }
}

pub(crate) fn require_owner(session: &Session, world: &WorldConfig) -> Result<(), Denial> {
    if world.is_owner(session.user_id) {
        Ok(())
    } else {
        Err(Denial::NotOwner)
    }
}

pub(crate) fn require_member(session: &Session, world: &WorldConfig) -> Result<(), Denial> {
    if world.is_member(session.user_id) {
        Ok(())
    } else {
        Err(Denial::NotMember)
    }
}

/// The `user` argument of a menu item that targets a player.
pub(crate) fn subject_arg(event: &InputEvent) -> Result<UserId, ValidationError> {
    let raw = event
        .field("user")
        .ok_or(ValidationError::MissingField("user"))?;
    raw.parse()
        .map_err(|_| ValidationError::UnknownPlayer(raw.to_string()))
}
