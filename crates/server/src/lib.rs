//! Realmkeep Server
//!
//! The interaction orchestration core for player-owned worlds. It owns:
//! - Sessions, at most one per user, walking the shared menu state machine
//! - The per-user input cooldown gate
//! - The `(state, channel, discriminator)` transition table
//! - The tick scheduler and the table of pending commits
//! - The inbox through which other contexts hand work to the main loop
//!
//! Records, points, live world instances, player presence, and menu
//! rendering are reached through the collaborator traits in `Collaborators`.
//!
//! # Threading
//!
//! `Core` belongs to the main loop and is not `Send`. Every mutation of a
//! session, a world record, or a pending commit happens inside one of its
//! methods. Other contexts hold an `Inbox` and their events are handled on
//! the next `tick()`.

#![deny(unsafe_code)]

pub mod config;
pub mod deferred;
pub mod error;
pub mod event;
pub mod flows;
pub mod gate;
pub mod router;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod surface;
pub mod validation;

#[cfg(test)]
mod testkit;

use crossbeam::channel::{self, Receiver, Sender};
use realmkeep_geometry::{OverlayTarget, apply_world_overlays};
use realmkeep_model::{
    CostLedger, Directory, Tick, UserId, UserStatsStore, WorldConfig, WorldHost, WorldId,
    WorldStore,
};
use tracing::{debug, info, trace, warn};

pub use config::{ConfigError, CoreConfig};
pub use error::{Denial, FlowError};
pub use event::{Channel, InputEvent, Payload, Placement};
pub use router::{Outcome, TransitionTable};
pub use session::{Scratch, Session};
pub use state::{MenuState, StateKind};
pub use surface::{MenuSurface, Notice, RecordingSurface};
pub use validation::ValidationError;

use flows::{Ctx, commit};
use gate::{GateResult, InputGate};
use scheduler::{Task, TaskScheduler};
use deferred::DeferredCommits;
use session::SessionStore;

/// The external collaborators the core drives.
pub struct Collaborators {
    pub worlds: Box<dyn WorldStore>,
    pub users: Box<dyn UserStatsStore>,
    pub ledger: Box<dyn CostLedger>,
    pub host: Box<dyn WorldHost>,
    pub directory: Box<dyn Directory>,
    pub surface: Box<dyn MenuSurface>,
}

// ============================================================================
// Inbox
// ============================================================================

/// Work handed to the main loop from another context.
#[derive(Debug, Clone)]
pub enum Inbound {
    Input(InputEvent),
    Disconnect(UserId),
    /// The user moved into `world`, or out of every world.
    AreaChange {
        user: UserId,
        world: Option<WorldId>,
    },
}

/// Cloneable, `Send` handle for queueing work onto the main loop.
#[derive(Debug, Clone)]
pub struct Inbox {
    tx: Sender<Inbound>,
}

impl Inbox {
    /// Queue an input event. Returns false once the core is gone.
    pub fn submit(&self, event: InputEvent) -> bool {
        self.tx.send(Inbound::Input(event)).is_ok()
    }

    pub fn disconnect(&self, user: UserId) -> bool {
        self.tx.send(Inbound::Disconnect(user)).is_ok()
    }

    pub fn area_change(&self, user: UserId, world: Option<WorldId>) -> bool {
        self.tx.send(Inbound::AreaChange { user, world }).is_ok()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// What became of one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No session; the event was ignored.
    NoSession,
    DroppedTransitioning,
    DroppedCooldown,
    /// No route for this state, channel, and discriminator.
    Unmatched,
    /// The edited world is gone; the session ended.
    StaleReference,
    Accepted,
    /// The handler refused; the user was told why.
    Rejected,
}

// ============================================================================
// Core
// ============================================================================

pub struct Core {
    config: CoreConfig,
    env: Collaborators,
    sessions: SessionStore,
    gate: InputGate,
    scheduler: TaskScheduler,
    deferred: DeferredCommits,
    table: TransitionTable,
    inbox_tx: Sender<Inbound>,
    inbox_rx: Receiver<Inbound>,
    /// Latest adapter timestamp seen, used to age out cooldown entries.
    latest_ms: u64,
}

impl Core {
    pub fn new(config: CoreConfig, env: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        let (inbox_tx, inbox_rx) = channel::unbounded();
        Ok(Self {
            gate: InputGate::new(config.cooldown_ms),
            sessions: SessionStore::new(),
            scheduler: TaskScheduler::new(),
            deferred: DeferredCommits::new(),
            table: TransitionTable::standard(),
            inbox_tx,
            inbox_rx,
            latest_ms: 0,
            config,
            env,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    pub fn inbox(&self) -> Inbox {
        Inbox {
            tx: self.inbox_tx.clone(),
        }
    }

    pub fn session(&self, user: UserId) -> Option<&Session> {
        self.sessions.get(user)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn has_pending(&self, user: UserId) -> bool {
        self.deferred.is_pending(user)
    }

    pub fn pending_count(&self) -> usize {
        self.deferred.len()
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx {
            config: &self.config,
            env: &mut self.env,
            scheduler: &mut self.scheduler,
            deferred: &mut self.deferred,
        }
    }

    /// Create a world at the initial border and record it as owned by `owner`.
    pub fn create_world(&mut self, owner: UserId, name: &str) -> Result<WorldId, FlowError> {
        let name = validation::validate_name(name, &self.config.text)?;
        if self.env.worlds.find_by_name(&name).is_some() {
            return Err(ValidationError::NameTaken(name).into());
        }
        let border = self.config.expansion.initial_border();
        let mut world = WorldConfig::new(uuid::Uuid::new_v4(), name, owner, border, self.now());
        let id = world.id;

        let mut ctx = self.ctx();
        ctx.save(&mut world)?;
        ctx.update_stats(owner, |stats| {
            stats.owned_worlds.insert(id);
        })?;
        ctx.env.host.apply_border(id, border);
        info!(owner = %owner, world = %id, name = %world.name, "world created");
        Ok(id)
    }

    /// Start a session on `world` at the overview, replacing any current one.
    ///
    /// A pending commit of this user lands first.
    pub fn open(&mut self, user: UserId, world_id: WorldId) -> Result<(), FlowError> {
        self.flush_now(user);
        let world = self
            .env
            .worlds
            .find_by_id(world_id)
            .ok_or(FlowError::StaleReference(world_id))?;

        if let Some(previous) = self.sessions.end(user) {
            debug!(user = %user, previous = %previous.target, "session replaced");
        }
        self.scheduler.cancel_for(user);

        self.ctx().update_stats(user, |stats| {
            stats.last_world = Some(world_id);
        })?;
        info!(user = %user, world = %world_id, "session opened");
        self.redraw(Session::new(user, world_id, self.now()), &world);
        Ok(())
    }

    /// Route one input event. Main loop only; other contexts use `inbox()`.
    pub fn handle(&mut self, event: InputEvent) -> Dispatch {
        let user = event.user_id;
        self.latest_ms = self.latest_ms.max(event.at_ms);

        let Some(session) = self.sessions.get(user) else {
            trace!(user = %user, "input without a session");
            return Dispatch::NoSession;
        };
        if session.transitioning {
            trace!(user = %user, "input dropped while redrawing");
            return Dispatch::DroppedTransitioning;
        }
        if let GateResult::Cooldown { elapsed_ms } = self.gate.try_admit(user, event.at_ms) {
            trace!(user = %user, elapsed_ms, "input dropped by cooldown");
            return Dispatch::DroppedCooldown;
        }

        let (state, target) = (session.state, session.target);
        let Some(mut world) = self.env.worlds.find_by_id(target) else {
            self.stale(user, target);
            return Dispatch::StaleReference;
        };
        let Some(handler) = self.table.route(state, &event, &self.config.cancel_word) else {
            debug!(
                user = %user,
                ?state,
                channel = ?event.channel,
                discriminator = %event.discriminator,
                "unknown transition"
            );
            return Dispatch::Unmatched;
        };
        let Some(mut session) = self.sessions.end(user) else {
            return Dispatch::NoSession;
        };
        session.last_active = self.now();

        let result = handler(&mut self.ctx(), &mut session, &mut world, &event);
        match result {
            Ok(outcome) => {
                self.apply(session, &world, outcome);
                Dispatch::Accepted
            }
            Err(err) => self.fail(session, &world, err),
        }
    }

    /// Advance one tick: drain the inbox, expire idle sessions, run due tasks.
    pub fn tick(&mut self) {
        let due = self.scheduler.advance();

        let inbound: Vec<Inbound> = self.inbox_rx.try_iter().collect();
        for message in inbound {
            match message {
                Inbound::Input(event) => {
                    self.handle(event);
                }
                Inbound::Disconnect(user) => self.on_disconnect(user),
                Inbound::AreaChange { user, world } => self.on_area_change(user, world),
            }
        }

        self.expire_idle();

        for (id, task) in due {
            match task {
                Task::RedrawDone(user) => {
                    if let Some(session) = self.sessions.get_mut(user) {
                        session.transitioning = false;
                    }
                }
                Task::CommitDue(user) => match self.deferred.take_fired(user, id) {
                    Some(pending) => commit::execute(&mut self.ctx(), pending),
                    None => debug!(user = %user, "commit already resolved"),
                },
            }
        }

        self.gate.evict_before(self.latest_ms);
    }

    /// Land the user's pending commit now. Returns whether there was one.
    pub fn flush_now(&mut self, user: UserId) -> bool {
        let Some(pending) = self.deferred.flush_now(user) else {
            return false;
        };
        debug!(user = %user, world = %pending.world_id, "flushing pending commit early");
        commit::execute(&mut self.ctx(), pending);
        true
    }

    pub fn on_disconnect(&mut self, user: UserId) {
        let had_session = self.sessions.end(user).is_some();
        self.env.host.clear_preview(user);
        let flushed = self.flush_now(user);
        self.scheduler.cancel_for(user);
        self.gate.forget(user);
        info!(user = %user, had_session, flushed, "user disconnected");
    }

    /// The user is now in `world` (`None`: outside every world).
    ///
    /// Leaving a world lands any commit previewed there and abandons a
    /// placement workflow targeting it. Menus stay open.
    pub fn on_area_change(&mut self, user: UserId, world: Option<WorldId>) {
        let left_preview = self
            .deferred
            .get(user)
            .is_some_and(|pending| Some(pending.world_id) != world);
        if left_preview {
            self.flush_now(user);
        }

        let abandon = self.sessions.get(user).is_some_and(|session| {
            Some(session.target) != world && session.state.kind() == StateKind::Placement
        });
        if abandon {
            self.sessions.end(user);
            self.env.host.clear_preview(user);
            self.env.surface.close(user);
            debug!(user = %user, "placement abandoned on area change");
        }
    }

    /// Paint every overlay of `world` onto a unit that just became active.
    pub fn on_unit_loaded(&self, world_id: WorldId, unit: &mut dyn OverlayTarget) -> usize {
        let Some(world) = self.env.worlds.find_by_id(world_id) else {
            return 0;
        };
        let global = world.global_overlay(self.config.overlay.global_margin);
        apply_world_overlays(global.as_ref(), &world.overlay_regions, unit)
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    fn apply(&mut self, mut session: Session, world: &WorldConfig, outcome: Outcome) {
        match outcome {
            Outcome::Close => {
                debug!(user = %session.user_id, state = ?session.state, "session closed");
                self.env.surface.close(session.user_id);
            }
            Outcome::Redraw => self.redraw(session, world),
            Outcome::Goto(next) => {
                if next.kind() == StateKind::Confirm && session.state.kind() != StateKind::Confirm {
                    session.scratch.return_to = Some(session.state);
                }
                if next.kind() == StateKind::Menu {
                    session.scratch = Scratch::default();
                }
                debug!(user = %session.user_id, from = ?session.state, to = ?next, "transition");
                session.state = next;
                self.redraw(session, world);
            }
        }
    }

    /// Draw the session's state and hold input until the redraw lands.
    fn redraw(&mut self, mut session: Session, world: &WorldConfig) {
        session.transitioning = true;
        self.env
            .surface
            .show(session.user_id, world, session.state, &session.scratch);
        self.scheduler.schedule(Task::RedrawDone(session.user_id), 1);
        self.sessions.begin(session);
    }

    fn fail(&mut self, session: Session, world: &WorldConfig, err: FlowError) -> Dispatch {
        let user = session.user_id;
        match err {
            FlowError::Validation(invalid) => {
                debug!(user = %user, state = ?session.state, error = %invalid, "re-prompting");
                self.env.surface.notify(user, Notice::Invalid(invalid));
                self.redraw(session, world);
            }
            FlowError::InsufficientBalance { needed, balance } => {
                debug!(user = %user, needed, balance, "insufficient balance");
                self.env
                    .surface
                    .notify(user, Notice::InsufficientBalance { needed, balance });
                self.sessions.begin(session);
            }
            FlowError::Denied(denial) => {
                debug!(user = %user, ?denial, "denied");
                self.env.surface.notify(user, Notice::Denied(denial));
                self.sessions.begin(session);
            }
            FlowError::StaleReference(world_id) => {
                self.stale(user, world_id);
                return Dispatch::StaleReference;
            }
            FlowError::Store(store) => {
                warn!(user = %user, world = %world.id, error = %store, "store failure");
                self.env.surface.notify(user, Notice::StoreFailure);
                self.sessions.begin(session);
            }
        }
        Dispatch::Rejected
    }

    /// The edited world is gone: end the session and fall back to the root view.
    fn stale(&mut self, user: UserId, world_id: WorldId) {
        warn!(user = %user, world = %world_id, "session references a missing world");
        self.sessions.end(user);
        self.env.surface.notify(user, Notice::WorldGone);
        self.env.surface.show_root(user);
    }

    fn expire_idle(&mut self) {
        let Some(cutoff) = self.now().checked_sub(self.config.session_idle_ticks) else {
            return;
        };
        for user in self.sessions.idle_since(cutoff) {
            self.sessions.end(user);
            self.env.host.clear_preview(user);
            self.env.surface.close(user);
            info!(user = %user, "idle session expired");
        }
    }
}
