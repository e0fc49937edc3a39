//! Test harness: a `Core` wired to in-memory collaborators.
//!
//! Every input helper dispatches one event and then runs one tick, so the
//! redraw that follows an accepted input has landed before the next call.
//! Input timestamps advance by a second per event, well past the cooldown.

use realmkeep_geometry::ChunkGrid;
use realmkeep_model::{
    CostLedger, MemoryDirectory, MemoryLedger, MemoryUserStore, MemoryWorldHost,
    MemoryWorldStore, NoLedger, UserId, UserStats, UserStatsStore, WorldConfig, WorldId,
    WorldStore,
};
use uuid::Uuid;

use crate::event::{InputEvent, Placement};
use crate::surface::RecordingSurface;
use crate::{Collaborators, ConfigError, Core, CoreConfig, Dispatch, MenuState};

pub const STARTING_BALANCE: u64 = 10_000;

pub struct Harness {
    pub core: Core,
    pub worlds: MemoryWorldStore,
    pub users: MemoryUserStore,
    pub ledger: MemoryLedger,
    pub host: MemoryWorldHost,
    pub directory: MemoryDirectory,
    pub surface: RecordingSurface,
    /// Owner of `world_id`, online with a stats record.
    pub owner: UserId,
    /// The world "Harbor", created at the initial border.
    pub world_id: WorldId,
    clock_ms: u64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self::try_with_config(config).unwrap()
    }

    pub fn try_with_config(config: CoreConfig) -> Result<Self, ConfigError> {
        Self::build(config, true)
    }

    /// Every cost is free: the core sees no ledger at all.
    pub fn without_ledger() -> Self {
        Self::build(CoreConfig::default(), false).unwrap()
    }

    fn build(config: CoreConfig, with_ledger: bool) -> Result<Self, ConfigError> {
        let worlds = MemoryWorldStore::new();
        let users = MemoryUserStore::new();
        let ledger = MemoryLedger::new();
        let host = MemoryWorldHost::new();
        let directory = MemoryDirectory::new();
        let surface = RecordingSurface::new();

        let env = Collaborators {
            worlds: Box::new(worlds.clone()),
            users: Box::new(users.clone()),
            ledger: if with_ledger {
                Box::new(ledger.clone())
            } else {
                Box::new(NoLedger)
            },
            host: Box::new(host.clone()),
            directory: Box::new(directory.clone()),
            surface: Box::new(surface.clone()),
        };
        let core = Core::new(config, env)?;

        let mut h = Self {
            core,
            worlds,
            users,
            ledger,
            host,
            directory,
            surface,
            owner: Uuid::nil(),
            world_id: Uuid::nil(),
            clock_ms: 0,
        };
        let owner = h.join("Owner");
        h.track_stats(owner, "Owner");
        h.owner = owner;
        h.world_id = h.create_world(owner, "Harbor");
        Ok(h)
    }

    // ------------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------------

    /// Bring a player online with the starting balance.
    pub fn join(&mut self, name: &str) -> UserId {
        let user = Uuid::new_v4();
        self.directory.join(name, user);
        self.ledger.set_balance(user, STARTING_BALANCE);
        user
    }

    /// Bring a player online and make them a member of the harness world.
    pub fn add_member(&mut self, name: &str) -> UserId {
        let user = self.join(name);
        let mut world = self.world();
        world.add_member(user);
        self.store(&world);
        user
    }

    pub fn track_stats(&mut self, user: UserId, name: &str) {
        self.users.clone().save(&UserStats::new(user, name)).unwrap();
    }

    pub fn stats(&self, user: UserId) -> UserStats {
        self.users.find_by_id(user).unwrap()
    }

    pub fn balance(&self, user: UserId) -> u64 {
        self.ledger.balance(user)
    }

    // ------------------------------------------------------------------------
    // Worlds
    // ------------------------------------------------------------------------

    pub fn create_world(&mut self, owner: UserId, name: &str) -> WorldId {
        self.core.create_world(owner, name).unwrap()
    }

    pub fn world(&self) -> WorldConfig {
        self.worlds.find_by_id(self.world_id).unwrap()
    }

    /// Overwrite a stored world directly, bypassing every handler.
    pub fn store(&mut self, world: &WorldConfig) {
        self.worlds.clone().save(world).unwrap();
    }

    /// Delete the harness world behind the core's back.
    pub fn remove_world(&mut self) {
        self.worlds.clone().delete(self.world_id).unwrap();
    }

    /// Load a chunk of the harness world the way a host would.
    pub fn load_unit(&mut self, chunk_x: i32, chunk_z: i32) {
        let mut unit = ChunkGrid::new(chunk_x, chunk_z);
        self.core.on_unit_loaded(self.world_id, &mut unit);
        self.host.insert_unit(self.world_id, unit);
    }

    pub fn config(&self) -> &CoreConfig {
        self.core.config()
    }

    // ------------------------------------------------------------------------
    // Sessions and input
    // ------------------------------------------------------------------------

    pub fn open(&mut self, user: UserId) {
        self.core.open(user, self.world_id).unwrap();
        self.core.tick();
    }

    pub fn state(&self, user: UserId) -> Option<MenuState> {
        self.core.session(user).map(|s| s.state)
    }

    pub fn click(&mut self, user: UserId, item: &str) -> Dispatch {
        let at = self.next_ms();
        self.dispatch(InputEvent::menu(user, item, at))
    }

    pub fn click_with(&mut self, user: UserId, item: &str, args: &[(&str, &str)]) -> Dispatch {
        let at = self.next_ms();
        self.dispatch(InputEvent::menu_with(user, item, args, at))
    }

    pub fn say(&mut self, user: UserId, line: &str) -> Dispatch {
        let at = self.next_ms();
        self.dispatch(InputEvent::text(user, line, at))
    }

    pub fn submit(&mut self, user: UserId, form: &str, values: &[(&str, &str)]) -> Dispatch {
        let at = self.next_ms();
        self.dispatch(InputEvent::form(user, form, values, at))
    }

    pub fn place(&mut self, user: UserId, x: f64, z: f64, yaw: f32) -> Dispatch {
        let at = self.next_ms();
        let placement = Placement { x, y: 64.0, z, yaw };
        self.dispatch(InputEvent::placement(user, placement, at))
    }

    /// Open a session and confirm a symmetric expansion, leaving it pending.
    pub fn stage_symmetric_expansion(&mut self, user: UserId) {
        self.open(user);
        self.click(user, "expand");
        self.click(user, "expand");
        self.click(user, "confirm");
    }

    pub fn settle(&mut self) {
        self.core.tick();
    }

    pub fn ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.core.tick();
        }
    }

    fn next_ms(&mut self) -> u64 {
        self.clock_ms += 1_000;
        self.clock_ms
    }

    fn dispatch(&mut self, event: InputEvent) -> Dispatch {
        let result = self.core.handle(event);
        self.core.tick();
        result
    }
}
