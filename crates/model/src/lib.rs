//! Realmkeep Model
//!
//! Shared record types and the narrow interfaces the orchestration core uses
//! to reach its collaborators:
//! - `WorldStore` / `UserStatsStore`: durable records
//! - `CostLedger`: per-user point balance
//! - `WorldHost`: live world instances, previews, loaded spatial units
//! - `Directory`: player name resolution and presence
//!
//! Each interface ships with an in-memory implementation. In-memory handles
//! are cheap clones sharing one table, so a host (or a test) can keep a handle
//! while the core owns another. They are meant for the single main loop and
//! are deliberately not `Send`.

#![deny(unsafe_code)]

pub mod directory;
pub mod host;
pub mod ledger;
pub mod store;
pub mod world;

pub use directory::{Directory, MemoryDirectory};
pub use host::{MemoryWorldHost, Preview, WorldHost};
pub use ledger::{CostLedger, MemoryLedger, NoLedger};
pub use store::{MemoryUserStore, MemoryWorldStore, StoreError, UserStatsStore, WorldStore};
pub use world::{PublishLevel, SpawnKind, SpawnPoint, UserStats, WorldConfig, WorldFlag, WorldFlags};

pub use realmkeep_geometry::{Border, Cell, ExpansionLevel, OverlayRegion, Point};

// ============================================================================
// Type Aliases
// ============================================================================

/// Identity of a player.
pub type UserId = uuid::Uuid;

/// Identity of a world record.
pub type WorldId = uuid::Uuid;

/// One step of the main loop's tick clock.
pub type Tick = u64;
