//! World and user records.

use std::collections::BTreeSet;

use realmkeep_geometry::{Border, Cardinal, ExpansionLevel, GlobalOverlay, OverlayRegion};
use serde::{Deserialize, Serialize};

use crate::{Tick, UserId, WorldId};

/// Who may enter a world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishLevel {
    #[default]
    Private,
    Members,
    Public,
}

impl PublishLevel {
    /// Next level in the menu cycle.
    pub fn next(self) -> Self {
        match self {
            PublishLevel::Private => PublishLevel::Members,
            PublishLevel::Members => PublishLevel::Public,
            PublishLevel::Public => PublishLevel::Private,
        }
    }
}

/// Toggleable world rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldFlag {
    Pvp,
    MobSpawning,
    FireSpread,
}

impl WorldFlag {
    /// Parse a menu item id.
    pub fn from_item(item: &str) -> Option<Self> {
        match item {
            "pvp" => Some(WorldFlag::Pvp),
            "mob_spawning" => Some(WorldFlag::MobSpawning),
            "fire_spread" => Some(WorldFlag::FireSpread),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldFlags {
    pub pvp: bool,
    pub mob_spawning: bool,
    pub fire_spread: bool,
}

impl Default for WorldFlags {
    fn default() -> Self {
        Self {
            pvp: false,
            mob_spawning: true,
            fire_spread: false,
        }
    }
}

impl WorldFlags {
    /// Flip one flag and return its new value.
    pub fn toggle(&mut self, flag: WorldFlag) -> bool {
        let slot = match flag {
            WorldFlag::Pvp => &mut self.pvp,
            WorldFlag::MobSpawning => &mut self.mob_spawning,
            WorldFlag::FireSpread => &mut self.fire_spread,
        };
        *slot = !*slot;
        *slot
    }
}

/// Which audience a spawn point serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    Member,
    Visitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub facing: Cardinal,
}

/// Durable configuration of one player-owned world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub id: WorldId,
    pub name: String,
    pub description: String,
    pub owner: UserId,
    pub members: BTreeSet<UserId>,
    pub banned: BTreeSet<UserId>,
    pub publish_level: PublishLevel,
    pub expansion_level: ExpansionLevel,
    pub border: Border,
    /// Sum of every expansion price paid since the last reset.
    pub total_expansion_cost: u64,
    pub global_overlay: Option<String>,
    pub overlay_regions: Vec<OverlayRegion>,
    pub flags: WorldFlags,
    pub announcement: Vec<String>,
    pub tags: BTreeSet<String>,
    pub member_spawn: Option<SpawnPoint>,
    pub visitor_spawn: Option<SpawnPoint>,
    pub created_at: Tick,
    pub expires_at: Option<Tick>,
}

impl WorldConfig {
    pub fn new(id: WorldId, name: impl Into<String>, owner: UserId, border: Border, now: Tick) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            owner,
            members: BTreeSet::new(),
            banned: BTreeSet::new(),
            publish_level: PublishLevel::default(),
            expansion_level: ExpansionLevel::INITIAL,
            border,
            total_expansion_cost: 0,
            global_overlay: None,
            overlay_regions: Vec::new(),
            flags: WorldFlags::default(),
            announcement: Vec::new(),
            tags: BTreeSet::new(),
            member_spawn: None,
            visitor_spawn: None,
            created_at: now,
            expires_at: None,
        }
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Owner or member.
    pub fn is_member(&self, user: UserId) -> bool {
        self.is_owner(user) || self.members.contains(&user)
    }

    /// Add a member, lifting any ban. Returns false if already a member.
    pub fn add_member(&mut self, user: UserId) -> bool {
        if self.is_member(user) {
            return false;
        }
        self.banned.remove(&user);
        self.members.insert(user)
    }

    pub fn remove_member(&mut self, user: UserId) -> bool {
        self.members.remove(&user)
    }

    /// Ban a visitor; a banned member loses membership.
    pub fn ban(&mut self, user: UserId) -> bool {
        self.members.remove(&user);
        self.banned.insert(user)
    }

    pub fn unban(&mut self, user: UserId) -> bool {
        self.banned.remove(&user)
    }

    /// Hand the world to a member; the old owner stays on as a member.
    pub fn transfer_to(&mut self, new_owner: UserId) {
        let previous = std::mem::replace(&mut self.owner, new_owner);
        self.members.remove(&new_owner);
        self.members.insert(previous);
    }

    /// Set the global overlay. A global overlay supersedes every partial one.
    pub fn set_global_overlay(&mut self, label: impl Into<String>) {
        self.global_overlay = Some(label.into());
        self.overlay_regions.clear();
    }

    pub fn add_overlay_region(&mut self, region: OverlayRegion) {
        self.overlay_regions.push(region);
    }

    /// Global overlay bounded by the current border plus `margin`.
    pub fn global_overlay(&self, margin: i32) -> Option<GlobalOverlay<'_>> {
        self.global_overlay.as_deref().map(|label| GlobalOverlay {
            label,
            border: self.border,
            margin,
        })
    }

    /// Move the expiry to `candidate` only if that is strictly later.
    pub fn refresh_expiry(&mut self, candidate: Tick) -> bool {
        match self.expires_at {
            Some(current) if current >= candidate => false,
            _ => {
                self.expires_at = Some(candidate);
                true
            }
        }
    }

    pub fn spawn_mut(&mut self, kind: SpawnKind) -> &mut Option<SpawnPoint> {
        match kind {
            SpawnKind::Member => &mut self.member_spawn,
            SpawnKind::Visitor => &mut self.visitor_spawn,
        }
    }
}

/// Per-player bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: UserId,
    pub name: String,
    pub owned_worlds: BTreeSet<WorldId>,
    pub last_world: Option<WorldId>,
}

impl UserStats {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            owned_worlds: BTreeSet::new(),
            last_world: None,
        }
    }
}
