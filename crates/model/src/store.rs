//! Record stores.
//!
//! The persistent store is an external collaborator; these traits are the
//! whole surface the core relies on.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::{UserId, UserStats, WorldConfig, WorldId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("name {0:?} is already used by another world")]
    NameTaken(String),
    #[error("no record with id {0}")]
    NotFound(uuid::Uuid),
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Durable `WorldConfig` records, indexed by id and case-insensitive name.
pub trait WorldStore {
    fn find_by_id(&self, id: WorldId) -> Option<WorldConfig>;
    fn find_by_name(&self, name: &str) -> Option<WorldConfig>;
    fn save(&mut self, world: &WorldConfig) -> Result<(), StoreError>;
    fn delete(&mut self, id: WorldId) -> Result<(), StoreError>;
    fn list_all(&self) -> Vec<WorldConfig>;
}

/// Durable `UserStats` records.
pub trait UserStatsStore {
    fn find_by_id(&self, id: UserId) -> Option<UserStats>;
    fn find_by_name(&self, name: &str) -> Option<UserStats>;
    fn save(&mut self, stats: &UserStats) -> Result<(), StoreError>;
    fn delete(&mut self, id: UserId) -> Result<(), StoreError>;
    fn list_all(&self) -> Vec<UserStats>;
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// In-memory worlds
// ============================================================================

#[derive(Debug, Default)]
struct WorldTable {
    by_id: HashMap<WorldId, WorldConfig>,
    by_name: HashMap<String, WorldId>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryWorldStore {
    inner: Rc<RefCell<WorldTable>>,
}

impl MemoryWorldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WorldStore for MemoryWorldStore {
    fn find_by_id(&self, id: WorldId) -> Option<WorldConfig> {
        self.inner.borrow().by_id.get(&id).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<WorldConfig> {
        let table = self.inner.borrow();
        let id = table.by_name.get(&name_key(name))?;
        table.by_id.get(id).cloned()
    }

    fn save(&mut self, world: &WorldConfig) -> Result<(), StoreError> {
        let mut table = self.inner.borrow_mut();
        let key = name_key(&world.name);
        if let Some(&holder) = table.by_name.get(&key) {
            if holder != world.id {
                return Err(StoreError::NameTaken(world.name.clone()));
            }
        }
        let old_key = table.by_id.get(&world.id).map(|w| name_key(&w.name));
        if let Some(old_key) = old_key {
            table.by_name.remove(&old_key);
        }
        table.by_name.insert(key, world.id);
        table.by_id.insert(world.id, world.clone());
        Ok(())
    }

    fn delete(&mut self, id: WorldId) -> Result<(), StoreError> {
        let mut table = self.inner.borrow_mut();
        let world = table.by_id.remove(&id).ok_or(StoreError::NotFound(id))?;
        table.by_name.remove(&name_key(&world.name));
        Ok(())
    }

    fn list_all(&self) -> Vec<WorldConfig> {
        let mut worlds: Vec<_> = self.inner.borrow().by_id.values().cloned().collect();
        worlds.sort_by(|a, b| a.name.cmp(&b.name));
        worlds
    }
}

// ============================================================================
// In-memory user stats
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Rc<RefCell<HashMap<UserId, UserStats>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStatsStore for MemoryUserStore {
    fn find_by_id(&self, id: UserId) -> Option<UserStats> {
        self.inner.borrow().get(&id).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<UserStats> {
        let key = name_key(name);
        self.inner
            .borrow()
            .values()
            .find(|s| name_key(&s.name) == key)
            .cloned()
    }

    fn save(&mut self, stats: &UserStats) -> Result<(), StoreError> {
        self.inner.borrow_mut().insert(stats.user_id, stats.clone());
        Ok(())
    }

    fn delete(&mut self, id: UserId) -> Result<(), StoreError> {
        self.inner
            .borrow_mut()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn list_all(&self) -> Vec<UserStats> {
        self.inner.borrow().values().cloned().collect()
    }
}
