//! Live world instances.
//!
//! Creating, loading, and unloading the spatial data behind a world belongs
//! to the host. The core only needs to show per-user previews, push a
//! committed border, and visit the units that are currently loaded.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use realmkeep_geometry::{Border, ChunkGrid, OverlayRegion, OverlayTarget};

use crate::{UserId, WorldId};

/// Visual-only state shown to one user before a change is committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Border(Border),
    Global { label: String, border: Border },
    Region(OverlayRegion),
}

pub trait WorldHost {
    /// Show a preview to `user` only. Replaces any previous preview.
    fn show_preview(&mut self, user: UserId, world: WorldId, preview: Preview);

    fn clear_preview(&mut self, user: UserId);

    /// Push a committed border to the live world instance.
    fn apply_border(&mut self, world: WorldId, border: Border);

    /// Visit every currently loaded unit of `world`.
    fn for_each_loaded_unit(&mut self, world: WorldId, visit: &mut dyn FnMut(&mut dyn OverlayTarget));

    /// Drop the spatial data of a deleted world.
    fn delete_world(&mut self, world: WorldId);
}

#[derive(Debug, Default)]
struct HostState {
    previews: HashMap<UserId, (WorldId, Preview)>,
    borders: HashMap<WorldId, Border>,
    units: HashMap<WorldId, BTreeMap<(i32, i32), ChunkGrid>>,
    deleted: Vec<WorldId>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryWorldHost {
    inner: Rc<RefCell<HostState>>,
}

impl MemoryWorldHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fresh, unpainted chunk as loaded.
    pub fn load_unit(&self, world: WorldId, chunk_x: i32, chunk_z: i32) {
        self.insert_unit(world, ChunkGrid::new(chunk_x, chunk_z));
    }

    /// Mark an already painted chunk as loaded, replacing any at its coordinates.
    pub fn insert_unit(&self, world: WorldId, unit: ChunkGrid) {
        self.inner
            .borrow_mut()
            .units
            .entry(world)
            .or_default()
            .insert(unit.coords(), unit);
    }

    pub fn unit(&self, world: WorldId, chunk_x: i32, chunk_z: i32) -> Option<ChunkGrid> {
        self.inner
            .borrow()
            .units
            .get(&world)
            .and_then(|units| units.get(&(chunk_x, chunk_z)))
            .cloned()
    }

    pub fn preview(&self, user: UserId) -> Option<(WorldId, Preview)> {
        self.inner.borrow().previews.get(&user).cloned()
    }

    pub fn border(&self, world: WorldId) -> Option<Border> {
        self.inner.borrow().borders.get(&world).copied()
    }

    pub fn is_deleted(&self, world: WorldId) -> bool {
        self.inner.borrow().deleted.contains(&world)
    }
}

impl WorldHost for MemoryWorldHost {
    fn show_preview(&mut self, user: UserId, world: WorldId, preview: Preview) {
        self.inner.borrow_mut().previews.insert(user, (world, preview));
    }

    fn clear_preview(&mut self, user: UserId) {
        self.inner.borrow_mut().previews.remove(&user);
    }

    fn apply_border(&mut self, world: WorldId, border: Border) {
        self.inner.borrow_mut().borders.insert(world, border);
    }

    fn for_each_loaded_unit(&mut self, world: WorldId, visit: &mut dyn FnMut(&mut dyn OverlayTarget)) {
        let mut state = self.inner.borrow_mut();
        if let Some(units) = state.units.get_mut(&world) {
            for unit in units.values_mut() {
                visit(unit);
            }
        }
    }

    fn delete_world(&mut self, world: WorldId) {
        let mut state = self.inner.borrow_mut();
        state.units.remove(&world);
        state.borders.remove(&world);
        state.deleted.push(world);
    }
}

#[cfg(test)]
mod tests {
    use realmkeep_geometry::{Cell, Point, apply_overlay};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_visit_loaded_units() {
        let mut host = MemoryWorldHost::new();
        let world = Uuid::new_v4();
        host.load_unit(world, 0, 0);
        host.load_unit(world, 1, 0);

        let region = OverlayRegion::new(Cell::new(16, 0), 3, "ice");
        let mut visited = 0;
        host.for_each_loaded_unit(world, &mut |unit: &mut dyn OverlayTarget| {
            visited += 1;
            apply_overlay(&region, unit);
        });

        assert_eq!(visited, 2);
        let east = host.unit(world, 1, 0).unwrap();
        assert_eq!(east.label(Cell::new(16, 0)), Some("ice"));
        let west = host.unit(world, 0, 0).unwrap();
        assert_eq!(west.label(Cell::new(15, 0)), Some("ice"));
    }

    #[test]
    fn test_preview_replaced_and_cleared() {
        let mut host = MemoryWorldHost::new();
        let (user, world) = (Uuid::new_v4(), Uuid::new_v4());
        host.show_preview(user, world, Preview::Border(Border::new(Point::ORIGIN, 10.0)));
        host.show_preview(user, world, Preview::Border(Border::new(Point::ORIGIN, 20.0)));
        assert_eq!(
            host.preview(user),
            Some((world, Preview::Border(Border::new(Point::ORIGIN, 20.0))))
        );
        host.clear_preview(user);
        assert!(host.preview(user).is_none());
    }
}
