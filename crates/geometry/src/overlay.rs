//! Overlay painting over chunk-sized spatial units.
//!
//! Overlays are metadata, not terrain: whenever a unit becomes active again
//! the host asks for the overlays to be re-applied. Precedence is fixed: a
//! partial region beats the global overlay, and a later partial beats an
//! earlier one. Partial regions are circular (`dx² + dz² <= r²`).
//!
//! Every paint is a plain label assignment, so re-running any application
//! against the same unit leaves it cell-for-cell unchanged.

use serde::{Deserialize, Serialize};

use crate::{Border, Cell};

/// Side length of a chunk, in cells.
pub const CHUNK_SIZE: i32 = 16;

// ============================================================================
// Regions
// ============================================================================

/// Inclusive axis-aligned cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBounds {
    pub min: Cell,
    pub max: Cell,
}

impl CellBounds {
    pub const fn new(min: Cell, max: Cell) -> Self {
        Self { min, max }
    }

    /// Overlapping rectangle, if any.
    pub fn intersection(&self, other: &CellBounds) -> Option<CellBounds> {
        let min = Cell::new(self.min.x.max(other.min.x), self.min.z.max(other.min.z));
        let max = Cell::new(self.max.x.min(other.max.x), self.max.z.min(other.max.z));
        (min.x <= max.x && min.z <= max.z).then_some(CellBounds { min, max })
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (self.min.x..=self.max.x).contains(&cell.x) && (self.min.z..=self.max.z).contains(&cell.z)
    }

    /// Cells in row-major order (z outer, x inner).
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.min.z..=self.max.z)
            .flat_map(move |z| (self.min.x..=self.max.x).map(move |x| Cell::new(x, z)))
    }
}

/// A labeled circular area painted on top of the global overlay.
///
/// Regions are append-only on a world: never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRegion {
    pub center: Cell,
    pub radius: i32,
    pub label: String,
}

impl OverlayRegion {
    pub fn new(center: Cell, radius: i32, label: impl Into<String>) -> Self {
        Self {
            center,
            radius,
            label: label.into(),
        }
    }

    /// Euclidean coverage test.
    pub fn covers(&self, cell: Cell) -> bool {
        let dx = i64::from(cell.x) - i64::from(self.center.x);
        let dz = i64::from(cell.z) - i64::from(self.center.z);
        let r = i64::from(self.radius);
        dx * dx + dz * dz <= r * r
    }

    /// Bounding square of the circle.
    pub fn bounds(&self) -> CellBounds {
        let r = self.radius.max(0);
        CellBounds::new(
            Cell::new(self.center.x.saturating_sub(r), self.center.z.saturating_sub(r)),
            Cell::new(self.center.x.saturating_add(r), self.center.z.saturating_add(r)),
        )
    }
}

/// Whole-territory overlay: the border plus a fixed margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalOverlay<'a> {
    pub label: &'a str,
    pub border: Border,
    pub margin: i32,
}

impl GlobalOverlay<'_> {
    /// Cells touched by the border, grown by `margin` on every side.
    pub fn bounds(&self) -> CellBounds {
        let (min, max) = (self.border.min(), self.border.max());
        CellBounds::new(
            Cell::new(
                (min.x.floor() as i32).saturating_sub(self.margin),
                (min.z.floor() as i32).saturating_sub(self.margin),
            ),
            Cell::new(
                (max.x.ceil() as i32 - 1).saturating_add(self.margin),
                (max.z.ceil() as i32 - 1).saturating_add(self.margin),
            ),
        )
    }
}

// ============================================================================
// Targets
// ============================================================================

/// A loaded spatial sub-unit that overlays can be painted onto.
pub trait OverlayTarget {
    /// Cells this unit spans.
    fn bounds(&self) -> CellBounds;

    /// Set the label of one cell. Returns whether the stored label changed.
    fn paint(&mut self, cell: Cell, label: &str) -> bool;

    /// Drop every painted label.
    fn clear(&mut self);
}

/// In-memory 16×16 chunk of overlay labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkGrid {
    chunk_x: i32,
    chunk_z: i32,
    labels: Vec<Option<String>>,
}

impl ChunkGrid {
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        Self {
            chunk_x,
            chunk_z,
            labels: vec![None; (CHUNK_SIZE * CHUNK_SIZE) as usize],
        }
    }

    pub fn coords(&self) -> (i32, i32) {
        (self.chunk_x, self.chunk_z)
    }

    pub fn label(&self, cell: Cell) -> Option<&str> {
        self.index(cell)
            .and_then(|i| self.labels[i].as_deref())
    }

    /// Number of cells carrying `label`.
    pub fn count(&self, label: &str) -> usize {
        self.labels
            .iter()
            .filter(|l| l.as_deref() == Some(label))
            .count()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let lx = cell.x - self.chunk_x * CHUNK_SIZE;
        let lz = cell.z - self.chunk_z * CHUNK_SIZE;
        if (0..CHUNK_SIZE).contains(&lx) && (0..CHUNK_SIZE).contains(&lz) {
            Some((lz * CHUNK_SIZE + lx) as usize)
        } else {
            None
        }
    }
}

impl OverlayTarget for ChunkGrid {
    fn bounds(&self) -> CellBounds {
        let min = Cell::new(self.chunk_x * CHUNK_SIZE, self.chunk_z * CHUNK_SIZE);
        CellBounds::new(
            min,
            Cell::new(min.x + CHUNK_SIZE - 1, min.z + CHUNK_SIZE - 1),
        )
    }

    fn paint(&mut self, cell: Cell, label: &str) -> bool {
        let Some(i) = self.index(cell) else {
            return false;
        };
        if self.labels[i].as_deref() == Some(label) {
            return false;
        }
        self.labels[i] = Some(label.to_string());
        true
    }

    fn clear(&mut self) {
        self.labels.iter_mut().for_each(|l| *l = None);
    }
}

// ============================================================================
// Application
// ============================================================================

/// Paint one partial region onto a unit.
///
/// Returns the number of cells whose label changed. The bounding-box check
/// only skips units the circle cannot reach.
pub fn apply_overlay<T: OverlayTarget + ?Sized>(region: &OverlayRegion, unit: &mut T) -> usize {
    if region.radius < 0 {
        return 0;
    }
    let Some(area) = unit.bounds().intersection(&region.bounds()) else {
        return 0;
    };
    area.cells()
        .filter(|&cell| region.covers(cell))
        .filter(|&cell| unit.paint(cell, &region.label))
        .count()
}

/// Paint the global overlay onto a unit.
pub fn apply_global<T: OverlayTarget + ?Sized>(global: &GlobalOverlay<'_>, unit: &mut T) -> usize {
    let Some(area) = unit.bounds().intersection(&global.bounds()) else {
        return 0;
    };
    area.cells()
        .filter(|&cell| unit.paint(cell, global.label))
        .count()
}

/// Apply every overlay of a world to a unit.
///
/// Each cell ends up with the label of the last partial region covering it,
/// otherwise the global label if the cell lies within the global bounds.
/// Every cell is painted at most once, so re-applying to an already painted
/// unit changes nothing and returns 0.
pub fn apply_world_overlays<T: OverlayTarget + ?Sized>(
    global: Option<&GlobalOverlay<'_>>,
    partials: &[OverlayRegion],
    unit: &mut T,
) -> usize {
    let bounds = unit.bounds();
    let global_area = global.and_then(|g| {
        bounds
            .intersection(&g.bounds())
            .map(|area| (g.label, area))
    });
    let reaching: Vec<&OverlayRegion> = partials
        .iter()
        .filter(|r| r.radius >= 0 && bounds.intersection(&r.bounds()).is_some())
        .collect();
    if global_area.is_none() && reaching.is_empty() {
        return 0;
    }

    let mut changed = 0;
    for cell in bounds.cells() {
        let label = reaching
            .iter()
            .rev()
            .find(|r| r.covers(cell))
            .map(|r| r.label.as_str())
            .or_else(|| {
                global_area
                    .filter(|(_, area)| area.contains(cell))
                    .map(|(label, _)| label)
            });
        if let Some(label) = label {
            if unit.paint(cell, label) {
                changed += 1;
            }
        }
    }
    changed
}

/// Clear a unit and paint it from scratch.
///
/// Used when overlays were removed or superseded, since painting alone
/// cannot take a label away.
pub fn repaint<T: OverlayTarget + ?Sized>(
    global: Option<&GlobalOverlay<'_>>,
    partials: &[OverlayRegion],
    unit: &mut T,
) -> usize {
    unit.clear();
    apply_world_overlays(global, partials, unit)
}
