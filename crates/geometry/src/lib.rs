//! Realmkeep Geometry
//!
//! Pure territory math for player-owned worlds:
//! - Border expansion (symmetric or toward one diagonal)
//! - Heading snapping for placement signals
//! - Expansion pricing and reset refunds
//! - Overlay painting over chunk-sized spatial units
//!
//! Nothing in this crate performs I/O, reads clocks, or holds shared state.
//! The orchestration core owns all of that and calls in here with plain values.

#![deny(unsafe_code)]

pub mod expansion;
pub mod overlay;

pub use expansion::{
    Border, Cardinal, CostSchedule, Direction, ExpansionLevel, ResetOutcome, expand, reset,
};
pub use overlay::{
    CHUNK_SIZE, CellBounds, ChunkGrid, GlobalOverlay, OverlayRegion, OverlayTarget,
    apply_global, apply_overlay, apply_world_overlays, repaint,
};

use serde::{Deserialize, Serialize};

// ============================================================================
// Coordinates
// ============================================================================

/// A point on the horizontal plane, in block units.
///
/// `x` grows east, `z` grows south.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub z: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, z: 0.0 };

    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Round both axes to the nearest integer coordinate.
    pub fn rounded(self) -> Self {
        Self {
            x: self.x.round(),
            z: self.z.round(),
        }
    }
}

/// A single grid column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The cell containing a continuous position.
    pub fn containing(x: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            z: z.floor() as i32,
        }
    }

    /// Chunk coordinates of the chunk this cell belongs to.
    pub fn chunk(self) -> (i32, i32) {
        (self.x.div_euclid(CHUNK_SIZE), self.z.div_euclid(CHUNK_SIZE))
    }
}
