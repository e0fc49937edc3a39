//! Border expansion math.
//!
//! A world's territory is a square border. Each expansion doubles its side
//! length. A symmetric expansion keeps the center; a directional expansion
//! shifts the center by half the old size along both axes so the old square
//! tiles exactly one quadrant of the new one.

use serde::{Deserialize, Serialize};

use crate::Point;

// ============================================================================
// Headings
// ============================================================================

/// One of the four diagonal directions a border can grow toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Sign of the center shift along (x, z). North is -z, east is +x.
    pub const fn signs(self) -> (f64, f64) {
        match self {
            Direction::NorthEast => (1.0, -1.0),
            Direction::NorthWest => (-1.0, -1.0),
            Direction::SouthEast => (1.0, 1.0),
            Direction::SouthWest => (-1.0, 1.0),
        }
    }

    /// Snap a look yaw to the diagonal quadrant it points into.
    ///
    /// Yaw is in degrees: 0 faces south (+z), 90 west, 180 north, 270 east.
    pub fn from_yaw(yaw: f32) -> Self {
        let yaw = f64::from(yaw).rem_euclid(360.0);
        match ((yaw / 90.0) as u8) % 4 {
            0 => Direction::SouthWest,
            1 => Direction::NorthWest,
            2 => Direction::NorthEast,
            _ => Direction::SouthEast,
        }
    }
}

/// One of the four cardinal facings, used for spawn orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinal {
    #[default]
    South,
    West,
    North,
    East,
}

impl Cardinal {
    /// Snap a yaw to the nearest cardinal facing.
    pub fn from_yaw(yaw: f32) -> Self {
        let yaw = f64::from(yaw).rem_euclid(360.0);
        match (((yaw + 45.0) / 90.0) as u8) % 4 {
            0 => Cardinal::South,
            1 => Cardinal::West,
            2 => Cardinal::North,
            _ => Cardinal::East,
        }
    }

    /// Canonical yaw for this facing.
    pub const fn yaw(self) -> f32 {
        match self {
            Cardinal::South => 0.0,
            Cardinal::West => 90.0,
            Cardinal::North => 180.0,
            Cardinal::East => 270.0,
        }
    }
}

// ============================================================================
// Border
// ============================================================================

/// Square territory border: a center and a side length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub center: Point,
    pub size: f64,
}

impl Border {
    pub const fn new(center: Point, size: f64) -> Self {
        Self { center, size }
    }

    pub fn half(&self) -> f64 {
        self.size / 2.0
    }

    /// North-west corner.
    pub fn min(&self) -> Point {
        Point::new(self.center.x - self.half(), self.center.z - self.half())
    }

    /// South-east corner.
    pub fn max(&self) -> Point {
        Point::new(self.center.x + self.half(), self.center.z + self.half())
    }

    /// Whether `other` lies entirely within this border (edges inclusive).
    pub fn contains_border(&self, other: &Border) -> bool {
        let (min, max) = (self.min(), self.max());
        let (omin, omax) = (other.min(), other.max());
        min.x <= omin.x && min.z <= omin.z && omax.x <= max.x && omax.z <= max.z
    }

    /// Whether a continuous position lies inside the border.
    ///
    /// The east and south edges are exclusive: a position on them belongs to
    /// the cell just outside.
    pub fn contains(&self, x: f64, z: f64) -> bool {
        let (min, max) = (self.min(), self.max());
        (min.x..max.x).contains(&x) && (min.z..max.z).contains(&z)
    }
}

/// Grow a border to its next level.
///
/// The size doubles. Without a direction the center is unchanged. With one,
/// the center moves by `size / 2` along each axis toward that diagonal and is
/// rounded to the nearest integer coordinate. For even integer sizes and
/// integer centers the old border is exactly one quadrant of the new one.
pub fn expand(current: Border, direction: Option<Direction>) -> Border {
    let size = current.size * 2.0;
    let center = match direction {
        None => current.center,
        Some(direction) => {
            let (sx, sz) = direction.signs();
            let shift = current.half();
            Point::new(current.center.x + sx * shift, current.center.z + sz * shift).rounded()
        }
    };
    Border { center, size }
}

// ============================================================================
// Levels and pricing
// ============================================================================

/// Expansion tier of a world. `Max` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionLevel {
    Level(u32),
    Max,
}

impl ExpansionLevel {
    pub const INITIAL: ExpansionLevel = ExpansionLevel::Level(0);

    /// The level after one more expansion, or `None` at `Max`.
    ///
    /// Reaching `max_level` yields the `Max` sentinel.
    pub fn next(self, max_level: Option<u32>) -> Option<ExpansionLevel> {
        match self {
            ExpansionLevel::Max => None,
            ExpansionLevel::Level(level) => {
                let next = level.saturating_add(1);
                if max_level.is_some_and(|max| next >= max) {
                    Some(ExpansionLevel::Max)
                } else {
                    Some(ExpansionLevel::Level(next))
                }
            }
        }
    }

    pub fn is_max(self) -> bool {
        matches!(self, ExpansionLevel::Max)
    }
}

/// Price list for expansions.
///
/// `per_level[n]` is the price of reaching level `n + 1`. Levels past the end
/// of the list fall back to `base_cost * multiplier^current_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSchedule {
    pub base_cost: u64,
    pub multiplier: f64,
    pub per_level: Vec<u64>,
}

impl Default for CostSchedule {
    fn default() -> Self {
        Self {
            base_cost: 100,
            multiplier: 2.0,
            per_level: Vec::new(),
        }
    }
}

impl CostSchedule {
    /// Price of growing from `current_level` to `current_level + 1`.
    pub fn cost_for_next(&self, current_level: u32) -> u64 {
        if let Some(&configured) = self.per_level.get(current_level as usize) {
            return configured;
        }
        let exponent = i32::try_from(current_level).unwrap_or(i32::MAX);
        let scaled = self.base_cost as f64 * self.multiplier.powi(exponent);
        if !scaled.is_finite() || scaled >= u64::MAX as f64 {
            u64::MAX
        } else {
            scaled.round().max(0.0) as u64
        }
    }

    /// Total price of the first `levels` expansions.
    pub fn total_cost(&self, levels: u32) -> u64 {
        (0..levels).fold(0u64, |acc, level| {
            acc.saturating_add(self.cost_for_next(level))
        })
    }
}

/// Result of resetting a world's expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResetOutcome {
    pub border: Border,
    pub level: ExpansionLevel,
    pub refund: u64,
}

/// Restore the initial border and compute the refund.
///
/// The refund is `floor(total_paid * refund_rate)`.
pub fn reset(initial: Border, total_paid: u64, refund_rate: f64) -> ResetOutcome {
    let refund = (total_paid as f64 * refund_rate.clamp(0.0, 1.0)).floor() as u64;
    ResetOutcome {
        border: initial,
        level: ExpansionLevel::INITIAL,
        refund,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    #[test]
    fn test_symmetric_expand_keeps_center() {
        let border = Border::new(Point::new(10.0, -20.0), 100.0);
        let grown = expand(border, None);
        assert_eq!(grown.size, 200.0);
        assert_eq!(grown.center, border.center);
    }

    #[test]
    fn test_directional_expand_shifts_center() {
        let border = Border::new(Point::ORIGIN, 100.0);

        let ne = expand(border, Some(Direction::NorthEast));
        assert_eq!(ne.center, Point::new(50.0, -50.0));
        assert_eq!(ne.size, 200.0);

        let sw = expand(border, Some(Direction::SouthWest));
        assert_eq!(sw.center, Point::new(-50.0, 50.0));
    }

    #[test]
    fn test_directional_expand_old_border_is_one_quadrant() {
        let border = Border::new(Point::new(4.0, 8.0), 64.0);
        let grown = expand(border, Some(Direction::SouthEast));

        // Old border's north-west corner coincides with the new one's.
        assert_eq!(grown.min(), border.min());
        assert!(grown.contains_border(&border));
    }

    #[test]
    fn test_border_contains_excludes_far_edges() {
        let border = Border::new(Point::ORIGIN, 16.0);
        assert!(border.contains(-8.0, -8.0));
        assert!(border.contains(7.99, 7.99));
        assert!(!border.contains(8.0, 0.0));
        assert!(!border.contains(0.0, 8.0));
        assert!(!border.contains(-8.01, 0.0));
    }

    #[test]
    fn test_direction_from_yaw_quadrants() {
        assert_eq!(Direction::from_yaw(45.0), Direction::SouthWest);
        assert_eq!(Direction::from_yaw(135.0), Direction::NorthWest);
        assert_eq!(Direction::from_yaw(225.0), Direction::NorthEast);
        assert_eq!(Direction::from_yaw(315.0), Direction::SouthEast);
        assert_eq!(Direction::from_yaw(-45.0), Direction::SouthEast);
        assert_eq!(Direction::from_yaw(720.0 + 100.0), Direction::NorthWest);
    }

    #[test]
    fn test_cardinal_from_yaw_nearest() {
        assert_eq!(Cardinal::from_yaw(10.0), Cardinal::South);
        assert_eq!(Cardinal::from_yaw(350.0), Cardinal::South);
        assert_eq!(Cardinal::from_yaw(80.0), Cardinal::West);
        assert_eq!(Cardinal::from_yaw(-170.0), Cardinal::North);
        assert_eq!(Cardinal::from_yaw(260.0), Cardinal::East);
    }

    #[test]
    fn test_level_next_reaches_max() {
        let level = ExpansionLevel::Level(2);
        assert_eq!(level.next(None), Some(ExpansionLevel::Level(3)));
        assert_eq!(level.next(Some(3)), Some(ExpansionLevel::Max));
        assert_eq!(ExpansionLevel::Max.next(Some(3)), None);
    }

    #[test]
    fn test_cost_schedule_configured_then_fallback() {
        let schedule = CostSchedule {
            base_cost: 100,
            multiplier: 3.0,
            per_level: vec![10, 20],
        };
        assert_eq!(schedule.cost_for_next(0), 10);
        assert_eq!(schedule.cost_for_next(1), 20);
        // Past the configured list: 100 * 3^2
        assert_eq!(schedule.cost_for_next(2), 900);
        assert_eq!(schedule.total_cost(3), 930);
    }

    #[test]
    fn test_cost_schedule_saturates() {
        let schedule = CostSchedule::default();
        assert_eq!(schedule.cost_for_next(200), u64::MAX);
        assert_eq!(schedule.total_cost(300), u64::MAX);
    }

    #[test]
    fn test_reset_refund_floors() {
        let initial = Border::new(Point::ORIGIN, 100.0);
        let outcome = reset(initial, 701, 0.5);
        assert_eq!(outcome.border, initial);
        assert_eq!(outcome.level, ExpansionLevel::INITIAL);
        assert_eq!(outcome.refund, 350);
    }

    #[test]
    fn test_level_serde_shape() {
        let json = serde_json::to_string(&ExpansionLevel::Level(3)).unwrap();
        assert_eq!(json, r#"{"level":3}"#);
        let max: ExpansionLevel = serde_json::from_str(r#""max""#).unwrap();
        assert_eq!(max, ExpansionLevel::Max);
    }

    proptest! {
        #[test]
        fn prop_symmetric_expand_doubles(size in 0.001f64..1.0e9, x in -1.0e6f64..1.0e6, z in -1.0e6f64..1.0e6) {
            let border = Border::new(Point::new(x, z), size);
            let grown = expand(border, None);
            prop_assert_eq!(grown.size, size * 2.0);
            prop_assert_eq!(grown.center, border.center);
        }

        #[test]
        fn prop_directional_expand_contains_old(
            half in 1i64..1_000_000,
            x in -1_000_000i64..1_000_000,
            z in -1_000_000i64..1_000_000,
            direction in any_direction(),
        ) {
            let border = Border::new(Point::new(x as f64, z as f64), (half * 2) as f64);
            let grown = expand(border, Some(direction));
            prop_assert!(grown.contains_border(&border));
        }

        #[test]
        fn prop_reset_refund_after_k_levels(levels in 0u32..20, rate in 0.0f64..=1.0) {
            let schedule = CostSchedule::default();
            let paid = schedule.total_cost(levels);
            let outcome = reset(Border::new(Point::ORIGIN, 100.0), paid, rate);
            prop_assert_eq!(outcome.refund, (paid as f64 * rate).floor() as u64);
            prop_assert_eq!(outcome.border.size, 100.0);
        }
    }
}
