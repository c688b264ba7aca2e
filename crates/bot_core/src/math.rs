//! Pixel and tile geometry.
//!
//! World coordinates arrive as integer pixels and building placement works
//! on 32-pixel tiles. Distance comparisons stay in exact integer squared
//! distances; the few places that need a true length use fixed-point so the
//! same snapshot always produces the same decision on every machine.

use std::fmt;

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for lengths that need a square root.
pub type Fixed = I32F32;

/// Width and height of one build tile in pixels.
pub const TILE_SIZE: i32 = 32;

/// A point on the map in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal pixel coordinate.
    pub x: i32,
    /// Vertical pixel coordinate.
    pub y: i32,
}

impl Position {
    /// Create a new pixel position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Origin of the map.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Squared straight-line distance (exact, use for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Straight-line distance in pixels.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(Fixed::saturating_from_num(self.distance_squared(other)))
    }

    /// Whether `other` lies strictly closer than `radius` pixels.
    #[must_use]
    pub fn is_within(self, other: Self, radius: i32) -> bool {
        let r = i64::from(radius);
        self.distance_squared(other) < r * r
    }

    /// The tile containing this position.
    #[must_use]
    pub const fn to_tile(self) -> TilePosition {
        TilePosition::new(self.x.div_euclid(TILE_SIZE), self.y.div_euclid(TILE_SIZE))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})px", self.x, self.y)
    }
}

/// A build tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TilePosition {
    /// Tile column.
    pub x: i32,
    /// Tile row.
    pub y: i32,
}

impl TilePosition {
    /// Create a new tile position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a number of tiles.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Pixel position of the tile's top-left corner.
    #[must_use]
    pub const fn to_position(self) -> Position {
        Position::new(self.x * TILE_SIZE, self.y * TILE_SIZE)
    }

    /// Pixel position of the tile's center.
    #[must_use]
    pub const fn center(self) -> Position {
        Position::new(self.x * TILE_SIZE + TILE_SIZE / 2, self.y * TILE_SIZE + TILE_SIZE / 2)
    }
}

impl fmt::Display for TilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Axis-aligned pixel rectangle, inclusive of its left/top edge and
/// exclusive of its right/bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Top-left corner.
    pub min: Position,
    /// Bottom-right corner.
    pub max: Position,
}

impl PixelRect {
    /// Rectangle covering `width` x `height` tiles starting at `origin`.
    #[must_use]
    pub const fn from_tiles(origin: TilePosition, width: i32, height: i32) -> Self {
        let min = origin.to_position();
        Self {
            min,
            max: Position::new(min.x + width * TILE_SIZE, min.y + height * TILE_SIZE),
        }
    }

    /// Rectangle of the given pixel size centred on `center`.
    #[must_use]
    pub const fn centered(center: Position, width: i32, height: i32) -> Self {
        Self {
            min: Position::new(center.x - width / 2, center.y - height / 2),
            max: Position::new(center.x - width / 2 + width, center.y - height / 2 + height),
        }
    }

    /// Squared distance from a point to the nearest edge (0 if inside).
    #[must_use]
    pub fn distance_squared_to(&self, point: Position) -> i64 {
        let dx = if point.x < self.min.x {
            self.min.x - point.x
        } else if point.x > self.max.x {
            point.x - self.max.x
        } else {
            0
        };
        let dy = if point.y < self.min.y {
            self.min.y - point.y
        } else if point.y > self.max.y {
            point.y - self.max.y
        } else {
            0
        };
        i64::from(dx) * i64::from(dx) + i64::from(dy) * i64::from(dy)
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    // 48 halvings keep the error well under a pixel across a 256x256 tile map.
    for _ in 0..48 {
        let mid = low + (high - low) / 2;
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared_is_exact() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(a.distance(b), Fixed::from_num(5));
    }

    #[test]
    fn test_is_within_is_strict() {
        let a = Position::new(0, 0);
        assert!(a.is_within(Position::new(63, 0), 64));
        assert!(!a.is_within(Position::new(64, 0), 64));
    }

    #[test]
    fn test_tile_conversion() {
        let tile = TilePosition::new(3, 5);
        assert_eq!(tile.to_position(), Position::new(96, 160));
        assert_eq!(tile.center(), Position::new(112, 176));
        assert_eq!(Position::new(100, 170).to_tile(), tile);
        assert_eq!(Position::new(-1, -1).to_tile(), TilePosition::new(-1, -1));
    }

    #[test]
    fn test_rect_distance() {
        let rect = PixelRect::from_tiles(TilePosition::new(0, 0), 2, 2);
        assert_eq!(rect.distance_squared_to(Position::new(10, 10)), 0);
        assert_eq!(rect.distance_squared_to(Position::new(74, 64)), 100);
        assert_eq!(rect.distance_squared_to(Position::new(67, 68)), 9 + 16);
    }

    #[test]
    fn test_fixed_sqrt() {
        assert_eq!(fixed_sqrt(Fixed::ZERO), Fixed::ZERO);
        let root = fixed_sqrt(Fixed::from_num(2));
        let diff = (root - Fixed::from_num(1.414_213_56)).abs();
        assert!(diff < Fixed::from_num(0.0001));
        let big = fixed_sqrt(Fixed::from_num(67_108_864));
        assert!((big - Fixed::from_num(8192)).abs() < Fixed::from_num(0.01));
    }
}
