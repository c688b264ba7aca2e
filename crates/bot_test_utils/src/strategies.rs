//! Proptest strategies.
//!
//! These strategies generate random but reproducible worlds for
//! property-based testing of the engine's invariants.

use proptest::prelude::*;

use bot_core::math::{Position, TilePosition};
use bot_core::unit_kind::UnitKind;

/// A pixel position inside a square map of `extent` pixels.
pub fn arb_position(extent: i32) -> impl Strategy<Value = Position> {
    (0..extent, 0..extent).prop_map(|(x, y)| Position::new(x, y))
}

/// A tile inside a square map of `extent` tiles.
pub fn arb_tile(extent: i32) -> impl Strategy<Value = TilePosition> {
    (0..extent, 0..extent).prop_map(|(x, y)| TilePosition::new(x, y))
}

/// Worker positions around a base.
pub fn arb_workers(max: usize) -> impl Strategy<Value = Vec<Position>> {
    proptest::collection::vec(arb_position(2048), 1..max)
}

/// Mineral field positions.
pub fn arb_minerals(max: usize) -> impl Strategy<Value = Vec<Position>> {
    proptest::collection::vec(arb_position(2048), 1..max)
}

/// Stale harvest records: (worker index, node index) pairs, possibly
/// pointing at nodes far over capacity or at workers that do not exist.
pub fn arb_stale_records(
    max_workers: usize,
    max_nodes: usize,
) -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::vec((0..max_workers * 2, 0..max_nodes), 0..max_workers * 2)
}

/// A Protoss item the scheduler can queue.
pub fn arb_production_item() -> impl Strategy<Value = UnitKind> {
    prop_oneof![
        Just(UnitKind::Probe),
        Just(UnitKind::Zealot),
        Just(UnitKind::Dragoon),
        Just(UnitKind::Pylon),
        Just(UnitKind::Gateway),
        Just(UnitKind::Assimilator),
        Just(UnitKind::CyberneticsCore),
    ]
}

/// A build queue.
pub fn arb_queue(max_len: usize) -> impl Strategy<Value = Vec<UnitKind>> {
    proptest::collection::vec(arb_production_item(), 0..max_len)
}

/// Rectangles of unbuildable terrain as (origin, width, height).
pub fn arb_obstacles(extent: i32, max: usize) -> impl Strategy<Value = Vec<(TilePosition, i32, i32)>> {
    proptest::collection::vec((arb_tile(extent), 1..6i32, 1..6i32), 0..max)
}
