//! Test fixtures and helpers.
//!
//! Pre-built bases and unit configurations for consistent testing.

use bot_core::math::{Position, TilePosition};
use bot_core::unit_kind::UnitKind;
use bot_core::world::{Owner, PlayerState, UnitId, UnitView};

use crate::mock_world::{footprint_center, MockWorld};

/// Home tile used by [`standard_base`].
pub const HOME: TilePosition = TilePosition::new(40, 40);

/// Ids of the units created by [`standard_base`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseIds {
    /// The resource depot.
    pub depot: UnitId,
    /// Mineral fields, in id order.
    pub minerals: Vec<UnitId>,
    /// The geyser.
    pub geyser: UnitId,
    /// Workers, in id order.
    pub workers: Vec<UnitId>,
}

/// Economy with the given stock and plenty of supply.
#[must_use]
pub fn player(minerals: i32, gas: i32) -> PlayerState {
    PlayerState {
        minerals,
        gas,
        supply_used: 4,
        supply_total: 40,
        start_location: HOME,
    }
}

/// A completed own unit.
#[must_use]
pub fn own(id: UnitId, kind: UnitKind, position: Position) -> UnitView {
    UnitView::new(id, kind, Owner::Own, position)
}

/// A completed hostile unit.
#[must_use]
pub fn enemy(id: UnitId, kind: UnitKind, position: Position) -> UnitView {
    UnitView::new(id, kind, Owner::Enemy, position)
}

/// A mineral field at a pixel position.
#[must_use]
pub fn mineral(id: UnitId, position: Position) -> UnitView {
    UnitView::new(id, UnitKind::MineralField, Owner::Neutral, position)
}

/// An own structure whose footprint starts at `tile`.
#[must_use]
pub fn structure(id: UnitId, kind: UnitKind, tile: TilePosition) -> UnitView {
    own(id, kind, footprint_center(kind, tile))
}

/// The same unit, still under construction or in training.
#[must_use]
pub fn incomplete(mut unit: UnitView) -> UnitView {
    unit.is_completed = false;
    unit
}

/// A Protoss start: Nexus at [`HOME`], a mineral line of `mineral_count`
/// fields to its left, one geyser above and `worker_count` idle Probes.
pub fn standard_base(world: &mut MockWorld, mineral_count: usize, worker_count: usize) -> BaseIds {
    let depot = world.spawn_at_tile(UnitKind::Nexus, Owner::Own, HOME);
    let minerals = (0..mineral_count)
        .map(|i| {
            let row = i32::try_from(i).unwrap_or(0);
            world.spawn_at_tile(
                UnitKind::MineralField,
                Owner::Neutral,
                HOME.offset(-6, row - 2),
            )
        })
        .collect();
    let geyser = world.spawn_at_tile(UnitKind::VespeneGeyser, Owner::Neutral, HOME.offset(0, -6));
    let depot_center = footprint_center(UnitKind::Nexus, HOME);
    let workers = (0..worker_count)
        .map(|i| {
            let dx = i32::try_from(i).unwrap_or(0) * 8;
            world.spawn(
                UnitKind::Probe,
                Owner::Own,
                Position::new(depot_center.x - 80 + dx, depot_center.y + 64),
            )
        })
        .collect();

    if world.player == PlayerState::default() {
        world.player = player(50, 0);
    }
    BaseIds {
        depot,
        minerals,
        geyser,
        workers,
    }
}
