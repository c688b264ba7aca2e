//! Building placement search.
//!
//! Scans a square of tiles around an anchor in a fixed raster order (outer
//! loop over x, inner loop over y, both ascending) and keeps every tile that
//! passes three rules:
//!
//! 1. the world reports the structure as placeable there;
//! 2. the tile is not on a line between the depot and one of its resource
//!    nodes (keeps harvesting paths open);
//! 3. the footprint keeps its clearance from existing own structures and a
//!    buildable margin towards walls.
//!
//! Refineries skip rules 2 and 3 since they sit on the geyser itself.
//!
//! The search only reads the world and the snapshot, so an unchanged world
//! always yields the same ordered candidate list.

use tracing::trace;

use crate::config::PlacementConfig;
use crate::math::{Fixed, Position, TilePosition, TILE_SIZE};
use crate::unit_kind::UnitKind;
use crate::world::{Snapshot, UnitView, WorldView};

/// Collect every legal placement for `kind` around `anchor`, in scan order.
///
/// Returns an empty list when the player has no resource depot or no tile
/// passes; callers report that and retry on a later frame.
pub fn search<W: WorldView + ?Sized>(
    world: &W,
    snapshot: &Snapshot,
    kind: UnitKind,
    anchor: TilePosition,
    rules: &PlacementConfig,
) -> Vec<TilePosition> {
    let mut candidates = Vec::new();

    let Some(depot) = snapshot.resource_depot() else {
        return candidates;
    };

    let resources: Vec<Position> = snapshot
        .minerals
        .iter()
        .chain(snapshot.geysers.iter())
        .map(|r| r.position)
        .filter(|p| depot.position.is_within(*p, rules.resource_cluster_radius))
        .collect();
    let buildings: Vec<&UnitView> = snapshot.own_buildings().collect();
    let clearance = clearance_for(kind, &buildings, rules);

    let radius = rules.search_radius;
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            let tile = anchor.offset(dx, dy);
            if !world.can_build_here(tile, kind) {
                continue;
            }
            if !kind.is_refinery() {
                if blocks_harvest_path(tile, depot.position, &resources, rules.path_tolerance) {
                    continue;
                }
                if !has_clearance(world, tile, kind, &buildings, clearance, rules.wall_buffer) {
                    continue;
                }
            }
            candidates.push(tile);
        }
    }

    trace!(
        kind = %kind,
        anchor = %anchor,
        candidates = candidates.len(),
        "Placement search"
    );
    candidates
}

/// Pick the middle candidate, the one central to the scanned buildable area.
#[must_use]
pub fn choose(candidates: &[TilePosition]) -> Option<TilePosition> {
    candidates.get(candidates.len() / 2).copied()
}

/// Required distance from other structures, in pixels.
fn clearance_for(kind: UnitKind, buildings: &[&UnitView], rules: &PlacementConfig) -> i32 {
    let tiles = if kind.is_supply_structure() {
        let supply_count = buildings
            .iter()
            .filter(|b| b.kind.is_supply_structure())
            .count();
        if supply_count < rules.supply_clearance_threshold {
            rules.early_supply_clearance
        } else {
            rules.late_supply_clearance
        }
    } else {
        rules.structure_clearance
    };
    tiles * TILE_SIZE
}

/// Whether the tile center sits on a depot-to-resource line.
///
/// A point on the segment satisfies `|depot→p| + |p→resource| ≈ |depot→resource|`.
fn blocks_harvest_path(
    tile: TilePosition,
    depot: Position,
    resources: &[Position],
    tolerance: i32,
) -> bool {
    let center = tile.center();
    let tolerance = Fixed::from_num(tolerance);
    let depot_to_tile = depot.distance(center);

    resources.iter().any(|&resource| {
        let detour = depot_to_tile + center.distance(resource) - depot.distance(resource);
        detour.abs() < tolerance
    })
}

/// Clearance from own structures and a buildable margin around the footprint.
fn has_clearance<W: WorldView + ?Sized>(
    world: &W,
    tile: TilePosition,
    kind: UnitKind,
    buildings: &[&UnitView],
    clearance: i32,
    wall_buffer: i32,
) -> bool {
    let corner = tile.to_position();
    let min_sq = i64::from(clearance) * i64::from(clearance);
    if buildings
        .iter()
        .any(|b| b.edge_distance_squared(corner) < min_sq)
    {
        return false;
    }

    for dx in -wall_buffer..kind.tile_width() + wall_buffer {
        for dy in -wall_buffer..kind.tile_height() + wall_buffer {
            if !world.is_buildable(tile.offset(dx, dy)) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Owner, PlayerState};

    /// Open map of `size` tiles with everything explored and buildable,
    /// where only the footprint bounds are checked.
    struct OpenField {
        size: i32,
    }

    impl WorldView for OpenField {
        fn frame(&self) -> u32 {
            0
        }
        fn player(&self) -> PlayerState {
            PlayerState::default()
        }
        fn units(&self) -> Vec<UnitView> {
            Vec::new()
        }
        fn can_build_here(&self, tile: TilePosition, kind: UnitKind) -> bool {
            tile.x >= 0
                && tile.y >= 0
                && tile.x + kind.tile_width() <= self.size
                && tile.y + kind.tile_height() <= self.size
        }
        fn is_buildable(&self, tile: TilePosition) -> bool {
            tile.x >= 0 && tile.y >= 0 && tile.x < self.size && tile.y < self.size
        }
    }

    fn snapshot_with(own: Vec<UnitView>, minerals: Vec<UnitView>) -> Snapshot {
        Snapshot {
            own,
            minerals,
            ..Snapshot::default()
        }
    }

    fn nexus_at(tile: TilePosition) -> UnitView {
        // Nexus is 4x3 tiles, centred on its footprint.
        let center = Position::new(tile.x * 32 + 64, tile.y * 32 + 48);
        UnitView::new(1, UnitKind::Nexus, Owner::Own, center)
    }

    #[test]
    fn test_choose_middle() {
        let tiles: Vec<_> = (0..5).map(|i| TilePosition::new(i, 0)).collect();
        assert_eq!(choose(&tiles), Some(TilePosition::new(2, 0)));
        assert_eq!(choose(&tiles[..4]), Some(TilePosition::new(2, 0)));
        assert_eq!(choose(&[]), None);
    }

    #[test]
    fn test_no_depot_no_candidates() {
        let world = OpenField { size: 64 };
        let snapshot = Snapshot::default();
        let found = search(
            &world,
            &snapshot,
            UnitKind::Pylon,
            TilePosition::new(30, 30),
            &PlacementConfig::default(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_scan_order_is_column_major() {
        let world = OpenField { size: 128 };
        let snapshot = snapshot_with(vec![nexus_at(TilePosition::new(60, 60))], Vec::new());
        let found = search(
            &world,
            &snapshot,
            UnitKind::Gateway,
            TilePosition::new(60, 60),
            &PlacementConfig::default(),
        );
        assert!(!found.is_empty());
        assert!(found.windows(2).all(|w| (w[0].x, w[0].y) < (w[1].x, w[1].y)));
        assert_eq!(found[0], TilePosition::new(40, 40));
    }

    #[test]
    fn test_keeps_clear_of_existing_structures() {
        let world = OpenField { size: 128 };
        let nexus = nexus_at(TilePosition::new(60, 60));
        let snapshot = snapshot_with(vec![nexus.clone()], Vec::new());
        let rules = PlacementConfig::default();
        let found = search(&world, &snapshot, UnitKind::Pylon, TilePosition::new(60, 60), &rules);

        let min_sq = i64::from(5 * TILE_SIZE).pow(2);
        assert!(!found.is_empty());
        for tile in &found {
            assert!(nexus.edge_distance_squared(tile.to_position()) >= min_sq);
        }
    }

    #[test]
    fn test_avoids_mineral_line() {
        let world = OpenField { size: 128 };
        let nexus = nexus_at(TilePosition::new(60, 60));
        let mineral = UnitView::new(
            50,
            UnitKind::MineralField,
            Owner::Neutral,
            Position::new(nexus.position.x + 320, nexus.position.y),
        );
        let snapshot = snapshot_with(vec![nexus.clone()], vec![mineral.clone()]);
        let found = search(
            &world,
            &snapshot,
            UnitKind::Gateway,
            TilePosition::new(60, 60),
            &PlacementConfig::default(),
        );

        for tile in &found {
            let c = tile.center();
            let detour = nexus.position.distance(c) + c.distance(mineral.position)
                - nexus.position.distance(mineral.position);
            assert!(detour >= Fixed::from_num(64), "{tile} blocks the mineral line");
        }
    }

    #[test]
    fn test_wall_buffer_keeps_off_map_edge() {
        let world = OpenField { size: 30 };
        let snapshot = snapshot_with(vec![nexus_at(TilePosition::new(2, 2))], Vec::new());
        let found = search(
            &world,
            &snapshot,
            UnitKind::Gateway,
            TilePosition::new(10, 10),
            &PlacementConfig::default(),
        );
        assert!(!found.is_empty());
        for tile in &found {
            assert!(tile.x >= 1 && tile.y >= 1);
            assert!(tile.x + UnitKind::Gateway.tile_width() < 30);
            assert!(tile.y + UnitKind::Gateway.tile_height() < 30);
        }
    }

    #[test]
    fn test_search_is_repeatable() {
        let world = OpenField { size: 128 };
        let snapshot = snapshot_with(vec![nexus_at(TilePosition::new(60, 60))], Vec::new());
        let rules = PlacementConfig::default();
        let first = search(&world, &snapshot, UnitKind::Pylon, TilePosition::new(60, 60), &rules);
        let second = search(&world, &snapshot, UnitKind::Pylon, TilePosition::new(60, 60), &rules);
        assert_eq!(first, second);
        assert_eq!(choose(&first), choose(&second));
    }
}
