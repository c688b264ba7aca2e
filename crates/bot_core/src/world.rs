//! Boundary between the engine and the game world.
//!
//! The world is an external collaborator: it delivers one snapshot per frame
//! and accepts unit commands. [`WorldView`] is the read side, [`CommandSink`]
//! the write side. At the start of each frame the engine copies everything it
//! needs into a [`Snapshot`] so that all components of one tick observe the
//! same state, and every reference to a unit is an id looked up in it.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::math::{PixelRect, Position, TilePosition};
use crate::unit_kind::UnitKind;

/// Stable identifier of a unit, unique among live units.
pub type UnitId = u32;

/// Which side a unit belongs to, from this player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Controlled by this player.
    Own,
    /// Controlled by an opponent.
    Enemy,
    /// Map resources and critters.
    Neutral,
}

/// The order a unit is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Order {
    /// Doing nothing.
    #[default]
    Idle,
    /// Moving to a point.
    Move,
    /// Moving to a point, engaging anything met on the way.
    AttackMove,
    /// Attacking a specific unit.
    AttackUnit,
    /// Harvesting a resource node.
    Gather,
    /// Carrying resources back to a depot.
    ReturnCargo,
    /// Walking to or placing a structure.
    Build,
    /// Producing a unit (structures).
    Train,
    /// Standing still, engaging only what comes in range.
    HoldPosition,
}

/// One unit as seen in the current frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    /// Unit identifier.
    pub id: UnitId,
    /// Unit type.
    pub kind: UnitKind,
    /// Owning side.
    pub owner: Owner,
    /// Center in pixels.
    pub position: Position,
    /// Current hit points.
    pub hit_points: i32,
    /// False while a structure is being built or a unit is in training.
    pub is_completed: bool,
    /// Current order.
    pub order: Order,
    /// Unit targeted by the current order.
    pub order_target: Option<UnitId>,
    /// Point targeted by the current order.
    pub target_position: Option<Position>,
    /// Number of items in this structure's production queue.
    pub training_queue: usize,
}

impl UnitView {
    /// A completed unit of `kind` with full hit points and no order.
    #[must_use]
    pub fn new(id: UnitId, kind: UnitKind, owner: Owner, position: Position) -> Self {
        Self {
            id,
            kind,
            owner,
            position,
            hit_points: kind.max_hit_points(),
            is_completed: true,
            order: Order::Idle,
            order_target: None,
            target_position: None,
            training_queue: 0,
        }
    }

    /// Not executing any order.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.order == Order::Idle
    }

    /// Pixel area covered by the unit. Structures cover their tile footprint.
    #[must_use]
    pub fn footprint(&self) -> PixelRect {
        if self.kind.is_building() {
            PixelRect::centered(
                self.position,
                self.kind.tile_width() * crate::math::TILE_SIZE,
                self.kind.tile_height() * crate::math::TILE_SIZE,
            )
        } else {
            PixelRect::centered(self.position, 0, 0)
        }
    }

    /// Top-left tile of a structure's footprint.
    #[must_use]
    pub fn tile_position(&self) -> TilePosition {
        self.footprint().min.to_tile()
    }

    /// Squared distance from the unit's edge to a point.
    #[must_use]
    pub fn edge_distance_squared(&self, point: Position) -> i64 {
        self.footprint().distance_squared_to(point)
    }
}

/// This player's economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// Mineral stock.
    pub minerals: i32,
    /// Gas stock.
    pub gas: i32,
    /// Supply in use.
    pub supply_used: i32,
    /// Supply capacity.
    pub supply_total: i32,
    /// Home tile; building placement is anchored here.
    pub start_location: TilePosition,
}

impl PlayerState {
    /// Unused supply capacity.
    #[must_use]
    pub const fn supply_headroom(&self) -> i32 {
        self.supply_total - self.supply_used
    }

    /// Whether current stock covers the price of `kind`.
    #[must_use]
    pub const fn can_afford(&self, kind: UnitKind) -> bool {
        self.minerals >= kind.mineral_cost() && self.gas >= kind.gas_cost()
    }
}

/// A command issued to one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCommand {
    /// Queue a unit at a producing structure.
    Train {
        /// Producing structure.
        producer: UnitId,
        /// Unit to produce.
        kind: UnitKind,
    },
    /// Construct a structure with its top-left corner at a tile.
    Build {
        /// Worker doing the construction.
        builder: UnitId,
        /// Structure to place.
        kind: UnitKind,
        /// Top-left tile.
        at: TilePosition,
    },
    /// Harvest from a mineral field or refinery.
    Gather {
        /// Harvesting unit.
        worker: UnitId,
        /// Resource node.
        node: UnitId,
    },
    /// Attack a specific unit.
    AttackUnit {
        /// Attacker.
        unit: UnitId,
        /// Target.
        target: UnitId,
    },
    /// Move to a point, engaging enemies on the way.
    AttackMove {
        /// Moving unit.
        unit: UnitId,
        /// Destination.
        to: Position,
    },
    /// Move to a point ignoring enemies.
    Move {
        /// Moving unit.
        unit: UnitId,
        /// Destination.
        to: Position,
    },
    /// Stop and hold the current position.
    HoldPosition {
        /// Holding unit.
        unit: UnitId,
    },
}

impl UnitCommand {
    /// The unit receiving the command.
    #[must_use]
    pub const fn actor(&self) -> UnitId {
        match *self {
            Self::Train { producer, .. } => producer,
            Self::Build { builder, .. } => builder,
            Self::Gather { worker, .. } => worker,
            Self::AttackUnit { unit, .. }
            | Self::AttackMove { unit, .. }
            | Self::Move { unit, .. }
            | Self::HoldPosition { unit } => unit,
        }
    }
}

/// Read-only queries against the current frame.
pub trait WorldView {
    /// Current frame number.
    fn frame(&self) -> u32;

    /// This player's economy.
    fn player(&self) -> PlayerState;

    /// Every unit visible this frame: own, enemy and neutral.
    fn units(&self) -> Vec<UnitView>;

    /// Whether `kind` may be placed with its top-left corner at `tile`.
    ///
    /// Covers terrain, overlap with existing units and exploration.
    fn can_build_here(&self, tile: TilePosition, kind: UnitKind) -> bool;

    /// Whether the terrain of a single tile is buildable at all.
    fn is_buildable(&self, tile: TilePosition) -> bool;
}

/// Write side: commands and the few presentation hooks the engine uses.
pub trait CommandSink {
    /// Issue a command; the world may refuse it.
    fn issue(&mut self, command: UnitCommand) -> Result<(), CommandError>;

    /// Move the viewport so it is centred on `position`.
    fn set_screen_position(&mut self, position: Position);

    /// Show a status line to the player. Worlds without a screen ignore it.
    fn draw_status(&mut self, _line: &str) {}
}

/// A world the engine can both observe and command.
pub trait GameWorld: WorldView + CommandSink {}

impl<T: WorldView + CommandSink + ?Sized> GameWorld for T {}

/// Everything the engine reads during one frame, sorted by unit id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Frame number.
    pub frame: u32,
    /// Economy.
    pub player: PlayerState,
    /// Units owned by this player.
    pub own: Vec<UnitView>,
    /// Units owned by opponents.
    pub hostile: Vec<UnitView>,
    /// Mineral fields.
    pub minerals: Vec<UnitView>,
    /// Raw geysers (a geyser under a refinery is reported as the refinery).
    pub geysers: Vec<UnitView>,
}

impl Snapshot {
    /// Copy the current frame out of the world.
    pub fn capture<W: WorldView + ?Sized>(world: &W) -> Self {
        let mut units = world.units();
        units.sort_by_key(|u| u.id);

        let mut snapshot = Self {
            frame: world.frame(),
            player: world.player(),
            ..Self::default()
        };
        for unit in units {
            match unit.owner {
                Owner::Own => snapshot.own.push(unit),
                Owner::Enemy => snapshot.hostile.push(unit),
                Owner::Neutral if unit.kind.is_mineral_field() => snapshot.minerals.push(unit),
                Owner::Neutral if unit.kind.is_geyser() => snapshot.geysers.push(unit),
                Owner::Neutral => {}
            }
        }
        snapshot
    }

    /// Look up an own unit by id.
    #[must_use]
    pub fn own_unit(&self, id: UnitId) -> Option<&UnitView> {
        self.own
            .binary_search_by_key(&id, |u| u.id)
            .ok()
            .map(|index| &self.own[index])
    }

    /// Whether an own unit with this id is alive this frame.
    #[must_use]
    pub fn is_own_alive(&self, id: UnitId) -> bool {
        self.own_unit(id).is_some()
    }

    /// Look up a mineral field by id.
    #[must_use]
    pub fn mineral(&self, id: UnitId) -> Option<&UnitView> {
        self.minerals
            .binary_search_by_key(&id, |u| u.id)
            .ok()
            .map(|index| &self.minerals[index])
    }

    /// Own units of `kind`, complete or not.
    #[must_use]
    pub fn count_own(&self, kind: UnitKind) -> usize {
        self.own.iter().filter(|u| u.kind == kind).count()
    }

    /// Completed own workers in id order.
    pub fn workers(&self) -> impl Iterator<Item = &UnitView> {
        self.own
            .iter()
            .filter(|u| u.kind.is_worker() && u.is_completed)
    }

    /// Completed own refineries in id order.
    pub fn refineries(&self) -> impl Iterator<Item = &UnitView> {
        self.own
            .iter()
            .filter(|u| u.kind.is_refinery() && u.is_completed)
    }

    /// Own structures (complete or under construction).
    pub fn own_buildings(&self) -> impl Iterator<Item = &UnitView> {
        self.own.iter().filter(|u| u.kind.is_building())
    }

    /// The lowest-id own resource depot.
    #[must_use]
    pub fn resource_depot(&self) -> Option<&UnitView> {
        self.own.iter().find(|u| u.kind.is_resource_depot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticWorld(Vec<UnitView>);

    impl WorldView for StaticWorld {
        fn frame(&self) -> u32 {
            12
        }
        fn player(&self) -> PlayerState {
            PlayerState {
                minerals: 50,
                ..PlayerState::default()
            }
        }
        fn units(&self) -> Vec<UnitView> {
            self.0.clone()
        }
        fn can_build_here(&self, _tile: TilePosition, _kind: UnitKind) -> bool {
            true
        }
        fn is_buildable(&self, _tile: TilePosition) -> bool {
            true
        }
    }

    #[test]
    fn test_capture_partitions_and_sorts() {
        let world = StaticWorld(vec![
            UnitView::new(9, UnitKind::Probe, Owner::Own, Position::new(0, 0)),
            UnitView::new(3, UnitKind::Nexus, Owner::Own, Position::new(64, 48)),
            UnitView::new(5, UnitKind::Zergling, Owner::Enemy, Position::new(500, 500)),
            UnitView::new(7, UnitKind::MineralField, Owner::Neutral, Position::new(10, 10)),
            UnitView::new(8, UnitKind::VespeneGeyser, Owner::Neutral, Position::new(20, 20)),
        ]);

        let snapshot = Snapshot::capture(&world);
        assert_eq!(snapshot.frame, 12);
        assert_eq!(snapshot.player.minerals, 50);
        assert_eq!(
            snapshot.own.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![3, 9]
        );
        assert_eq!(snapshot.hostile.len(), 1);
        assert_eq!(snapshot.minerals.len(), 1);
        assert_eq!(snapshot.geysers.len(), 1);
        assert!(snapshot.is_own_alive(9));
        assert!(!snapshot.is_own_alive(5));
        assert_eq!(snapshot.resource_depot().map(|u| u.id), Some(3));
    }

    #[test]
    fn test_building_footprint() {
        let nexus = UnitView::new(1, UnitKind::Nexus, Owner::Own, Position::new(64, 48));
        assert_eq!(nexus.tile_position(), TilePosition::new(0, 0));
        assert_eq!(nexus.edge_distance_squared(Position::new(100, 10)), 0);
        assert_eq!(nexus.edge_distance_squared(Position::new(138, 48)), 100);
    }

    #[test]
    fn test_command_actor() {
        let cmd = UnitCommand::Gather { worker: 4, node: 10 };
        assert_eq!(cmd.actor(), 4);
        assert_eq!(UnitCommand::HoldPosition { unit: 2 }.actor(), 2);
    }
}
