//! Recording mock world.
//!
//! [`MockWorld`] implements both halves of the engine's world boundary with
//! plain data: a unit list, a tile map and a command log. Accepted commands
//! update the acting unit's order so multi-frame tests see the engine's own
//! effects, but nothing moves, grows or dies unless the test says so.

use std::collections::BTreeSet;

use bot_core::error::CommandError;
use bot_core::math::{Position, TilePosition};
use bot_core::unit_kind::UnitKind;
use bot_core::world::{CommandSink, Order, Owner, PlayerState, UnitCommand, UnitId, UnitView, WorldView};

/// Which command families the mock refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rejections {
    /// Refuse `Train`.
    pub train: bool,
    /// Refuse `Build`.
    pub build: bool,
    /// Refuse `Gather`.
    pub gather: bool,
    /// Refuse attack, move and hold orders.
    pub combat: bool,
}

/// In-memory world for engine tests.
#[derive(Debug, Clone)]
pub struct MockWorld {
    /// Current frame.
    pub frame: u32,
    /// Economy reported to the engine.
    pub player: PlayerState,
    /// Every unit, any owner.
    pub units: Vec<UnitView>,
    /// Map width in tiles.
    pub width: i32,
    /// Map height in tiles.
    pub height: i32,
    /// Tiles whose terrain is not buildable.
    pub unbuildable: BTreeSet<TilePosition>,
    /// Commands that were accepted, in order.
    pub issued: Vec<UnitCommand>,
    /// Commands that were refused, in order.
    pub refused: Vec<UnitCommand>,
    /// Last viewport position set.
    pub screen: Option<Position>,
    /// Status lines drawn during the last frame.
    pub status: Vec<String>,
    /// Refusal switches.
    pub reject: Rejections,
    next_id: UnitId,
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::new(128, 128)
    }
}

impl MockWorld {
    /// Empty, fully buildable map of `width` x `height` tiles.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            frame: 0,
            player: PlayerState::default(),
            units: Vec::new(),
            width,
            height,
            unbuildable: BTreeSet::new(),
            issued: Vec::new(),
            refused: Vec::new(),
            screen: None,
            status: Vec::new(),
            reject: Rejections::default(),
            next_id: 1,
        }
    }

    /// Set the economy.
    #[must_use]
    pub fn with_player(mut self, player: PlayerState) -> Self {
        self.player = player;
        self
    }

    /// Add a unit with a fresh id, returning the id.
    pub fn spawn(&mut self, kind: UnitKind, owner: Owner, position: Position) -> UnitId {
        let id = self.next_id;
        self.next_id += 1;
        self.units.push(UnitView::new(id, kind, owner, position));
        id
    }

    /// Add a structure or resource whose footprint starts at `tile`.
    pub fn spawn_at_tile(&mut self, kind: UnitKind, owner: Owner, tile: TilePosition) -> UnitId {
        self.spawn(kind, owner, footprint_center(kind, tile))
    }

    /// Add a unit with an explicit id, replacing any unit with that id.
    pub fn insert(&mut self, unit: UnitView) {
        self.next_id = self.next_id.max(unit.id + 1);
        self.units.retain(|u| u.id != unit.id);
        self.units.push(unit);
    }

    /// Mutable access to one unit.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitView> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// One unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&UnitView> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Remove a unit; returns whether it existed.
    pub fn kill(&mut self, id: UnitId) -> bool {
        let before = self.units.len();
        self.units.retain(|u| u.id != id);
        self.units.len() != before
    }

    /// Step to the next frame and forget last frame's log.
    pub fn advance(&mut self) {
        self.frame += 1;
        self.issued.clear();
        self.refused.clear();
        self.status.clear();
    }

    /// Mark a rectangle of tiles unbuildable.
    pub fn block(&mut self, origin: TilePosition, width: i32, height: i32) {
        for dx in 0..width {
            for dy in 0..height {
                self.unbuildable.insert(origin.offset(dx, dy));
            }
        }
    }

    fn occupied_tiles(&self) -> BTreeSet<TilePosition> {
        let mut tiles = BTreeSet::new();
        for unit in self.units.iter().filter(|u| u.kind.is_building() || u.kind.is_resource()) {
            let origin = unit.tile_position();
            for dx in 0..unit.kind.tile_width() {
                for dy in 0..unit.kind.tile_height() {
                    tiles.insert(origin.offset(dx, dy));
                }
            }
        }
        tiles
    }

    fn refuses(&self, command: &UnitCommand) -> bool {
        match command {
            UnitCommand::Train { .. } => self.reject.train,
            UnitCommand::Build { .. } => self.reject.build,
            UnitCommand::Gather { .. } => self.reject.gather,
            UnitCommand::AttackUnit { .. }
            | UnitCommand::AttackMove { .. }
            | UnitCommand::Move { .. }
            | UnitCommand::HoldPosition { .. } => self.reject.combat,
        }
    }

    fn apply(&mut self, command: UnitCommand) {
        let Some(unit) = self.unit_mut(command.actor()) else {
            return;
        };
        match command {
            UnitCommand::Train { .. } => unit.training_queue += 1,
            UnitCommand::Build { kind, at, .. } => {
                unit.order = Order::Build;
                unit.order_target = None;
                unit.target_position = Some(footprint_center(kind, at));
            }
            UnitCommand::Gather { node, .. } => {
                unit.order = Order::Gather;
                unit.order_target = Some(node);
                unit.target_position = None;
            }
            UnitCommand::AttackUnit { target, .. } => {
                unit.order = Order::AttackUnit;
                unit.order_target = Some(target);
                unit.target_position = None;
            }
            UnitCommand::AttackMove { to, .. } => {
                unit.order = Order::AttackMove;
                unit.order_target = None;
                unit.target_position = Some(to);
            }
            UnitCommand::Move { to, .. } => {
                unit.order = Order::Move;
                unit.order_target = None;
                unit.target_position = Some(to);
            }
            UnitCommand::HoldPosition { .. } => {
                unit.order = Order::HoldPosition;
                unit.order_target = None;
                unit.target_position = None;
            }
        }
    }
}

/// Pixel center of a footprint whose top-left tile is `tile`.
#[must_use]
pub fn footprint_center(kind: UnitKind, tile: TilePosition) -> Position {
    let corner = tile.to_position();
    Position::new(
        corner.x + kind.tile_width() * 16,
        corner.y + kind.tile_height() * 16,
    )
}

impl WorldView for MockWorld {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn player(&self) -> PlayerState {
        self.player
    }

    fn units(&self) -> Vec<UnitView> {
        self.units.clone()
    }

    fn can_build_here(&self, tile: TilePosition, kind: UnitKind) -> bool {
        if kind.is_refinery() {
            return self
                .units
                .iter()
                .any(|u| u.kind.is_geyser() && u.tile_position() == tile);
        }

        let occupied = self.occupied_tiles();
        (0..kind.tile_width()).all(|dx| {
            (0..kind.tile_height()).all(|dy| {
                let t = tile.offset(dx, dy);
                self.is_buildable(t) && !occupied.contains(&t)
            })
        })
    }

    fn is_buildable(&self, tile: TilePosition) -> bool {
        tile.x >= 0
            && tile.y >= 0
            && tile.x < self.width
            && tile.y < self.height
            && !self.unbuildable.contains(&tile)
    }
}

impl CommandSink for MockWorld {
    fn issue(&mut self, command: UnitCommand) -> Result<(), CommandError> {
        let actor = command.actor();
        if self.unit(actor).is_none() {
            self.refused.push(command);
            return Err(CommandError::UnknownUnit(actor));
        }
        if self.refuses(&command) {
            self.refused.push(command);
            return Err(CommandError::Incapable {
                unit: actor,
                reason: "refused by mock world".into(),
            });
        }
        self.issued.push(command);
        self.apply(command);
        Ok(())
    }

    fn set_screen_position(&mut self, position: Position) {
        self.screen = Some(position);
    }

    fn draw_status(&mut self, line: &str) {
        self.status.push(line.to_string());
    }
}
