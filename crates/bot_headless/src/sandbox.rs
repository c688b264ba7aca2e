//! Deterministic sandbox world.
//!
//! A small stand-in for the real game: enough economy, construction and
//! fighting to drive the engine through an opening without a game client.
//! Every rule is integer or fixed-point arithmetic over units kept in id
//! order, so the same scenario and the same commands always produce the same
//! frames.
//!
//! Rules, per frame:
//!
//! - structures under construction and queued units count down their build
//!   time; a finished unit appears next to its producer;
//! - a worker ordered to build walks to the site and places the structure
//!   (a refinery replaces its geyser);
//! - a gathering worker next to its node yields [`HARVEST_AMOUNT`] every
//!   [`HARVEST_INTERVAL`] frames, minerals from a field, gas from a completed
//!   own refinery;
//! - mobile units move [`MOVE_SPEED`] pixels toward their destination;
//! - armed units fire at their target, or at the nearest enemy in range when
//!   idle, holding or attack-moving, dealing [`ATTACK_DAMAGE`] per
//!   [`ATTACK_COOLDOWN`] frames;
//! - units at zero hit points and exhausted fields are removed and reported
//!   through [`SandboxWorld::take_destroyed`].

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, trace};

use bot_core::error::CommandError;
use bot_core::math::{Fixed, Position, TilePosition, TILE_SIZE};
use bot_core::unit_kind::UnitKind;
use bot_core::world::{
    CommandSink, Order, Owner, PlayerState, UnitCommand, UnitId, UnitView, WorldView,
};

use crate::scenario::Scenario;

/// Frames between two harvest yields of one worker.
pub const HARVEST_INTERVAL: u32 = 60;
/// Resources yielded per harvest.
pub const HARVEST_AMOUNT: i32 = 8;
/// Pixels a mobile unit covers per frame.
pub const MOVE_SPEED: i32 = 4;
/// How close a worker must be to its node's edge to harvest.
pub const GATHER_REACH: i32 = 48;
/// How close a builder must be to the site's center to place it.
pub const BUILD_REACH: i32 = 64;
/// Damage per shot.
pub const ATTACK_DAMAGE: i32 = 8;
/// Frames between two shots of one unit.
pub const ATTACK_COOLDOWN: u32 = 24;
/// Supply capacity never exceeds this.
pub const SUPPLY_CAP: i32 = 200;
/// Minerals in a field spawned without a scenario amount.
pub const FIELD_AMOUNT: i32 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Production {
    kind: UnitKind,
    remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SandboxUnit {
    view: UnitView,
    /// Construction frames left while incomplete.
    remaining: u32,
    production: VecDeque<Production>,
    build_job: Option<(UnitKind, TilePosition)>,
    harvest_timer: u32,
    cooldown: u32,
    /// Minerals left in a field.
    resources: i32,
}

impl SandboxUnit {
    fn new(view: UnitView) -> Self {
        Self {
            resources: if view.kind.is_mineral_field() { FIELD_AMOUNT } else { 0 },
            view,
            remaining: 0,
            production: VecDeque::new(),
            build_job: None,
            harvest_timer: 0,
            cooldown: 0,
        }
    }

    fn is_dead(&self) -> bool {
        if self.view.kind.is_mineral_field() {
            self.resources <= 0
        } else if self.view.kind.is_geyser() {
            false
        } else {
            self.view.hit_points <= 0
        }
    }

    fn set_order(&mut self, order: Order, target: Option<UnitId>, position: Option<Position>) {
        self.view.order = order;
        self.view.order_target = target;
        self.view.target_position = position;
    }
}

/// Pixel center of a footprint whose top-left tile is `tile`.
#[must_use]
pub fn footprint_center(kind: UnitKind, tile: TilePosition) -> Position {
    let corner = tile.to_position();
    Position::new(
        corner.x + kind.tile_width() * TILE_SIZE / 2,
        corner.y + kind.tile_height() * TILE_SIZE / 2,
    )
}

/// Move `from` up to `speed` pixels toward `to`.
fn step_toward(from: Position, to: Position, speed: i32) -> Position {
    let distance = from.distance(to);
    let speed = Fixed::from_num(speed);
    if distance <= speed {
        return to;
    }
    let dx = Fixed::from_num(to.x - from.x) * speed / distance;
    let dy = Fixed::from_num(to.y - from.y) * speed / distance;
    Position::new(
        from.x + dx.round().to_num::<i32>(),
        from.y + dy.round().to_num::<i32>(),
    )
}

fn in_range(from: Position, target: &UnitView, range: i32) -> bool {
    let r = i64::from(range);
    target.edge_distance_squared(from) <= r * r
}

fn hostile(a: Owner, b: Owner) -> bool {
    a != Owner::Neutral && b != Owner::Neutral && a != b
}

/// In-memory world with deterministic rules.
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    frame: u32,
    width: i32,
    height: i32,
    unbuildable: BTreeSet<TilePosition>,
    start_location: TilePosition,
    minerals: i32,
    gas: i32,
    gathered_minerals: i64,
    gathered_gas: i64,
    units: BTreeMap<UnitId, SandboxUnit>,
    next_id: UnitId,
    destroyed: Vec<UnitId>,
    issued: Vec<UnitCommand>,
    screen: Option<Position>,
    status: Vec<String>,
}

impl SandboxWorld {
    /// An empty map with no economy.
    #[must_use]
    pub fn new(width: i32, height: i32, start_location: TilePosition) -> Self {
        Self {
            frame: 0,
            width,
            height,
            unbuildable: BTreeSet::new(),
            start_location,
            minerals: 0,
            gas: 0,
            gathered_minerals: 0,
            gathered_gas: 0,
            units: BTreeMap::new(),
            next_id: 1,
            destroyed: Vec::new(),
            issued: Vec::new(),
            screen: None,
            status: Vec::new(),
        }
    }

    /// Build the initial state of a scenario.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let (width, height) = scenario.map_size;
        let mut world = Self::new(width, height, scenario.start_location);
        world.minerals = scenario.minerals;
        world.gas = scenario.gas;
        for block in &scenario.unbuildable {
            for dx in 0..block.width {
                for dy in 0..block.height {
                    world.unbuildable.insert(block.origin.offset(dx, dy));
                }
            }
        }

        for placement in &scenario.units {
            let kind = placement.kind;
            for i in 0..placement.count {
                let i = i32::try_from(i).unwrap_or(i32::MAX);
                let position = if kind.is_building() {
                    footprint_center(kind, placement.tile.offset(i * kind.tile_width(), 0))
                } else {
                    let center = placement.tile.center();
                    Position::new(center.x + i * TILE_SIZE / 2, center.y)
                };
                let id = world.spawn(kind, placement.owner, position);
                if let Some(field) = world.units.get_mut(&id).filter(|u| u.view.kind.is_mineral_field()) {
                    field.resources = scenario.mineral_field_amount;
                }
            }
        }
        debug!(
            scenario = %scenario.name,
            units = world.units.len(),
            "Sandbox created"
        );
        world
    }

    /// Add a completed unit and return its id.
    pub fn spawn(&mut self, kind: UnitKind, owner: Owner, position: Position) -> UnitId {
        let id = self.next_id;
        self.next_id += 1;
        self.units
            .insert(id, SandboxUnit::new(UnitView::new(id, kind, owner, position)));
        id
    }

    /// Add a unit at a tile: structures by top-left tile, others centered.
    pub fn spawn_at_tile(&mut self, kind: UnitKind, owner: Owner, tile: TilePosition) -> UnitId {
        let position = if kind.is_building() {
            footprint_center(kind, tile)
        } else {
            tile.center()
        };
        self.spawn(kind, owner, position)
    }

    /// Remove a unit as if it died. Returns whether it existed.
    pub fn kill(&mut self, id: UnitId) -> bool {
        if self.units.remove(&id).is_none() {
            return false;
        }
        self.destroyed.push(id);
        true
    }

    /// Current minerals.
    #[must_use]
    pub const fn minerals(&self) -> i32 {
        self.minerals
    }

    /// Current gas.
    #[must_use]
    pub const fn gas(&self) -> i32 {
        self.gas
    }

    /// Minerals and gas harvested since the start.
    #[must_use]
    pub const fn gathered(&self) -> (i64, i64) {
        (self.gathered_minerals, self.gathered_gas)
    }

    /// Set the stock directly.
    pub fn set_stock(&mut self, minerals: i32, gas: i32) {
        self.minerals = minerals;
        self.gas = gas;
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&UnitView> {
        self.units.get(&id).map(|u| &u.view)
    }

    /// Live units of one owner and kind, completed or not.
    #[must_use]
    pub fn count(&self, owner: Owner, kind: UnitKind) -> usize {
        self.units
            .values()
            .filter(|u| u.view.owner == owner && u.view.kind == kind)
            .count()
    }

    /// Live units of one owner.
    pub fn units_of(&self, owner: Owner) -> impl Iterator<Item = &UnitView> {
        self.units
            .values()
            .map(|u| &u.view)
            .filter(move |u| u.owner == owner)
    }

    /// Units removed since the last call.
    pub fn take_destroyed(&mut self) -> Vec<UnitId> {
        std::mem::take(&mut self.destroyed)
    }

    /// Commands accepted since the last call.
    pub fn take_issued(&mut self) -> Vec<UnitCommand> {
        std::mem::take(&mut self.issued)
    }

    /// Status lines drawn since the last step.
    #[must_use]
    pub fn status_lines(&self) -> &[String] {
        &self.status
    }

    /// Last viewport position set.
    #[must_use]
    pub const fn screen(&self) -> Option<Position> {
        self.screen
    }

    /// Supply in use, counting units still queued.
    fn supply_used(&self) -> i32 {
        self.units_of(Owner::Own)
            .map(|u| u.kind.supply_required())
            .sum::<i32>()
            + self
                .units
                .values()
                .filter(|u| u.view.owner == Owner::Own)
                .flat_map(|u| u.production.iter())
                .map(|p| p.kind.supply_required())
                .sum::<i32>()
    }

    fn supply_total(&self) -> i32 {
        self.units_of(Owner::Own)
            .filter(|u| u.is_completed)
            .map(|u| u.kind.supply_provided())
            .sum::<i32>()
            .min(SUPPLY_CAP)
    }

    fn occupied_tiles(&self) -> BTreeSet<TilePosition> {
        let mut tiles = BTreeSet::new();
        for unit in self.units.values().map(|u| &u.view) {
            if !unit.kind.is_building() {
                continue;
            }
            let origin = unit.tile_position();
            for dx in 0..unit.kind.tile_width() {
                for dy in 0..unit.kind.tile_height() {
                    tiles.insert(origin.offset(dx, dy));
                }
            }
        }
        tiles
    }

    fn can_afford(&self, kind: UnitKind) -> bool {
        self.minerals >= kind.mineral_cost() && self.gas >= kind.gas_cost()
    }

    fn charge(&mut self, kind: UnitKind) {
        self.minerals -= kind.mineral_cost();
        self.gas -= kind.gas_cost();
    }

    fn refund(&mut self, kind: UnitKind) {
        self.minerals += kind.mineral_cost();
        self.gas += kind.gas_cost();
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Own, completed acting unit.
    fn actor(&self, id: UnitId) -> Result<&SandboxUnit, CommandError> {
        let unit = self.units.get(&id).ok_or(CommandError::UnknownUnit(id))?;
        if unit.view.owner != Owner::Own {
            return Err(incapable(id, "not owned"));
        }
        if !unit.view.is_completed {
            return Err(incapable(id, "not completed"));
        }
        Ok(unit)
    }

    fn mobile_actor(&self, id: UnitId) -> Result<&SandboxUnit, CommandError> {
        let unit = self.actor(id)?;
        if unit.view.kind.is_building() {
            return Err(incapable(id, "cannot move"));
        }
        Ok(unit)
    }

    fn check(&self, command: UnitCommand) -> Result<(), CommandError> {
        match command {
            UnitCommand::Train { producer, kind } => {
                let unit = self.actor(producer)?;
                if kind.is_building() || kind.what_builds() != Some(unit.view.kind) {
                    return Err(incapable(producer, &format!("cannot train {kind}")));
                }
                if !self.can_afford(kind) {
                    return Err(CommandError::CannotAfford(kind));
                }
                if self.supply_used() + kind.supply_required() > self.supply_total() {
                    return Err(incapable(producer, "supply blocked"));
                }
            }
            UnitCommand::Build { builder, kind, at } => {
                let unit = self.actor(builder)?;
                if !kind.is_building() || kind.what_builds() != Some(unit.view.kind) {
                    return Err(incapable(builder, &format!("cannot build {kind}")));
                }
                if !self.can_afford(kind) {
                    return Err(CommandError::CannotAfford(kind));
                }
                if !self.can_build_here(at, kind) {
                    return Err(CommandError::IllegalPlacement { kind, at });
                }
            }
            UnitCommand::Gather { worker, node } => {
                let unit = self.actor(worker)?;
                if !unit.view.kind.is_worker() {
                    return Err(incapable(worker, "not a worker"));
                }
                let target = self.unit(node).ok_or(CommandError::UnknownUnit(node))?;
                let own_refinery = target.kind.is_refinery() && target.owner == Owner::Own;
                if !target.kind.is_mineral_field() && !own_refinery {
                    return Err(incapable(worker, "not a resource node"));
                }
            }
            UnitCommand::AttackUnit { unit, target } => {
                let attacker = self.actor(unit)?;
                if !attacker.view.kind.can_attack() {
                    return Err(incapable(unit, "unarmed"));
                }
                if self.unit(target).is_none() {
                    return Err(CommandError::UnknownUnit(target));
                }
            }
            UnitCommand::AttackMove { unit, .. }
            | UnitCommand::Move { unit, .. }
            | UnitCommand::HoldPosition { unit } => {
                self.mobile_actor(unit)?;
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: UnitCommand) {
        let actor = command.actor();
        if let Some((kind, _)) = self.units.get_mut(&actor).and_then(|u| u.build_job.take()) {
            self.refund(kind);
        }

        match command {
            UnitCommand::Train { kind, .. } => {
                self.charge(kind);
                if let Some(unit) = self.units.get_mut(&actor) {
                    unit.production.push_back(Production {
                        kind,
                        remaining: kind.build_frames().max(1),
                    });
                    unit.view.training_queue = unit.production.len();
                    unit.view.order = Order::Train;
                }
            }
            UnitCommand::Build { kind, at, .. } => {
                self.charge(kind);
                if let Some(unit) = self.units.get_mut(&actor) {
                    unit.build_job = Some((kind, at));
                    unit.set_order(Order::Build, None, Some(footprint_center(kind, at)));
                }
            }
            UnitCommand::Gather { node, .. } => {
                if let Some(unit) = self.units.get_mut(&actor) {
                    unit.harvest_timer = 0;
                    unit.set_order(Order::Gather, Some(node), None);
                }
            }
            UnitCommand::AttackUnit { target, .. } => {
                if let Some(unit) = self.units.get_mut(&actor) {
                    unit.set_order(Order::AttackUnit, Some(target), None);
                }
            }
            UnitCommand::AttackMove { to, .. } => {
                if let Some(unit) = self.units.get_mut(&actor) {
                    unit.set_order(Order::AttackMove, None, Some(to));
                }
            }
            UnitCommand::Move { to, .. } => {
                if let Some(unit) = self.units.get_mut(&actor) {
                    unit.set_order(Order::Move, None, Some(to));
                }
            }
            UnitCommand::HoldPosition { .. } => {
                if let Some(unit) = self.units.get_mut(&actor) {
                    unit.set_order(Order::HoldPosition, None, None);
                }
            }
        }
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance one frame.
    pub fn step(&mut self) {
        self.status.clear();
        self.advance_construction();
        self.advance_production();

        let ids: Vec<UnitId> = self.units.keys().copied().collect();
        for id in ids {
            self.act(id);
        }

        self.remove_dead();
        self.frame += 1;
    }

    fn advance_construction(&mut self) {
        for unit in self.units.values_mut() {
            if unit.view.is_completed {
                continue;
            }
            unit.remaining = unit.remaining.saturating_sub(1);
            if unit.remaining == 0 {
                unit.view.is_completed = true;
                debug!(unit = unit.view.id, kind = %unit.view.kind, "Construction complete");
            }
        }
    }

    fn advance_production(&mut self) {
        let mut finished = Vec::new();
        for unit in self.units.values_mut() {
            if !unit.view.is_completed {
                continue;
            }
            let Some(front) = unit.production.front_mut() else {
                continue;
            };
            front.remaining = front.remaining.saturating_sub(1);
            if front.remaining > 0 {
                continue;
            }
            let kind = front.kind;
            unit.production.pop_front();
            unit.view.training_queue = unit.production.len();
            if unit.production.is_empty() {
                unit.view.order = Order::Idle;
            }
            let exit = Position::new(
                unit.view.position.x,
                unit.view.position.y + unit.view.kind.tile_height() * TILE_SIZE / 2 + TILE_SIZE / 2,
            );
            finished.push((kind, unit.view.owner, exit));
        }
        for (kind, owner, position) in finished {
            let id = self.spawn(kind, owner, position);
            debug!(unit = id, kind = %kind, "Unit trained");
        }
    }

    fn act(&mut self, id: UnitId) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        unit.cooldown = unit.cooldown.saturating_sub(1);
        if !unit.view.is_completed || unit.is_dead() {
            return;
        }
        let view = unit.view.clone();

        match view.order {
            Order::Move => self.walk(id, view.target_position),
            Order::AttackMove => {
                if !self.fire_at_nearest(&view) {
                    self.walk(id, view.target_position);
                }
            }
            Order::AttackUnit => self.pursue(&view),
            Order::Gather => self.harvest(&view),
            Order::Build => self.construct(&view),
            Order::Idle | Order::HoldPosition | Order::Train | Order::ReturnCargo => {
                self.fire_at_nearest(&view);
            }
        }
    }

    fn walk(&mut self, id: UnitId, to: Option<Position>) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let Some(to) = to else {
            unit.set_order(Order::Idle, None, None);
            return;
        };
        unit.view.position = step_toward(unit.view.position, to, MOVE_SPEED);
        if unit.view.position == to {
            unit.set_order(Order::Idle, None, None);
        }
    }

    fn approach(&mut self, id: UnitId, to: Position) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.view.position = step_toward(unit.view.position, to, MOVE_SPEED);
        }
    }

    fn stop(&mut self, id: UnitId) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.set_order(Order::Idle, None, None);
        }
    }

    /// Shoot the nearest enemy in weapon range. Returns whether one was found.
    fn fire_at_nearest(&mut self, view: &UnitView) -> bool {
        let Some(range) = view.kind.ground_weapon_range() else {
            return false;
        };
        let target = self
            .units
            .values()
            .map(|u| &u.view)
            .filter(|t| hostile(view.owner, t.owner) && t.hit_points > 0)
            .filter(|t| in_range(view.position, t, range))
            .min_by_key(|t| (t.edge_distance_squared(view.position), t.id))
            .map(|t| t.id);
        match target {
            Some(target) => {
                self.fire(view.id, target);
                true
            }
            None => false,
        }
    }

    fn pursue(&mut self, view: &UnitView) {
        let target = view.order_target.and_then(|t| self.unit(t)).cloned();
        let (Some(target), Some(range)) = (target, view.kind.ground_weapon_range()) else {
            self.stop(view.id);
            return;
        };
        if target.hit_points <= 0 {
            self.stop(view.id);
        } else if in_range(view.position, &target, range) {
            self.fire(view.id, target.id);
        } else if !view.kind.is_building() {
            self.approach(view.id, target.position);
        }
    }

    fn fire(&mut self, attacker: UnitId, target: UnitId) {
        let ready = self.units.get(&attacker).is_some_and(|u| u.cooldown == 0);
        if !ready {
            return;
        }
        if let Some(unit) = self.units.get_mut(&attacker) {
            unit.cooldown = ATTACK_COOLDOWN;
        }
        if let Some(victim) = self.units.get_mut(&target) {
            victim.view.hit_points -= ATTACK_DAMAGE;
            trace!(attacker, target, hp = victim.view.hit_points, "Hit");
        }
    }

    fn harvest(&mut self, view: &UnitView) {
        let node = view.order_target.and_then(|n| self.unit(n)).cloned();
        let Some(node) = node else {
            self.stop(view.id);
            return;
        };
        if !in_range(view.position, &node, GATHER_REACH) {
            self.approach(view.id, node.position);
            return;
        }
        if node.kind.is_refinery() && !node.is_completed {
            return;
        }

        let Some(worker) = self.units.get_mut(&view.id) else {
            return;
        };
        worker.harvest_timer += 1;
        if worker.harvest_timer < HARVEST_INTERVAL {
            return;
        }
        worker.harvest_timer = 0;

        if node.kind.is_refinery() {
            self.gas += HARVEST_AMOUNT;
            self.gathered_gas += i64::from(HARVEST_AMOUNT);
        } else if let Some(field) = self.units.get_mut(&node.id) {
            let amount = HARVEST_AMOUNT.min(field.resources);
            field.resources -= amount;
            self.minerals += amount;
            self.gathered_minerals += i64::from(amount);
        }
    }

    fn construct(&mut self, view: &UnitView) {
        let Some((kind, at)) = self.units.get(&view.id).and_then(|u| u.build_job) else {
            self.stop(view.id);
            return;
        };
        let site = footprint_center(kind, at);
        if !view.position.is_within(site, BUILD_REACH) {
            self.approach(view.id, site);
            return;
        }

        if let Some(worker) = self.units.get_mut(&view.id) {
            worker.build_job = None;
            worker.set_order(Order::Idle, None, None);
        }
        if !self.can_build_here(at, kind) {
            debug!(builder = view.id, kind = %kind, at = %at, "Site blocked, refunded");
            self.refund(kind);
            return;
        }

        let position = if kind.is_refinery() {
            let geyser = self
                .units
                .values()
                .find(|u| u.view.kind.is_geyser() && u.view.tile_position() == at)
                .map(|u| (u.view.id, u.view.position));
            match geyser {
                Some((geyser, position)) => {
                    self.units.remove(&geyser);
                    position
                }
                None => site,
            }
        } else {
            site
        };

        let id = self.spawn(kind, view.owner, position);
        if let Some(structure) = self.units.get_mut(&id) {
            structure.view.is_completed = false;
            structure.remaining = kind.build_frames().max(1);
        }
        debug!(builder = view.id, unit = id, kind = %kind, at = %at, "Structure placed");
    }

    fn remove_dead(&mut self) {
        let dead: Vec<UnitId> = self
            .units
            .values()
            .filter(|u| u.is_dead())
            .map(|u| u.view.id)
            .collect();
        for id in dead {
            if let Some(unit) = self.units.remove(&id) {
                debug!(unit = id, kind = %unit.view.kind, "Unit removed");
            }
            self.destroyed.push(id);
        }
    }
}

fn incapable(unit: UnitId, reason: &str) -> CommandError {
    CommandError::Incapable {
        unit,
        reason: reason.to_string(),
    }
}

impl WorldView for SandboxWorld {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn player(&self) -> PlayerState {
        PlayerState {
            minerals: self.minerals,
            gas: self.gas,
            supply_used: self.supply_used(),
            supply_total: self.supply_total(),
            start_location: self.start_location,
        }
    }

    fn units(&self) -> Vec<UnitView> {
        self.units.values().map(|u| u.view.clone()).collect()
    }

    fn can_build_here(&self, tile: TilePosition, kind: UnitKind) -> bool {
        if kind.is_refinery() {
            return self
                .units
                .values()
                .any(|u| u.view.kind.is_geyser() && u.view.tile_position() == tile);
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

impl CommandSink for SandboxWorld {
    fn issue(&mut self, command: UnitCommand) -> Result<(), CommandError> {
        self.check(command)?;
        self.apply(command);
        self.issued.push(command);
        Ok(())
    }

    fn set_screen_position(&mut self, position: Position) {
        self.screen = Some(position);
    }

    fn draw_status(&mut self, line: &str) {
        self.status.push(line.to_string());
    }
}
