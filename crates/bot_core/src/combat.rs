//! Combat commander.
//!
//! Every frame each completed, mobile, non-worker unit is given an
//! `Attacking` assignment toward the objective point and at most one order:
//!
//! - no objective set: nothing;
//! - arrived (closer than the arrival radius): a unit with any order,
//!   holding included, is left alone; an idle unit attacks the best hostile
//!   strictly inside its own sight range, or holds position;
//! - en route: the best hostile strictly within weapon range plus a buffer is
//!   engaged, else the best hostile visible to any own unit; with no threat
//!   the unit attack-moves to the objective when idle or when it lost its
//!   order.
//!
//! Units without a ground weapon never pick targets; they only advance and
//! hold.
//!
//! Threats rank by (structures last, nearest, lowest hit points). Distances
//! are exact squared pixels and ties fall to the lower unit id, so the same
//! snapshot always yields the same orders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assignments::{AssignmentTable, Role};
use crate::config::CombatConfig;
use crate::math::Position;
use crate::world::{CommandSink, Snapshot, UnitCommand, UnitId, UnitView};

/// Tactical state of one unit. Only `Attacking` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatAssignmentKind {
    /// Pushing toward the objective, engaging threats on the way.
    Attacking,
}

/// One row of the combat table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAssignment {
    /// State.
    pub kind: CombatAssignmentKind,
    /// Hostile the unit was sent against this frame.
    pub target: Option<UnitId>,
    /// Objective point.
    pub target_position: Option<Position>,
}

/// What one combat pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatReport {
    /// Units under command this frame.
    pub controlled: usize,
    /// Attack orders on a specific hostile.
    pub attacks: usize,
    /// Attack-move orders toward the objective.
    pub advances: usize,
    /// Hold-position orders.
    pub holds: usize,
    /// Commands the world refused.
    pub rejected: usize,
}

/// Per-unit attack state machine.
#[derive(Debug, Clone, Default)]
pub struct CombatCommander {
    config: CombatConfig,
    table: BTreeMap<UnitId, CombatAssignment>,
}

impl CombatCommander {
    /// Create a commander with the given settings.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            table: BTreeMap::new(),
        }
    }

    /// Current combat table, in unit id order.
    #[must_use]
    pub fn assignments(&self) -> &BTreeMap<UnitId, CombatAssignment> {
        &self.table
    }

    /// One unit's combat assignment.
    #[must_use]
    pub fn assignment(&self, unit: UnitId) -> Option<&CombatAssignment> {
        self.table.get(&unit)
    }

    /// Drop one unit.
    pub fn forget(&mut self, unit: UnitId) {
        self.table.remove(&unit);
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Whether a unit falls under this commander.
    #[must_use]
    pub fn controls(unit: &UnitView) -> bool {
        unit.is_completed && !unit.kind.is_building() && !unit.kind.is_worker()
    }

    /// Rebuild the combat table and issue this frame's orders.
    pub fn update<C: CommandSink + ?Sized>(
        &mut self,
        snapshot: &Snapshot,
        objective: Option<Position>,
        roles: &mut AssignmentTable,
        sink: &mut C,
    ) -> CombatReport {
        self.table.clear();
        let mut report = CombatReport::default();

        let controlled: Vec<&UnitView> = snapshot.own.iter().filter(|u| Self::controls(u)).collect();
        roles.retain(|id, a| {
            a.role != Role::Combat || controlled.binary_search_by_key(&id, |u| u.id).is_ok()
        });

        let visible: Vec<&UnitView> = snapshot
            .hostile
            .iter()
            .filter(|h| {
                snapshot
                    .own
                    .iter()
                    .any(|o| o.position.is_within(h.position, o.kind.sight_range()))
            })
            .collect();

        for unit in controlled {
            report.controlled += 1;
            if roles.role_of(unit.id) != Some(Role::Combat) {
                roles.assign(unit.id, Role::Combat, None, snapshot.frame);
            }

            let Some(objective) = objective else {
                self.record(unit.id, None, None);
                continue;
            };

            let order = if unit.position.is_within(objective, self.config.arrival_radius) {
                self.arrived(unit, snapshot)
            } else {
                self.en_route(unit, objective, &visible)
            };

            let target = match order {
                Some(UnitCommand::AttackUnit { target, .. }) => Some(target),
                _ => None,
            };
            self.record(unit.id, target, Some(objective));

            let Some(command) = order else {
                continue;
            };
            match sink.issue(command) {
                Ok(()) => {
                    debug!(unit = unit.id, ?command, "Combat order");
                    match command {
                        UnitCommand::AttackUnit { .. } => report.attacks += 1,
                        UnitCommand::AttackMove { .. } => report.advances += 1,
                        UnitCommand::HoldPosition { .. } => report.holds += 1,
                        _ => {}
                    }
                }
                Err(err) => {
                    warn!(unit = unit.id, %err, "Combat order rejected");
                    report.rejected += 1;
                }
            }
        }

        report
    }

    /// Center the viewport on a pending camera request, once.
    pub fn recenter_camera<C: CommandSink + ?Sized>(
        &self,
        request: &mut Option<Position>,
        sink: &mut C,
    ) -> Option<Position> {
        let position = request.take()?;
        sink.set_screen_position(position);
        debug!(%position, "Camera recentered");
        Some(position)
    }

    fn record(&mut self, unit: UnitId, target: Option<UnitId>, target_position: Option<Position>) {
        self.table.insert(
            unit,
            CombatAssignment {
                kind: CombatAssignmentKind::Attacking,
                target,
                target_position,
            },
        );
    }

    fn arrived(&self, unit: &UnitView, snapshot: &Snapshot) -> Option<UnitCommand> {
        if !unit.is_idle() {
            return None;
        }
        let sight = unit.kind.sight_range();
        let threat = snapshot
            .hostile
            .iter()
            .filter(|h| unit.kind.can_attack() && unit.position.is_within(h.position, sight))
            .min_by_key(|h| (h.kind.is_building(), unit.position.distance_squared(h.position), h.id));

        Some(match threat {
            Some(hostile) => UnitCommand::AttackUnit {
                unit: unit.id,
                target: hostile.id,
            },
            None => UnitCommand::HoldPosition { unit: unit.id },
        })
    }

    fn en_route(
        &self,
        unit: &UnitView,
        objective: Position,
        visible: &[&UnitView],
    ) -> Option<UnitCommand> {
        // Unarmed units only advance.
        let threat = unit.kind.ground_weapon_range().and_then(|range| {
            let reach = range + self.config.weapon_range_buffer;
            best_threat(unit, visible.iter().copied().filter(|h| unit.position.is_within(h.position, reach)))
                .or_else(|| best_threat(unit, visible.iter().copied()))
        });

        if let Some(hostile) = threat {
            if unit.order_target == Some(hostile.id) {
                return None;
            }
            return Some(UnitCommand::AttackUnit {
                unit: unit.id,
                target: hostile.id,
            });
        }

        let lost_order = unit.order_target.is_none() && unit.target_position != Some(objective);
        if unit.is_idle() || lost_order {
            return Some(UnitCommand::AttackMove {
                unit: unit.id,
                to: objective,
            });
        }
        None
    }
}

fn best_threat<'a>(
    unit: &UnitView,
    hostiles: impl Iterator<Item = &'a UnitView>,
) -> Option<&'a UnitView> {
    hostiles.min_by_key(|h| {
        (
            h.kind.is_building(),
            unit.position.distance_squared(h.position),
            h.hit_points,
            h.id,
        )
    })
}
