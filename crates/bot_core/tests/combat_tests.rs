//! Combat commander tests.

use bot_core::assignments::{AssignmentTable, Role};
use bot_core::combat::{CombatAssignmentKind, CombatCommander};
use bot_core::config::CombatConfig;
use bot_core::math::Position;
use bot_core::unit_kind::UnitKind;
use bot_core::world::{Order, Snapshot, UnitCommand};
use bot_test_utils::fixtures::{enemy, incomplete, own};
use bot_test_utils::MockWorld;

// =============================================================================
// Helpers
// =============================================================================

fn world_with(snapshot: &Snapshot) -> MockWorld {
    let mut world = MockWorld::default();
    for unit in snapshot.own.iter().chain(&snapshot.hostile) {
        world.insert(unit.clone());
    }
    world
}

fn run(
    commander: &mut CombatCommander,
    snapshot: &Snapshot,
    objective: Option<Position>,
    roles: &mut AssignmentTable,
) -> MockWorld {
    let mut world = world_with(snapshot);
    commander.update(snapshot, objective, roles, &mut world);
    world
}

// =============================================================================
// Arrived
// =============================================================================

#[test]
fn test_scenario_e_idle_unit_engages_visible_hostile() {
    let objective = Position::new(1000, 1000);
    let snapshot = Snapshot {
        own: vec![own(1, UnitKind::Dragoon, Position::new(1040, 1000))],
        hostile: vec![enemy(9, UnitKind::Marine, Position::new(1120, 1000))],
        ..Snapshot::default()
    };
    let mut commander = CombatCommander::default();
    let mut roles = AssignmentTable::new();

    let world = run(&mut commander, &snapshot, Some(objective), &mut roles);

    assert_eq!(world.issued, vec![UnitCommand::AttackUnit { unit: 1, target: 9 }]);
    let assignment = commander.assignment(1).copied().unwrap();
    assert_eq!(assignment.kind, CombatAssignmentKind::Attacking);
    assert_eq!(assignment.target, Some(9));
    assert_eq!(assignment.target_position, Some(objective));
    assert_eq!(roles.role_of(1), Some(Role::Combat));
}

#[test]
fn test_arrived_ignores_hostiles_out_of_sight() {
    let snapshot = Snapshot {
        own: vec![own(1, UnitKind::Zealot, Position::new(1000, 1000))],
        hostile: vec![enemy(9, UnitKind::Marine, Position::new(1600, 1000))],
        ..Snapshot::default()
    };
    let world = run(
        &mut CombatCommander::default(),
        &snapshot,
        Some(Position::new(1000, 1000)),
        &mut AssignmentTable::new(),
    );
    assert_eq!(world.issued, vec![UnitCommand::HoldPosition { unit: 1 }]);
}

#[test]
fn test_holding_unit_left_alone_on_arrival() {
    let mut zealot = own(1, UnitKind::Zealot, Position::new(1000, 1000));
    zealot.order = Order::HoldPosition;
    let objective = Some(Position::new(1000, 1000));
    let mut commander = CombatCommander::default();

    let quiet = Snapshot {
        own: vec![zealot.clone()],
        ..Snapshot::default()
    };
    let world = run(&mut commander, &quiet, objective, &mut AssignmentTable::new());
    assert!(world.issued.is_empty());

    let contact = Snapshot {
        own: vec![zealot],
        hostile: vec![enemy(9, UnitKind::Zergling, Position::new(1100, 1000))],
        ..Snapshot::default()
    };
    let world = run(&mut commander, &contact, objective, &mut AssignmentTable::new());
    assert!(world.issued.is_empty());
    assert_eq!(commander.assignment(1).and_then(|a| a.target), None);
}

#[test]
fn test_hostile_at_exact_weapon_reach_not_preferred() {
    // Zealot reach is 15 + 10; the Zergling sits exactly at 25 px, so only
    // the Pylon counts as in reach.
    let snapshot = Snapshot {
        own: vec![own(1, UnitKind::Zealot, Position::new(0, 0))],
        hostile: vec![
            enemy(8, UnitKind::Zergling, Position::new(25, 0)),
            enemy(9, UnitKind::Pylon, Position::new(0, 10)),
        ],
        ..Snapshot::default()
    };
    let world = run(
        &mut CombatCommander::default(),
        &snapshot,
        Some(Position::new(3000, 3000)),
        &mut AssignmentTable::new(),
    );
    assert_eq!(world.issued, vec![UnitCommand::AttackUnit { unit: 1, target: 9 }]);
}

// =============================================================================
// En route
// =============================================================================

#[test]
fn test_threat_in_weapon_range_beats_nearer_structure() {
    let snapshot = Snapshot {
        own: vec![own(1, UnitKind::Dragoon, Position::new(0, 0))],
        hostile: vec![
            enemy(8, UnitKind::PhotonCannon, Position::new(30, 0)),
            enemy(9, UnitKind::Zealot, Position::new(130, 0)),
        ],
        ..Snapshot::default()
    };
    let world = run(
        &mut CombatCommander::default(),
        &snapshot,
        Some(Position::new(3000, 0)),
        &mut AssignmentTable::new(),
    );
    assert_eq!(world.issued, vec![UnitCommand::AttackUnit { unit: 1, target: 9 }]);
}

#[test]
fn test_hostile_spotted_by_other_unit_is_engaged() {
    let snapshot = Snapshot {
        own: vec![
            own(1, UnitKind::Zealot, Position::new(0, 0)),
            own(2, UnitKind::Probe, Position::new(2000, 0)),
        ],
        hostile: vec![enemy(9, UnitKind::Marine, Position::new(2100, 0))],
        ..Snapshot::default()
    };
    let world = run(
        &mut CombatCommander::default(),
        &snapshot,
        Some(Position::new(0, 3000)),
        &mut AssignmentTable::new(),
    );
    assert_eq!(world.issued, vec![UnitCommand::AttackUnit { unit: 1, target: 9 }]);
}

#[test]
fn test_unspotted_hostile_is_ignored() {
    let snapshot = Snapshot {
        own: vec![own(1, UnitKind::Zealot, Position::new(0, 0))],
        hostile: vec![enemy(9, UnitKind::Marine, Position::new(2100, 0))],
        ..Snapshot::default()
    };
    let objective = Position::new(0, 3000);
    let world = run(
        &mut CombatCommander::default(),
        &snapshot,
        Some(objective),
        &mut AssignmentTable::new(),
    );
    assert_eq!(
        world.issued,
        vec![UnitCommand::AttackMove { unit: 1, to: objective }]
    );
}

#[test]
fn test_lost_order_readvances() {
    let objective = Position::new(3000, 0);
    let mut zealot = own(1, UnitKind::Zealot, Position::new(0, 0));
    zealot.order = Order::Move;
    zealot.target_position = Some(Position::new(50, 50));
    let snapshot = Snapshot {
        own: vec![zealot],
        ..Snapshot::default()
    };
    let world = run(
        &mut CombatCommander::default(),
        &snapshot,
        Some(objective),
        &mut AssignmentTable::new(),
    );
    assert_eq!(
        world.issued,
        vec![UnitCommand::AttackMove { unit: 1, to: objective }]
    );
}

#[test]
fn test_custom_arrival_radius() {
    let snapshot = Snapshot {
        own: vec![own(1, UnitKind::Zealot, Position::new(100, 0))],
        ..Snapshot::default()
    };
    let mut commander = CombatCommander::new(CombatConfig {
        arrival_radius: 128,
        ..CombatConfig::default()
    });
    let world = run(&mut commander, &snapshot, Some(Position::ORIGIN), &mut AssignmentTable::new());
    assert_eq!(world.issued, vec![UnitCommand::HoldPosition { unit: 1 }]);
}

// =============================================================================
// Table maintenance
// =============================================================================

#[test]
fn test_table_rebuilt_each_frame() {
    let objective = Some(Position::new(3000, 0));
    let mut commander = CombatCommander::default();
    let mut roles = AssignmentTable::new();
    let two = Snapshot {
        own: vec![
            own(1, UnitKind::Zealot, Position::ORIGIN),
            own(2, UnitKind::Zealot, Position::ORIGIN),
        ],
        ..Snapshot::default()
    };
    run(&mut commander, &two, objective, &mut roles);
    assert_eq!(commander.assignments().len(), 2);

    let one = Snapshot {
        own: vec![own(2, UnitKind::Zealot, Position::ORIGIN)],
        ..Snapshot::default()
    };
    run(&mut commander, &one, objective, &mut roles);
    assert_eq!(commander.assignments().keys().copied().collect::<Vec<_>>(), vec![2]);
    assert!(!roles.contains(1));
}

#[test]
fn test_units_in_training_not_controlled() {
    let snapshot = Snapshot {
        own: vec![incomplete(own(1, UnitKind::Zealot, Position::ORIGIN))],
        ..Snapshot::default()
    };
    let mut commander = CombatCommander::default();
    let world = run(&mut commander, &snapshot, Some(Position::new(900, 0)), &mut AssignmentTable::new());
    assert!(world.issued.is_empty());
    assert!(commander.assignments().is_empty());
}

#[test]
fn test_rejected_order_counted() {
    let snapshot = Snapshot {
        own: vec![own(1, UnitKind::Zealot, Position::ORIGIN)],
        ..Snapshot::default()
    };
    let mut world = world_with(&snapshot);
    world.reject.combat = true;
    let report = CombatCommander::default().update(
        &snapshot,
        Some(Position::new(900, 0)),
        &mut AssignmentTable::new(),
        &mut world,
    );
    assert_eq!(report.rejected, 1);
    assert_eq!(report.advances, 0);
}
