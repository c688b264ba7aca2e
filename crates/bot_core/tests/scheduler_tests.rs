//! Build order scheduler tests.
//!
//! These drive the scheduler against a recording mock world and check the
//! queue-head and pending-construction rules frame by frame.

use bot_core::assignments::{AssignmentTable, Role};
use bot_core::build_order::{BuildScheduler, SchedulerStatus};
use bot_core::config::{PlacementConfig, SchedulerConfig};
use bot_core::error::ScheduleError;
use bot_core::math::Position;
use bot_core::unit_kind::UnitKind;
use bot_core::world::{Order, Owner, PlayerState, Snapshot, UnitCommand};
use bot_test_utils::fixtures::{incomplete, player, standard_base, structure, HOME};
use bot_test_utils::MockWorld;

// =============================================================================
// Helpers
// =============================================================================

fn scheduler(queue: &[UnitKind]) -> BuildScheduler {
    BuildScheduler::new(
        queue.iter().copied(),
        SchedulerConfig::default(),
        PlacementConfig::default(),
    )
}

fn tick(
    scheduler: &mut BuildScheduler,
    world: &mut MockWorld,
    table: &mut AssignmentTable,
) -> SchedulerStatus {
    let snapshot = Snapshot::capture(&*world);
    scheduler.tick(world, &snapshot, table).clone()
}

fn queue_of(scheduler: &BuildScheduler) -> Vec<UnitKind> {
    scheduler.queue().iter().copied().collect()
}

// =============================================================================
// Mobile units
// =============================================================================

#[test]
fn test_scenario_a_train_pops_immediately() {
    let mut world = MockWorld::default().with_player(PlayerState {
        minerals: 100,
        gas: 100,
        supply_used: 0,
        supply_total: 18,
        start_location: HOME,
    });
    let nexus = world.spawn_at_tile(UnitKind::Nexus, Owner::Own, HOME);
    let mut s = scheduler(&[UnitKind::Probe, UnitKind::Probe, UnitKind::Pylon]);
    let mut table = AssignmentTable::new();

    let status = tick(&mut s, &mut world, &mut table);

    assert_eq!(
        world.issued,
        vec![UnitCommand::Train {
            producer: nexus,
            kind: UnitKind::Probe
        }]
    );
    assert_eq!(queue_of(&s), vec![UnitKind::Probe, UnitKind::Pylon]);
    assert!(status.popped());
}

#[test]
fn test_scenario_b_insufficient_minerals() {
    let mut world = MockWorld::default().with_player(player(40, 0));
    world.spawn_at_tile(UnitKind::Nexus, Owner::Own, HOME);
    let mut s = scheduler(&[UnitKind::Probe, UnitKind::Pylon]);
    let mut table = AssignmentTable::new();

    let status = tick(&mut s, &mut world, &mut table);

    assert!(world.issued.is_empty());
    assert_eq!(queue_of(&s), vec![UnitKind::Probe, UnitKind::Pylon]);
    assert!(matches!(
        status,
        SchedulerStatus::Blocked(ScheduleError::InsufficientResources { need_minerals: 50, .. })
    ));
    assert!(status.to_string().contains("40/50 minerals"));
}

#[test]
fn test_insufficient_gas_blocks_without_reordering() {
    let mut world = MockWorld::default().with_player(player(500, 10));
    world.spawn_at_tile(UnitKind::Gateway, Owner::Own, HOME);
    let mut s = scheduler(&[UnitKind::Dragoon, UnitKind::Zealot]);
    let mut table = AssignmentTable::new();

    tick(&mut s, &mut world, &mut table);
    assert!(world.issued.is_empty());
    assert_eq!(queue_of(&s), vec![UnitKind::Dragoon, UnitKind::Zealot]);
}

#[test]
fn test_least_busy_completed_producer() {
    let mut world = MockWorld::default().with_player(player(500, 0));
    let busy = world.spawn_at_tile(UnitKind::Gateway, Owner::Own, HOME);
    let idle = world.spawn_at_tile(UnitKind::Gateway, Owner::Own, HOME.offset(6, 0));
    let building = world.spawn_at_tile(UnitKind::Gateway, Owner::Own, HOME.offset(12, 0));
    world.unit_mut(busy).unwrap().training_queue = 2;
    world.unit_mut(building).unwrap().is_completed = false;
    let mut s = scheduler(&[UnitKind::Zealot]);
    let mut table = AssignmentTable::new();

    tick(&mut s, &mut world, &mut table);
    assert_eq!(
        world.issued,
        vec![UnitCommand::Train {
            producer: idle,
            kind: UnitKind::Zealot
        }]
    );
}

#[test]
fn test_producer_tie_goes_to_first() {
    let mut world = MockWorld::default().with_player(player(500, 0));
    let first = world.spawn_at_tile(UnitKind::Gateway, Owner::Own, HOME);
    world.spawn_at_tile(UnitKind::Gateway, Owner::Own, HOME.offset(6, 0));
    let mut s = scheduler(&[UnitKind::Zealot]);

    tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert_eq!(world.issued[0].actor(), first);
}

#[test]
fn test_no_producer() {
    let mut world = MockWorld::default().with_player(player(500, 0));
    let mut s = scheduler(&[UnitKind::Zealot]);

    let status = tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert_eq!(
        status,
        SchedulerStatus::Blocked(ScheduleError::NoProducer {
            kind: UnitKind::Zealot,
            producer: UnitKind::Gateway
        })
    );
    assert_eq!(status.to_string(), "No available Gateway for Zealot");
}

#[test]
fn test_rejected_train_keeps_head() {
    let mut world = MockWorld::default().with_player(player(500, 0));
    world.spawn_at_tile(UnitKind::Nexus, Owner::Own, HOME);
    world.reject.train = true;
    let mut s = scheduler(&[UnitKind::Probe]);

    let status = tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert!(matches!(
        status,
        SchedulerStatus::Blocked(ScheduleError::CommandRejected { .. })
    ));
    assert_eq!(queue_of(&s), vec![UnitKind::Probe]);

    world.reject.train = false;
    world.advance();
    assert!(tick(&mut s, &mut world, &mut AssignmentTable::new()).popped());
    assert!(s.queue().is_empty());
}

// =============================================================================
// Structures
// =============================================================================

#[test]
fn test_scenario_c_pending_gates_queue() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    let base = standard_base(&mut world, 8, 4);
    let mut s = scheduler(&[UnitKind::Pylon, UnitKind::Probe]);
    let mut table = AssignmentTable::new();

    let status = tick(&mut s, &mut world, &mut table);
    let SchedulerStatus::BuildOrdered { kind, at, builder } = status else {
        panic!("expected a build order, got {status:?}");
    };
    assert_eq!(kind, UnitKind::Pylon);
    assert_eq!(builder, base.workers[0]);
    assert_eq!(s.pending().map(|p| p.target_count), Some(1));
    assert_eq!(table.role_of(builder), Some(Role::Construction));
    assert_eq!(queue_of(&s), vec![UnitKind::Pylon, UnitKind::Probe]);
    assert_eq!(
        world.issued,
        vec![UnitCommand::Build {
            builder,
            kind: UnitKind::Pylon,
            at
        }]
    );

    for _ in 0..3 {
        world.advance();
        assert_eq!(
            tick(&mut s, &mut world, &mut table),
            SchedulerStatus::Waiting(UnitKind::Pylon)
        );
        assert!(world.issued.is_empty());
        assert_eq!(queue_of(&s), vec![UnitKind::Pylon, UnitKind::Probe]);
    }

    world.insert(incomplete(structure(500, UnitKind::Pylon, at)));
    world.advance();

    assert_eq!(
        tick(&mut s, &mut world, &mut table),
        SchedulerStatus::ConstructionStarted(UnitKind::Pylon)
    );
    // The pop ends the frame; the Probe waits for the next one.
    assert!(world.issued.is_empty());
    assert_eq!(queue_of(&s), vec![UnitKind::Probe]);
    assert!(s.pending().is_none());

    world.advance();
    assert!(tick(&mut s, &mut world, &mut table).popped());
}

#[test]
fn test_pending_target_counts_existing() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    standard_base(&mut world, 8, 4);
    world.spawn_at_tile(UnitKind::Pylon, Owner::Own, HOME.offset(14, 14));
    world.spawn_at_tile(UnitKind::Pylon, Owner::Own, HOME.offset(-14, 14));
    let mut s = scheduler(&[UnitKind::Pylon]);

    tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert_eq!(s.pending().map(|p| p.target_count), Some(3));
}

#[test]
fn test_pending_timeout_releases_builder() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    standard_base(&mut world, 8, 4);
    let config = SchedulerConfig {
        pending_timeout_frames: 5,
        ..SchedulerConfig::default()
    };
    let mut s = BuildScheduler::new([UnitKind::Pylon], config, PlacementConfig::default());
    let mut table = AssignmentTable::new();

    let SchedulerStatus::BuildOrdered { builder, .. } = tick(&mut s, &mut world, &mut table) else {
        panic!("expected a build order");
    };
    for _ in 0..4 {
        world.advance();
        assert_eq!(
            tick(&mut s, &mut world, &mut table),
            SchedulerStatus::Waiting(UnitKind::Pylon)
        );
    }
    world.advance();
    let status = tick(&mut s, &mut world, &mut table);
    assert!(matches!(
        status,
        SchedulerStatus::Blocked(ScheduleError::ConstructionAbandoned { frames: 5, .. })
    ));
    assert!(s.pending().is_none());
    assert!(!table.contains(builder));
    assert_eq!(queue_of(&s), vec![UnitKind::Pylon]);

    world.advance();
    assert!(matches!(
        tick(&mut s, &mut world, &mut table),
        SchedulerStatus::BuildOrdered { .. }
    ));
}

#[test]
fn test_zero_timeout_waits_forever() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    standard_base(&mut world, 8, 4);
    let config = SchedulerConfig {
        pending_timeout_frames: 0,
        ..SchedulerConfig::default()
    };
    let mut s = BuildScheduler::new([UnitKind::Pylon], config, PlacementConfig::default());
    let mut table = AssignmentTable::new();

    tick(&mut s, &mut world, &mut table);
    world.frame = 100_000;
    assert_eq!(
        tick(&mut s, &mut world, &mut table),
        SchedulerStatus::Waiting(UnitKind::Pylon)
    );
}

#[test]
fn test_rejected_build_leaves_no_pending() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    let base = standard_base(&mut world, 8, 4);
    world.reject.build = true;
    let mut s = scheduler(&[UnitKind::Gateway]);
    let mut table = AssignmentTable::new();

    let status = tick(&mut s, &mut world, &mut table);
    assert!(matches!(
        status,
        SchedulerStatus::Blocked(ScheduleError::CommandRejected { kind: UnitKind::Gateway, .. })
    ));
    assert!(s.pending().is_none());
    assert!(!table.contains(base.workers[0]));
    assert_eq!(queue_of(&s), vec![UnitKind::Gateway]);
}

#[test]
fn test_no_builder() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    world.spawn_at_tile(UnitKind::Nexus, Owner::Own, HOME);
    let mut s = scheduler(&[UnitKind::Pylon]);

    let status = tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert_eq!(status, SchedulerStatus::Blocked(ScheduleError::NoBuilder(UnitKind::Pylon)));
}

#[test]
fn test_gas_worker_never_pulled_to_build() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    world.spawn_at_tile(UnitKind::Nexus, Owner::Own, HOME);
    let probe = world.spawn(UnitKind::Probe, Owner::Own, Position::new(1200, 1200));
    let mut table = AssignmentTable::new();
    table.assign(probe, Role::HarvestGas, Some(77), 0);
    let mut s = scheduler(&[UnitKind::Pylon]);

    let status = tick(&mut s, &mut world, &mut table);
    assert_eq!(status, SchedulerStatus::Blocked(ScheduleError::NoBuilder(UnitKind::Pylon)));
}

#[test]
fn test_busy_miner_used_when_nobody_idle() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    let base = standard_base(&mut world, 8, 2);
    let mut table = AssignmentTable::new();
    for &worker in &base.workers {
        world.unit_mut(worker).unwrap().order = Order::Gather;
    }
    table.assign(base.workers[1], Role::HarvestMinerals, Some(base.minerals[0]), 0);
    let mut s = scheduler(&[UnitKind::Pylon]);

    let status = tick(&mut s, &mut world, &mut table);
    assert!(matches!(
        status,
        SchedulerStatus::BuildOrdered { builder, .. } if builder == base.workers[1]
    ));
}

#[test]
fn test_no_depot_no_placement() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    world.spawn(UnitKind::Probe, Owner::Own, Position::new(1200, 1200));
    let mut s = scheduler(&[UnitKind::Pylon]);

    let status = tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert_eq!(status, SchedulerStatus::Blocked(ScheduleError::NoPlacement(UnitKind::Pylon)));
    assert_eq!(status.to_string(), "No valid build location found for Pylon");
}

#[test]
fn test_refinery_goes_on_geyser() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    let base = standard_base(&mut world, 8, 4);
    let geyser_tile = world.unit(base.geyser).unwrap().tile_position();
    let mut s = scheduler(&[UnitKind::Assimilator]);

    let status = tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert!(matches!(
        status,
        SchedulerStatus::BuildOrdered { at, .. } if at == geyser_tile
    ));
}

// =============================================================================
// Refill
// =============================================================================

#[test]
fn test_scenario_f_refill_supply_first() {
    let mut world = MockWorld::default().with_player(PlayerState {
        minerals: 0,
        gas: 0,
        supply_used: 32,
        supply_total: 40,
        start_location: HOME,
    });
    world.spawn_at_tile(UnitKind::Nexus, Owner::Own, HOME);
    let mut s = scheduler(&[]);

    tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert_eq!(queue_of(&s), vec![UnitKind::Pylon]);
}

#[test]
fn test_refill_only_when_empty() {
    let mut world = MockWorld::default().with_player(PlayerState {
        supply_used: 39,
        supply_total: 40,
        ..player(0, 0)
    });
    let mut s = scheduler(&[UnitKind::Probe]);

    tick(&mut s, &mut world, &mut AssignmentTable::new());
    assert_eq!(queue_of(&s), vec![UnitKind::Probe]);
}

#[test]
fn test_refill_while_pending_waits() {
    let mut world = MockWorld::default().with_player(player(400, 0));
    standard_base(&mut world, 8, 4);
    let mut s = scheduler(&[UnitKind::Pylon]);
    let mut table = AssignmentTable::new();

    tick(&mut s, &mut world, &mut table);
    world.advance();
    tick(&mut s, &mut world, &mut table);
    assert_eq!(queue_of(&s), vec![UnitKind::Pylon]);
}
