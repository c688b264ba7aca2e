//! Whole-opening runs against the sandbox.
//!
//! These play the built-in scenario end to end: the economy must get going,
//! the first structure must go down, and two runs must agree frame by frame.

use bot_core::config::EngineConfig;
use bot_core::unit_kind::UnitKind;
use bot_core::world::{Owner, UnitCommand};
use bot_headless::{CommandLog, HeadlessRunner, Scenario};

// =============================================================================
// Helpers
// =============================================================================

fn played(frames: u32) -> HeadlessRunner {
    let mut runner = HeadlessRunner::new(Scenario::default_opening(), EngineConfig::default());
    runner
        .run(frames, &mut std::io::sink())
        .expect("writing to a sink cannot fail");
    runner
}

// =============================================================================
// Economy
// =============================================================================

#[test]
fn test_workers_gather_minerals() {
    let runner = played(600);
    let (minerals, _) = runner.world().gathered();
    assert!(minerals > 0, "no minerals gathered in 600 frames");
}

#[test]
fn test_probes_are_trained() {
    let runner = played(1500);
    assert!(runner.world().count(Owner::Own, UnitKind::Probe) > 4);
    assert!(runner.engine().queue().len() < EngineConfig::default().opening.len());
}

#[test]
fn test_first_pylon_goes_down() {
    let runner = played(2400);
    assert!(runner.world().count(Owner::Own, UnitKind::Pylon) >= 1);

    let ordered = runner.log().frames.iter().any(|f| {
        f.commands.iter().any(|c| {
            matches!(
                c,
                UnitCommand::Build {
                    kind: UnitKind::Pylon,
                    ..
                }
            )
        })
    });
    assert!(ordered);
}

#[test]
fn test_no_stock_goes_negative() {
    let mut runner = HeadlessRunner::new(Scenario::default_opening(), EngineConfig::default());
    for _ in 0..1200 {
        runner.step();
        assert!(runner.world().minerals() >= 0);
        assert!(runner.world().gas() >= 0);
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_two_runs_agree() {
    let a = played(900);
    let b = played(900);
    assert_eq!(a.log(), b.log());
    assert_eq!(a.report(), b.report());
}

#[test]
fn test_recorded_log_survives_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opening.replay");
    played(400).log().save(&path).unwrap();

    let log = CommandLog::load(&path).unwrap();
    let check = log
        .verify(&Scenario::default_opening(), EngineConfig::default())
        .unwrap();
    assert!(check.matches());
}

// =============================================================================
// Scenario files
// =============================================================================

#[test]
fn test_scenario_file_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.ron");
    std::fs::write(
        &path,
        r#"(
            name: "tiny",
            map_size: (48, 48),
            start_location: (x: 10, y: 10),
            minerals: 50,
            units: [
                (kind: Nexus, owner: Own, tile: (x: 10, y: 10)),
                (kind: MineralField, owner: Neutral, tile: (x: 4, y: 10), count: 1),
                (kind: Probe, owner: Own, tile: (x: 10, y: 14), count: 2),
            ],
            max_frames: 100,
        )"#,
    )
    .unwrap();

    let scenario = Scenario::load(&path).unwrap();
    let mut runner = HeadlessRunner::new(scenario, EngineConfig::default());
    let report = runner.run(100, &mut std::io::sink()).unwrap();
    assert_eq!(report.frames, 100);
    assert_eq!(report.hostile_remaining, 0);
    assert_eq!(report.own_units.get(&UnitKind::Probe), Some(&2));
}
