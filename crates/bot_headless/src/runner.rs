//! Headless runner implementation.
//!
//! Drives an [`Engine`] against a [`SandboxWorld`] one frame at a time, the
//! way a game adapter would: destroyed units are forwarded first, then the
//! frame callback runs, then the world advances. Each frame is written as one
//! JSON line.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::info;

use bot_core::config::EngineConfig;
use bot_core::engine::{BotEvents, Engine};
use bot_core::unit_kind::UnitKind;
use bot_core::world::{Owner, UnitCommand, UnitId, WorldView};

use crate::error::Result;
use crate::replay::CommandLog;
use crate::sandbox::SandboxWorld;
use crate::scenario::Scenario;

/// One output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame number.
    pub frame: u32,
    /// Status lines the engine drew.
    pub status: Vec<String>,
    /// Units removed before the frame ran.
    pub destroyed: Vec<UnitId>,
    /// Commands the world accepted.
    pub commands: Vec<UnitCommand>,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Frames played.
    pub frames: u32,
    /// Final mineral stock.
    pub minerals: i32,
    /// Final gas stock.
    pub gas: i32,
    /// Minerals harvested over the run.
    pub gathered_minerals: i64,
    /// Gas harvested over the run.
    pub gathered_gas: i64,
    /// Live own units per kind.
    pub own_units: BTreeMap<UnitKind, usize>,
    /// Enemy units still alive.
    pub hostile_remaining: usize,
    /// Commands issued over the run.
    pub commands: usize,
    /// Build queue at the end, head first.
    pub queue: Vec<UnitKind>,
    /// Last status lines.
    pub status: Vec<String>,
}

/// Engine plus sandbox plus the command log of the run.
#[derive(Debug, Clone)]
pub struct HeadlessRunner {
    scenario: Scenario,
    engine: Engine,
    world: SandboxWorld,
    log: CommandLog,
    frames: u32,
}

impl HeadlessRunner {
    /// Set up a scenario and start the game.
    #[must_use]
    pub fn new(scenario: Scenario, config: EngineConfig) -> Self {
        let mut engine = Engine::new(config);
        engine.set_objective(scenario.objective);
        engine.on_start();
        let world = SandboxWorld::from_scenario(&scenario);
        if let Some(objective) = scenario.objective {
            engine.request_camera(objective);
        }
        Self {
            log: CommandLog::new(scenario.name.clone()),
            scenario,
            engine,
            world,
            frames: 0,
        }
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The sandbox.
    #[must_use]
    pub fn world(&self) -> &SandboxWorld {
        &self.world
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Play one frame.
    pub fn step(&mut self) -> FrameRecord {
        let destroyed = self.world.take_destroyed();
        for unit in &destroyed {
            self.engine.on_unit_destroyed(*unit);
        }

        let report = self.engine.on_frame(&mut self.world);
        let record = FrameRecord {
            frame: report.frame,
            status: self.world.status_lines().to_vec(),
            destroyed,
            commands: self.world.take_issued(),
        };
        self.log.record(record.frame, record.commands.clone());
        self.world.step();
        self.frames += 1;
        record
    }

    /// Play `frames` frames, writing one JSON line per frame to `out`.
    pub fn run<W: Write>(&mut self, frames: u32, out: &mut W) -> Result<RunReport> {
        for _ in 0..frames {
            let record = self.step();
            serde_json::to_writer(&mut *out, &record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        let report = self.report();
        info!(
            scenario = %report.scenario,
            frames = report.frames,
            minerals = report.gathered_minerals,
            commands = report.commands,
            "Run finished"
        );
        Ok(report)
    }

    /// End the game, resetting the engine.
    pub fn finish(&mut self) -> RunReport {
        let report = self.report();
        self.engine.on_end(report.hostile_remaining == 0);
        report
    }

    /// Summary of the run so far.
    #[must_use]
    pub fn report(&self) -> RunReport {
        let mut own_units = BTreeMap::new();
        for unit in self.world.units_of(Owner::Own) {
            *own_units.entry(unit.kind).or_insert(0) += 1;
        }
        let (gathered_minerals, gathered_gas) = self.world.gathered();
        let player = self.world.player();

        RunReport {
            scenario: self.scenario.name.clone(),
            frames: self.frames,
            minerals: player.minerals,
            gas: player.gas,
            gathered_minerals,
            gathered_gas,
            own_units,
            hostile_remaining: self.world.units_of(Owner::Enemy).count(),
            commands: self.log.command_count(),
            queue: self.engine.queue(),
            status: self.engine.status().lines(),
        }
    }
}
