//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the engine issues identical command
//! streams given identical worlds.
//!
//! # Testing Strategy
//!
//! Replays and headless comparisons only work if every decision is a pure
//! function of the snapshot. Sources of non-determinism include:
//!
//! - **Floating-point math**: distances are exact integer squares; the few
//!   true lengths use [`bot_core::math::Fixed`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Every table iterates in unit id order.
//!
//! - **Unit list order**: worlds may report units in any order. The snapshot
//!   sorts them by id before any component reads them.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bot_core::engine::{BotEvents, Engine};
use bot_core::world::UnitCommand;
use tracing::warn;

use crate::mock_world::MockWorld;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames run.
    pub frames: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Engine is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process several times and compare final hashes.
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..frames {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Engine plus world plus every command accepted so far.
#[derive(Debug, Clone)]
pub struct EngineRun {
    /// Engine under test.
    pub engine: Engine,
    /// World it plays in.
    pub world: MockWorld,
    /// Accepted commands across all frames.
    pub log: Vec<UnitCommand>,
}

impl EngineRun {
    /// Start a game.
    #[must_use]
    pub fn new(mut engine: Engine, world: MockWorld) -> Self {
        engine.on_start();
        Self {
            engine,
            world,
            log: Vec::new(),
        }
    }

    /// Run one frame and append its commands to the log.
    pub fn step(&mut self) {
        self.engine.on_frame(&mut self.world);
        self.log.extend(self.world.issued.iter().copied());
        self.world.advance();
    }
}

/// Run the engine twice per `runs` over `frames` and compare command logs.
pub fn verify_engine_determinism<F>(setup: F, runs: usize, frames: u32) -> DeterminismResult
where
    F: Fn() -> (Engine, MockWorld),
{
    verify_determinism(
        runs,
        frames,
        || {
            let (engine, world) = setup();
            EngineRun::new(engine, world)
        },
        EngineRun::step,
        |run| compute_hash(&run.log),
    )
}

/// Compare two runs frame by frame.
///
/// Returns the first frame whose commands differ, or `None`.
pub fn find_first_divergence<F>(setup: F, frames: u32) -> Option<u32>
where
    F: Fn() -> (Engine, MockWorld),
{
    let (engine, world) = setup();
    let mut first = EngineRun::new(engine, world);
    let (engine, world) = setup();
    let mut second = EngineRun::new(engine, world);

    for frame in 0..frames {
        first.step();
        second.step();
        if first.log != second.log {
            warn!(frame, "Engine runs diverged");
            return Some(frame);
        }
    }
    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
