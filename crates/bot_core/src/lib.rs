//! # Bot Core
//!
//! Decision engine for a real-time strategy game-playing agent.
//!
//! Once per frame the engine reads a snapshot of the visible world and
//! issues unit commands back into it. This crate contains **only** the
//! decision logic:
//! - No rendering
//! - No IO beyond loading a config file
//! - No randomness
//! - No floating-point math (uses fixed-point)
//!
//! The same snapshot always produces the same commands, which keeps headless
//! runs and command replays reproducible.
//!
//! ## Crate Structure
//!
//! - [`world`] - Boundary to the game world and the per-frame snapshot
//! - [`build_order`] - Production queue and pending construction tracking
//! - [`placement`] - Building placement search
//! - [`workers`] - Worker to resource node allocation
//! - [`combat`] - Per-unit attack state machine
//! - [`engine`] - Facade running the components in order
//! - [`config`] - Tunable constants, loadable from RON

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod assignments;
pub mod build_order;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod placement;
pub mod unit_kind;
pub mod workers;
pub mod world;

pub use error::{BotError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::assignments::{Assignment, AssignmentTable, Role};
    pub use crate::build_order::{BuildScheduler, PendingConstruction, SchedulerStatus};
    pub use crate::combat::{CombatAssignment, CombatAssignmentKind, CombatCommander, CombatReport};
    pub use crate::config::{ConfigError, EngineConfig};
    pub use crate::engine::{
        BotEvents, Directives, Engine, EngineStatus, FrameReport, SharedEngine, TickOutcome,
    };
    pub use crate::error::{BotError, CommandError, Result, ScheduleError};
    pub use crate::math::{Fixed, Position, TilePosition, TILE_SIZE};
    pub use crate::unit_kind::UnitKind;
    pub use crate::workers::{AllocationReport, WorkerAllocator};
    pub use crate::world::{
        CommandSink, GameWorld, Order, Owner, PlayerState, Snapshot, UnitCommand, UnitId,
        UnitView, WorldView,
    };
}
