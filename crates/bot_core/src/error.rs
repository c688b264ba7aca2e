//! Error types for the decision engine.
//!
//! Nothing here is fatal at tick level: every error degrades to a status
//! line and a retry on the next frame.

use thiserror::Error;

use crate::config::ConfigError;
use crate::math::TilePosition;
use crate::unit_kind::UnitKind;
use crate::world::UnitId;

/// Result type alias using [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;

/// Top-level error type for the engine crate.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The world refused a command.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The scheduler could not make progress this frame.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// A command refused by the world at the moment it was issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The acting or targeted unit no longer exists.
    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),

    /// The player cannot pay for the item.
    #[error("cannot afford {0}")]
    CannotAfford(UnitKind),

    /// The location is not legal for this structure.
    #[error("cannot place {kind} at {at}")]
    IllegalPlacement {
        /// Structure being placed.
        kind: UnitKind,
        /// Requested top-left tile.
        at: TilePosition,
    },

    /// The unit cannot carry out this kind of command.
    #[error("unit {unit} cannot do that: {reason}")]
    Incapable {
        /// Acting unit.
        unit: UnitId,
        /// World-provided explanation.
        reason: String,
    },
}

/// Why the build order scheduler made no progress this frame.
///
/// `Display` renders the status text shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Stock does not cover the head item's price.
    #[error("{kind} {have_minerals}/{need_minerals} minerals, {have_gas}/{need_gas} gas")]
    InsufficientResources {
        /// Queue head.
        kind: UnitKind,
        /// Current mineral stock.
        have_minerals: i32,
        /// Mineral price.
        need_minerals: i32,
        /// Current gas stock.
        have_gas: i32,
        /// Gas price.
        need_gas: i32,
    },

    /// No worker is free to construct the structure.
    #[error("No available worker to build {0}")]
    NoBuilder(UnitKind),

    /// Placement search found no legal tile.
    #[error("No valid build location found for {0}")]
    NoPlacement(UnitKind),

    /// No completed structure of the producing type exists.
    #[error("No available {producer} for {kind}")]
    NoProducer {
        /// Item to train.
        kind: UnitKind,
        /// Kind that trains it.
        producer: UnitKind,
    },

    /// The world refused the build or train command.
    #[error("Failed to issue order for {kind}: {source}")]
    CommandRejected {
        /// Item being produced.
        kind: UnitKind,
        /// World's reason.
        #[source]
        source: CommandError,
    },

    /// A pending construction never appeared and was given up.
    #[error("Construction of {kind} did not start within {frames} frames, retrying")]
    ConstructionAbandoned {
        /// Structure that never appeared.
        kind: UnitKind,
        /// Frames waited.
        frames: u32,
    },
}
