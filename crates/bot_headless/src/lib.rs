//! Headless runner for the decision engine.
//!
//! This crate plays the engine against a deterministic sandbox world without
//! a game client. This enables:
//!
//! - **Opening checks**: watch a build order play out frame by frame
//! - **CI verification**: automated runs of whole scenarios
//! - **Replay verification**: check that a recorded command stream is
//!   reproduced exactly
//!
//! # Output
//!
//! - **stdout**: one JSON object per frame (status lines, destroyed units,
//!   accepted commands), then a summary
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Run the built-in opening for 2000 frames
//! cargo run -p bot_headless -- run --frames 2000
//!
//! # Run a scenario and record the commands
//! cargo run -p bot_headless -- run --scenario scenarios/opening.ron --record opening.replay
//!
//! # Verify determinism
//! cargo run -p bot_headless -- replay --file opening.replay --scenario scenarios/opening.ron
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod replay;
pub mod runner;
pub mod sandbox;
pub mod scenario;

pub use error::{HeadlessError, Result};
pub use replay::{CommandLog, ReplayCheck};
pub use runner::{FrameRecord, HeadlessRunner, RunReport};
pub use sandbox::SandboxWorld;
pub use scenario::{Scenario, ScenarioError};
