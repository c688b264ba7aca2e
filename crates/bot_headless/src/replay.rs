//! Command log recording and verification.
//!
//! A headless run is fully determined by its scenario and engine
//! configuration, so a replay only has to store the commands the engine
//! issued. Verifying a replay runs the scenario again and compares the two
//! command streams frame by frame.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bot_core::config::EngineConfig;
use bot_core::world::UnitCommand;

use crate::error::{HeadlessError, Result};
use crate::runner::HeadlessRunner;
use crate::scenario::Scenario;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Commands accepted during one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCommands {
    /// Frame number.
    pub frame: u32,
    /// Commands in issue order.
    pub commands: Vec<UnitCommand>,
}

/// Every command a run issued, frames without commands omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLog {
    /// Replay format version.
    pub version: u32,
    /// Name of the scenario that was played.
    pub scenario: String,
    /// Frames with at least one command, in frame order.
    pub frames: Vec<FrameCommands>,
    /// Number of frames played.
    pub duration: u32,
}

/// Outcome of [`CommandLog::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayCheck {
    /// Frames replayed.
    pub frames: u32,
    /// First frame whose commands differ, if any.
    pub first_divergence: Option<u32>,
}

impl ReplayCheck {
    /// Whether the replay reproduced the recording exactly.
    #[must_use]
    pub const fn matches(&self) -> bool {
        self.first_divergence.is_none()
    }
}

impl CommandLog {
    /// Start an empty log.
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            version: REPLAY_VERSION,
            scenario: scenario.into(),
            frames: Vec::new(),
            duration: 0,
        }
    }

    /// Record one frame's commands.
    pub fn record(&mut self, frame: u32, commands: Vec<UnitCommand>) {
        self.duration = self.duration.max(frame + 1);
        if !commands.is_empty() {
            self.frames.push(FrameCommands { frame, commands });
        }
    }

    /// Commands issued in `frame`.
    #[must_use]
    pub fn commands_at(&self, frame: u32) -> &[UnitCommand] {
        self.frames
            .binary_search_by_key(&frame, |f| f.frame)
            .map_or(&[], |i| self.frames[i].commands.as_slice())
    }

    /// Total number of commands.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.frames.iter().map(|f| f.commands.len()).sum()
    }

    /// First frame where two logs disagree.
    #[must_use]
    pub fn first_divergence(&self, other: &Self) -> Option<u32> {
        let frames = self.duration.max(other.duration);
        (0..frames).find(|&frame| self.commands_at(frame) != other.commands_at(frame))
    }

    /// Save the log to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Load a log from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let log: Self = bincode::deserialize(&bytes)?;
        if log.version != REPLAY_VERSION {
            return Err(HeadlessError::VersionMismatch {
                expected: REPLAY_VERSION,
                found: log.version,
            });
        }
        Ok(log)
    }

    /// Play `scenario` again for the recorded duration and compare.
    pub fn verify(&self, scenario: &Scenario, config: EngineConfig) -> Result<ReplayCheck> {
        if scenario.name != self.scenario {
            warn!(
                recorded = %self.scenario,
                given = %scenario.name,
                "Verifying against a different scenario"
            );
        }
        let mut runner = HeadlessRunner::new(scenario.clone(), config);
        runner.run(self.duration, &mut std::io::sink())?;

        let check = ReplayCheck {
            frames: self.duration,
            first_divergence: self.first_divergence(runner.log()),
        };
        info!(
            frames = check.frames,
            commands = self.command_count(),
            matches = check.matches(),
            "Replay verified"
        );
        Ok(check)
    }
}
