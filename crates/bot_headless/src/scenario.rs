//! Scenario loading and configuration.
//!
//! Scenarios define the initial sandbox state for headless runs: map size,
//! unbuildable terrain, economy, starting units for every side and where the
//! army should be sent.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bot_core::math::{Position, TilePosition};
use bot_core::unit_kind::UnitKind;
use bot_core::world::Owner;

use crate::sandbox::FIELD_AMOUNT;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed but unusable.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

/// A group of identical units placed at one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Unit type.
    pub kind: UnitKind,
    /// Owning side.
    pub owner: Owner,
    /// Top-left tile for structures and resources, containing tile otherwise.
    pub tile: TilePosition,
    /// How many to place. Extra copies of mobile units are spread to the right.
    #[serde(default = "one")]
    pub count: u32,
}

const fn one() -> u32 {
    1
}

impl UnitPlacement {
    /// Place a single unit.
    #[must_use]
    pub const fn new(kind: UnitKind, owner: Owner, x: i32, y: i32) -> Self {
        Self {
            kind,
            owner,
            tile: TilePosition::new(x, y),
            count: 1,
        }
    }

    /// Place `count` copies.
    #[must_use]
    pub const fn times(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// Rectangle of unbuildable tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainBlock {
    /// Top-left tile.
    pub origin: TilePosition,
    /// Width in tiles.
    pub width: i32,
    /// Height in tiles.
    pub height: i32,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Map dimensions in tiles.
    pub map_size: (i32, i32),
    /// Unbuildable terrain.
    #[serde(default)]
    pub unbuildable: Vec<TerrainBlock>,
    /// This player's start tile, used as the placement anchor.
    pub start_location: TilePosition,
    /// Starting minerals.
    pub minerals: i32,
    /// Starting gas.
    #[serde(default)]
    pub gas: i32,
    /// Minerals in each field.
    #[serde(default = "default_field_amount")]
    pub mineral_field_amount: i32,
    /// Units of every owner.
    pub units: Vec<UnitPlacement>,
    /// Where the army is sent, if anywhere.
    #[serde(default)]
    pub objective: Option<Position>,
    /// Frames to run when the caller does not say.
    pub max_frames: u32,
}

const fn default_field_amount() -> i32 {
    FIELD_AMOUNT
}

impl Default for Scenario {
    fn default() -> Self {
        Self::default_opening()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject scenarios the sandbox cannot represent.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let (width, height) = self.map_size;
        if width <= 0 || height <= 0 {
            return Err(ScenarioError::Invalid(format!(
                "map size must be positive, got {width}x{height}"
            )));
        }
        let in_bounds = |t: TilePosition| t.x >= 0 && t.y >= 0 && t.x < width && t.y < height;
        if !in_bounds(self.start_location) {
            return Err(ScenarioError::Invalid(format!(
                "start location {} is off the map",
                self.start_location
            )));
        }
        if let Some(bad) = self.units.iter().find(|u| !in_bounds(u.tile)) {
            return Err(ScenarioError::Invalid(format!(
                "{} at {} is off the map",
                bad.kind, bad.tile
            )));
        }
        if self
            .units
            .iter()
            .any(|u| u.kind.is_resource() != (u.owner == Owner::Neutral))
        {
            return Err(ScenarioError::Invalid(
                "resources must be neutral and only resources may be neutral".into(),
            ));
        }
        Ok(())
    }

    /// A Protoss start with a full mineral line and a geyser, plus a small
    /// Zerg force sitting on the objective.
    #[must_use]
    pub fn default_opening() -> Self {
        let home = TilePosition::new(40, 40);
        let mut units = vec![UnitPlacement::new(UnitKind::Nexus, Owner::Own, home.x, home.y)];
        units.extend((0..8).map(|row| {
            UnitPlacement::new(UnitKind::MineralField, Owner::Neutral, home.x - 6, home.y - 2 + row)
        }));
        units.push(UnitPlacement::new(
            UnitKind::VespeneGeyser,
            Owner::Neutral,
            home.x,
            home.y - 6,
        ));
        units.push(UnitPlacement::new(UnitKind::Probe, Owner::Own, home.x, home.y + 4).times(4));
        units.push(UnitPlacement::new(UnitKind::Hatchery, Owner::Enemy, 100, 100));
        units.push(UnitPlacement::new(UnitKind::Zergling, Owner::Enemy, 96, 104).times(6));

        Self {
            name: "Default Opening".to_string(),
            description: "Protoss opening against an idle Zerg base".to_string(),
            map_size: (128, 128),
            unbuildable: vec![TerrainBlock {
                origin: TilePosition::new(60, 0),
                width: 4,
                height: 48,
            }],
            start_location: home,
            minerals: 50,
            gas: 0,
            mineral_field_amount: default_field_amount(),
            units,
            objective: Some(TilePosition::new(100, 100).center()),
            max_frames: 24 * 60 * 8,
        }
    }
}
