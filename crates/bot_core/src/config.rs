//! Engine configuration.
//!
//! Every tuning constant the components use lives here. [`EngineConfig::default`]
//! reproduces the stock behaviour; a RON file can override any subset of it.
//!
//! ```
//! use bot_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_ron_str("(workers: (cap_per_node: 2))").unwrap();
//! assert_eq!(config.workers.cap_per_node, 2);
//! assert_eq!(config.placement.search_radius, 20);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::unit_kind::UnitKind;

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed, but the values cannot work.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Build queue contents at game start.
    pub opening: Vec<UnitKind>,
    /// Build order scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Placement search settings.
    pub placement: PlacementConfig,
    /// Worker allocator settings.
    pub workers: WorkerConfig,
    /// Combat commander settings.
    pub combat: CombatConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        use UnitKind::{
            Assimilator, CyberneticsCore, Dragoon, Gateway, Probe, Pylon, Zealot,
        };
        Self {
            opening: vec![
                Probe, Probe, Pylon, Probe, Probe, Gateway, Probe, Probe, Probe, Probe,
                CyberneticsCore, Pylon, Probe, Probe, Zealot, Assimilator, Probe, Gateway,
                Gateway, Probe, Gateway, Pylon, Pylon, Probe, Probe, Pylon, Zealot, Probe,
                Dragoon, Probe, Dragoon, Probe, Dragoon, Probe, Probe, Dragoon,
            ],
            scheduler: SchedulerConfig::default(),
            placement: PlacementConfig::default(),
            workers: WorkerConfig::default(),
            combat: CombatConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string. Missing fields keep their defaults.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers.cap_per_node == 0 {
            return Err(ConfigError::Invalid("workers.cap_per_node must be positive".into()));
        }
        if self.placement.search_radius <= 0 {
            return Err(ConfigError::Invalid("placement.search_radius must be positive".into()));
        }
        if self.combat.arrival_radius <= 0 {
            return Err(ConfigError::Invalid("combat.arrival_radius must be positive".into()));
        }
        let refill = &self.scheduler.refill;
        if !refill.supply.is_supply_structure() {
            return Err(ConfigError::Invalid(format!(
                "scheduler.refill.supply must be a supply structure, got {}",
                refill.supply
            )));
        }
        for kind in [refill.light_melee, refill.ranged] {
            if kind.is_building() {
                return Err(ConfigError::Invalid(format!(
                    "scheduler.refill expects a mobile unit, got structure {kind}"
                )));
            }
        }
        if let Some(kind) = self.opening.iter().find(|k| k.is_resource()) {
            return Err(ConfigError::Invalid(format!("opening cannot contain {kind}")));
        }
        Ok(())
    }
}

/// Build order scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// What to append when the queue runs dry.
    pub refill: RefillConfig,
    /// Frames to wait for a pending structure before giving up on it.
    /// Zero waits forever.
    pub pending_timeout_frames: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refill: RefillConfig::default(),
            pending_timeout_frames: 720,
        }
    }
}

/// Queue refill heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefillConfig {
    /// Queue a supply structure at or below this much unused supply.
    ///
    /// Counted in whole supply units, the same units as
    /// [`UnitKind::supply_required`] and [`PlayerState`](crate::world::PlayerState)
    /// (a Probe costs 1, a Pylon provides 8).
    pub supply_headroom: i32,
    /// Keep at least this many light melee units.
    pub min_light_melee: usize,
    /// Supply structure to queue.
    pub supply: UnitKind,
    /// Cheap filler unit.
    pub light_melee: UnitKind,
    /// Unit queued when gas outpaces minerals.
    pub ranged: UnitKind,
}

impl Default for RefillConfig {
    fn default() -> Self {
        Self {
            supply_headroom: 10,
            min_light_melee: 4,
            supply: UnitKind::Pylon,
            light_melee: UnitKind::Zealot,
            ranged: UnitKind::Dragoon,
        }
    }
}

/// Building placement search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Half-width of the scanned square, in tiles.
    pub search_radius: i32,
    /// How close to a depot-to-resource line a tile may be, in pixels.
    pub path_tolerance: i32,
    /// Resources farther than this from the depot are not guarded, in pixels.
    pub resource_cluster_radius: i32,
    /// Clearance for supply structures while few exist, in tiles.
    pub early_supply_clearance: i32,
    /// Clearance for supply structures afterwards, in tiles.
    pub late_supply_clearance: i32,
    /// Supply structure count at which the late clearance applies.
    pub supply_clearance_threshold: usize,
    /// Clearance for every other structure, in tiles.
    pub structure_clearance: i32,
    /// Buildable margin required around the footprint, in tiles.
    pub wall_buffer: i32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            search_radius: 20,
            path_tolerance: 64,
            resource_cluster_radius: 384,
            early_supply_clearance: 5,
            late_supply_clearance: 2,
            supply_clearance_threshold: 4,
            structure_clearance: 1,
            wall_buffer: 1,
        }
    }
}

/// Worker allocator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Hard limit of harvesters per mineral field or refinery.
    pub cap_per_node: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { cap_per_node: 3 }
    }
}

/// Combat commander settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Distance from the objective that counts as arrived, in pixels.
    pub arrival_radius: i32,
    /// Added to weapon range when looking for threats, in pixels.
    pub weapon_range_buffer: i32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            arrival_radius: 64,
            weapon_range_buffer: 10,
        }
    }
}
