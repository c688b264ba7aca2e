//! Unit and structure type catalog.
//!
//! [`UnitKind`] is the production item of the build queue and the type tag
//! of every unit in a snapshot. Its static data (costs, build time, footprint,
//! sight and weapon ranges) follows the game's published values so that
//! decisions made from the catalog agree with what the world will accept.
//!
//! Supply is counted in whole units as shown to the player.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every unit type the engine reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    // Protoss
    /// Protoss worker.
    Probe,
    /// Protoss light melee infantry.
    Zealot,
    /// Protoss ranged walker.
    Dragoon,
    /// Protoss resource depot.
    Nexus,
    /// Protoss supply structure.
    Pylon,
    /// Protoss infantry producer.
    Gateway,
    /// Protoss gas extraction structure.
    Assimilator,
    /// Protoss tech structure.
    CyberneticsCore,
    /// Protoss upgrade structure.
    Forge,
    /// Protoss static defense.
    PhotonCannon,

    // Terran
    /// Terran worker.
    Scv,
    /// Terran ranged infantry.
    Marine,
    /// Terran resource depot.
    CommandCenter,
    /// Terran supply structure.
    SupplyDepot,
    /// Terran infantry producer.
    Barracks,
    /// Terran gas extraction structure.
    Refinery,

    // Zerg
    /// Zerg worker.
    Drone,
    /// Zerg light melee unit.
    Zergling,
    /// Zerg flying supply provider.
    Overlord,
    /// Zerg resource depot.
    Hatchery,
    /// Zerg tech structure.
    SpawningPool,
    /// Zerg gas extraction structure.
    Extractor,

    // Neutral
    /// Harvestable mineral patch.
    MineralField,
    /// Gas source; a refinery is built on top of it.
    VespeneGeyser,
}

/// Static per-kind data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KindData {
    minerals: i32,
    gas: i32,
    build_frames: u32,
    supply_required: i32,
    supply_provided: i32,
    tiles: (i32, i32),
    sight: i32,
    ground_range: Option<i32>,
    hit_points: i32,
}

const fn data(
    minerals: i32,
    gas: i32,
    build_frames: u32,
    supply: (i32, i32),
    tiles: (i32, i32),
    sight: i32,
    ground_range: Option<i32>,
    hit_points: i32,
) -> KindData {
    KindData {
        minerals,
        gas,
        build_frames,
        supply_required: supply.0,
        supply_provided: supply.1,
        tiles,
        sight,
        ground_range,
        hit_points,
    }
}

impl UnitKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 24] = [
        Self::Probe,
        Self::Zealot,
        Self::Dragoon,
        Self::Nexus,
        Self::Pylon,
        Self::Gateway,
        Self::Assimilator,
        Self::CyberneticsCore,
        Self::Forge,
        Self::PhotonCannon,
        Self::Scv,
        Self::Marine,
        Self::CommandCenter,
        Self::SupplyDepot,
        Self::Barracks,
        Self::Refinery,
        Self::Drone,
        Self::Zergling,
        Self::Overlord,
        Self::Hatchery,
        Self::SpawningPool,
        Self::Extractor,
        Self::MineralField,
        Self::VespeneGeyser,
    ];

    #[rustfmt::skip]
    const fn data(self) -> KindData {
        match self {
            //                                     min  gas  frames supply  tiles  sight range      hp
            Self::Probe           => data( 50,   0,  300, (1, 0), (1, 1), 256, Some(32),   20),
            Self::Zealot          => data(100,   0,  600, (2, 0), (1, 1), 224, Some(15),  100),
            Self::Dragoon         => data(125,  50,  750, (2, 0), (1, 1), 256, Some(128), 100),
            Self::Nexus           => data(400,   0, 1800, (0, 9), (4, 3), 352, None,      750),
            Self::Pylon           => data(100,   0,  450, (0, 8), (2, 2), 256, None,      300),
            Self::Gateway         => data(150,   0,  900, (0, 0), (4, 3), 320, None,      500),
            Self::Assimilator     => data(100,   0,  600, (0, 0), (4, 2), 320, None,      450),
            Self::CyberneticsCore => data(200,   0,  900, (0, 0), (3, 2), 320, None,      500),
            Self::Forge           => data(150,   0,  600, (0, 0), (3, 2), 320, None,      550),
            Self::PhotonCannon    => data(150,   0,  750, (0, 0), (2, 2), 352, Some(224), 100),
            Self::Scv             => data( 50,   0,  300, (1, 0), (1, 1), 224, Some(10),   60),
            Self::Marine          => data( 50,   0,  360, (1, 0), (1, 1), 224, Some(128),  40),
            Self::CommandCenter   => data(400,   0, 1800, (0, 10), (4, 3), 320, None,    1500),
            Self::SupplyDepot     => data(100,   0,  600, (0, 8), (3, 2), 256, None,      500),
            Self::Barracks        => data(150,   0, 1200, (0, 0), (4, 3), 256, None,     1000),
            Self::Refinery        => data(100,   0,  600, (0, 0), (4, 2), 256, None,      750),
            Self::Drone           => data( 50,   0,  300, (1, 0), (1, 1), 224, Some(32),   40),
            Self::Zergling        => data( 50,   0,  420, (1, 0), (1, 1), 160, Some(15),   35),
            Self::Overlord        => data(100,   0,  600, (0, 8), (1, 1), 352, None,      200),
            Self::Hatchery        => data(300,   0, 1800, (0, 1), (4, 3), 352, None,     1250),
            Self::SpawningPool    => data(200,   0, 1200, (0, 0), (3, 2), 256, None,      750),
            Self::Extractor       => data( 50,   0,  600, (0, 0), (4, 2), 256, None,      750),
            Self::MineralField    => data(  0,   0,    0, (0, 0), (2, 1), 288, None,        0),
            Self::VespeneGeyser   => data(  0,   0,    0, (0, 0), (4, 2), 288, None,        0),
        }
    }

    /// Mineral price.
    #[must_use]
    pub const fn mineral_cost(self) -> i32 {
        self.data().minerals
    }

    /// Gas price.
    #[must_use]
    pub const fn gas_cost(self) -> i32 {
        self.data().gas
    }

    /// Production or construction time in frames.
    #[must_use]
    pub const fn build_frames(self) -> u32 {
        self.data().build_frames
    }

    /// Supply consumed by one unit of this kind.
    #[must_use]
    pub const fn supply_required(self) -> i32 {
        self.data().supply_required
    }

    /// Supply capacity added once this unit is complete.
    #[must_use]
    pub const fn supply_provided(self) -> i32 {
        self.data().supply_provided
    }

    /// Footprint width in tiles.
    #[must_use]
    pub const fn tile_width(self) -> i32 {
        self.data().tiles.0
    }

    /// Footprint height in tiles.
    #[must_use]
    pub const fn tile_height(self) -> i32 {
        self.data().tiles.1
    }

    /// Sight range in pixels.
    #[must_use]
    pub const fn sight_range(self) -> i32 {
        self.data().sight
    }

    /// Maximum range of the ground weapon in pixels, if the kind has one.
    #[must_use]
    pub const fn ground_weapon_range(self) -> Option<i32> {
        self.data().ground_range
    }

    /// Hit points of a freshly completed unit.
    #[must_use]
    pub const fn max_hit_points(self) -> i32 {
        self.data().hit_points
    }

    /// Stationary structure (including neutral resources).
    #[must_use]
    pub const fn is_building(self) -> bool {
        matches!(
            self,
            Self::Nexus
                | Self::Pylon
                | Self::Gateway
                | Self::Assimilator
                | Self::CyberneticsCore
                | Self::Forge
                | Self::PhotonCannon
                | Self::CommandCenter
                | Self::SupplyDepot
                | Self::Barracks
                | Self::Refinery
                | Self::Hatchery
                | Self::SpawningPool
                | Self::Extractor
                | Self::MineralField
                | Self::VespeneGeyser
        )
    }

    /// Harvesting unit.
    #[must_use]
    pub const fn is_worker(self) -> bool {
        matches!(self, Self::Probe | Self::Scv | Self::Drone)
    }

    /// Structure that accepts harvested resources and trains workers.
    #[must_use]
    pub const fn is_resource_depot(self) -> bool {
        matches!(self, Self::Nexus | Self::CommandCenter | Self::Hatchery)
    }

    /// Gas extraction structure; must be placed on a geyser.
    #[must_use]
    pub const fn is_refinery(self) -> bool {
        matches!(self, Self::Assimilator | Self::Refinery | Self::Extractor)
    }

    /// Adds supply capacity.
    #[must_use]
    pub const fn is_supply_provider(self) -> bool {
        self.data().supply_provided > 0
    }

    /// Dedicated supply structure (not a depot that also happens to give supply).
    #[must_use]
    pub const fn is_supply_structure(self) -> bool {
        self.is_building() && self.is_supply_provider() && !self.is_resource_depot()
    }

    /// Mineral patch.
    #[must_use]
    pub const fn is_mineral_field(self) -> bool {
        matches!(self, Self::MineralField)
    }

    /// Raw vespene geyser.
    #[must_use]
    pub const fn is_geyser(self) -> bool {
        matches!(self, Self::VespeneGeyser)
    }

    /// Neutral resource node of either type.
    #[must_use]
    pub const fn is_resource(self) -> bool {
        self.is_mineral_field() || self.is_geyser()
    }

    /// Has a weapon that can hit ground targets.
    #[must_use]
    pub const fn can_attack(self) -> bool {
        self.ground_weapon_range().is_some()
    }

    /// The kind that produces this one: a depot or barracks for units,
    /// a worker for structures, nothing for neutral resources.
    #[must_use]
    pub const fn what_builds(self) -> Option<Self> {
        match self {
            Self::Probe => Some(Self::Nexus),
            Self::Zealot | Self::Dragoon => Some(Self::Gateway),
            Self::Nexus
            | Self::Pylon
            | Self::Gateway
            | Self::Assimilator
            | Self::CyberneticsCore
            | Self::Forge
            | Self::PhotonCannon => Some(Self::Probe),
            Self::Scv => Some(Self::CommandCenter),
            Self::Marine => Some(Self::Barracks),
            Self::CommandCenter
            | Self::SupplyDepot
            | Self::Barracks
            | Self::Refinery => Some(Self::Scv),
            Self::Drone | Self::Zergling | Self::Overlord => Some(Self::Hatchery),
            Self::Hatchery | Self::SpawningPool | Self::Extractor => Some(Self::Drone),
            Self::MineralField | Self::VespeneGeyser => None,
        }
    }

    /// Structures that must exist before this kind can be produced.
    #[must_use]
    pub const fn requirements(self) -> &'static [Self] {
        match self {
            Self::Gateway | Self::Forge => &[Self::Pylon],
            Self::CyberneticsCore => &[Self::Gateway],
            Self::Dragoon => &[Self::CyberneticsCore],
            Self::PhotonCannon => &[Self::Forge],
            Self::Barracks => &[Self::CommandCenter],
            Self::Zergling => &[Self::SpawningPool],
            _ => &[],
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Probe => "Probe",
            Self::Zealot => "Zealot",
            Self::Dragoon => "Dragoon",
            Self::Nexus => "Nexus",
            Self::Pylon => "Pylon",
            Self::Gateway => "Gateway",
            Self::Assimilator => "Assimilator",
            Self::CyberneticsCore => "Cybernetics Core",
            Self::Forge => "Forge",
            Self::PhotonCannon => "Photon Cannon",
            Self::Scv => "SCV",
            Self::Marine => "Marine",
            Self::CommandCenter => "Command Center",
            Self::SupplyDepot => "Supply Depot",
            Self::Barracks => "Barracks",
            Self::Refinery => "Refinery",
            Self::Drone => "Drone",
            Self::Zergling => "Zergling",
            Self::Overlord => "Overlord",
            Self::Hatchery => "Hatchery",
            Self::SpawningPool => "Spawning Pool",
            Self::Extractor => "Extractor",
            Self::MineralField => "Mineral Field",
            Self::VespeneGeyser => "Vespene Geyser",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
