//! Resource assignment table.
//!
//! Maps each controlled unit to the job it was given: harvesting a mineral
//! field, harvesting a refinery, constructing, or fighting. Keys are live
//! unit ids; entries for units missing from the current snapshot are pruned
//! before any new assignment is computed.
//!
//! The worker allocator writes the harvest and construction roles, the build
//! order scheduler marks builders, and the combat commander writes the combat
//! role. Iteration is in id order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::world::{Snapshot, UnitId};

/// What a unit has been told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Harvesting the mineral field in `target`.
    HarvestMinerals,
    /// Harvesting the refinery in `target`.
    HarvestGas,
    /// Constructing a structure.
    Construction,
    /// Under the combat commander.
    Combat,
}

/// One row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Job.
    pub role: Role,
    /// Resource node or other target of the job.
    pub target: Option<UnitId>,
    /// Frame the assignment was made.
    pub since_frame: u32,
}

/// Unit id to assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTable {
    entries: BTreeMap<UnitId, Assignment>,
}

impl AssignmentTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or replace a unit's assignment.
    pub fn assign(&mut self, unit: UnitId, role: Role, target: Option<UnitId>, frame: u32) {
        self.entries.insert(
            unit,
            Assignment {
                role,
                target,
                since_frame: frame,
            },
        );
    }

    /// Drop a unit's assignment, returning it.
    pub fn remove(&mut self, unit: UnitId) -> Option<Assignment> {
        self.entries.remove(&unit)
    }

    /// A unit's current assignment.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&Assignment> {
        self.entries.get(&unit)
    }

    /// A unit's role, if assigned.
    #[must_use]
    pub fn role_of(&self, unit: UnitId) -> Option<Role> {
        self.entries.get(&unit).map(|a| a.role)
    }

    /// Whether the unit has any entry.
    #[must_use]
    pub fn contains(&self, unit: UnitId) -> bool {
        self.entries.contains_key(&unit)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries in unit id order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Assignment)> {
        self.entries.iter().map(|(id, a)| (*id, a))
    }

    /// Units holding `role`, in id order.
    pub fn units_with_role(&self, role: Role) -> impl Iterator<Item = UnitId> + '_ {
        self.entries
            .iter()
            .filter(move |(_, a)| a.role == role)
            .map(|(id, _)| *id)
    }

    /// Units holding `role` on `target`, in id order.
    #[must_use]
    pub fn units_on(&self, role: Role, target: UnitId) -> Vec<UnitId> {
        self.entries
            .iter()
            .filter(|(_, a)| a.role == role && a.target == Some(target))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of units per target for `role`.
    #[must_use]
    pub fn load_by_target(&self, role: Role) -> BTreeMap<UnitId, usize> {
        let mut load = BTreeMap::new();
        for assignment in self.entries.values().filter(|a| a.role == role) {
            if let Some(target) = assignment.target {
                *load.entry(target).or_insert(0) += 1;
            }
        }
        load
    }

    /// Keep only entries accepted by `keep`, returning the removed unit ids.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<UnitId>
    where
        F: FnMut(UnitId, &Assignment) -> bool,
    {
        let mut removed = Vec::new();
        self.entries.retain(|id, a| {
            let kept = keep(*id, a);
            if !kept {
                removed.push(*id);
            }
            kept
        });
        removed
    }

    /// Drop entries for units not owned and alive in `snapshot`.
    pub fn prune_dead(&mut self, snapshot: &Snapshot) -> Vec<UnitId> {
        self.retain(|id, _| snapshot.is_own_alive(id))
    }
}
