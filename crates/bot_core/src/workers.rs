//! Worker allocation.
//!
//! Every frame each completed worker is matched to a mineral field, a
//! refinery or a construction job, with a hard cap on harvesters per node.
//! The pass runs in a fixed order:
//!
//! 1. prune entries for dead workers and for nodes that vanished;
//! 2. release workers from nodes over the cap (farthest first);
//! 3. top up every completed refinery from the nearest mineral workers;
//! 4. send idle or unassigned workers to the nearest mineral field below cap.
//!
//! Nodes at capacity are never candidates. A worker with nowhere to go stays
//! unassigned and is retried next frame.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assignments::{AssignmentTable, Role};
use crate::config::WorkerConfig;
use crate::world::{CommandSink, Snapshot, UnitCommand, UnitId, UnitView};

/// What one allocation pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Entries dropped for dead units or vanished nodes.
    pub pruned: usize,
    /// Workers released from over-capacity nodes.
    pub released: usize,
    /// Workers moved onto refineries.
    pub to_gas: usize,
    /// Workers sent to mineral fields.
    pub to_minerals: usize,
    /// Workers left without a node.
    pub unplaced: usize,
    /// Gather commands the world refused.
    pub rejected: usize,
}

/// Assigns harvesting units to resource nodes.
#[derive(Debug, Clone, Default)]
pub struct WorkerAllocator {
    config: WorkerConfig,
}

impl WorkerAllocator {
    /// Create an allocator with the given settings.
    #[must_use]
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Harvester cap per node.
    #[must_use]
    pub fn cap(&self) -> usize {
        self.config.cap_per_node
    }

    /// Run one allocation pass.
    pub fn update<C: CommandSink + ?Sized>(
        &mut self,
        snapshot: &Snapshot,
        assignments: &mut AssignmentTable,
        sink: &mut C,
    ) -> AllocationReport {
        let mut report = AllocationReport {
            pruned: prune(snapshot, assignments),
            released: self.release_over_capacity(snapshot, assignments),
            ..AllocationReport::default()
        };

        self.fill_refineries(snapshot, assignments, sink, &mut report);
        self.place_free_workers(snapshot, assignments, sink, &mut report);

        if report != AllocationReport::default() {
            debug!(frame = snapshot.frame, ?report, "Worker allocation");
        }
        report
    }

    /// Drop workers from any node holding more than the cap, farthest first.
    fn release_over_capacity(&self, snapshot: &Snapshot, assignments: &mut AssignmentTable) -> usize {
        let mut released = 0;
        for role in [Role::HarvestMinerals, Role::HarvestGas] {
            for (node, load) in assignments.load_by_target(role) {
                if load <= self.cap() {
                    continue;
                }
                let Some(node_pos) = node_position(snapshot, role, node) else {
                    continue;
                };
                let mut workers: Vec<(i64, UnitId)> = assignments
                    .units_on(role, node)
                    .into_iter()
                    .filter_map(|id| snapshot.own_unit(id))
                    .map(|w| (w.position.distance_squared(node_pos), w.id))
                    .collect();
                // Farthest first, higher id first on ties.
                workers.sort_unstable_by(|a, b| b.cmp(a));
                for (_, id) in workers.into_iter().take(load - self.cap()) {
                    assignments.remove(id);
                    released += 1;
                    debug!(worker = id, node, "Released worker from over-capacity node");
                }
            }
        }
        released
    }

    fn fill_refineries<C: CommandSink + ?Sized>(
        &self,
        snapshot: &Snapshot,
        assignments: &mut AssignmentTable,
        sink: &mut C,
        report: &mut AllocationReport,
    ) {
        for refinery in snapshot.refineries() {
            let on_gas = assignments.units_on(Role::HarvestGas, refinery.id).len();
            let shortfall = self.cap().saturating_sub(on_gas);
            if shortfall == 0 {
                continue;
            }

            let mut miners: Vec<&UnitView> = assignments
                .units_with_role(Role::HarvestMinerals)
                .filter_map(|id| snapshot.own_unit(id))
                .collect();
            miners.sort_by_key(|w| (w.position.distance_squared(refinery.position), w.id));

            for worker in miners.into_iter().take(shortfall) {
                let command = UnitCommand::Gather {
                    worker: worker.id,
                    node: refinery.id,
                };
                match sink.issue(command) {
                    Ok(()) => {
                        assignments.assign(worker.id, Role::HarvestGas, Some(refinery.id), snapshot.frame);
                        report.to_gas += 1;
                    }
                    Err(err) => {
                        warn!(worker = worker.id, refinery = refinery.id, %err, "Gas assignment rejected");
                        report.rejected += 1;
                    }
                }
            }
        }
    }

    fn place_free_workers<C: CommandSink + ?Sized>(
        &self,
        snapshot: &Snapshot,
        assignments: &mut AssignmentTable,
        sink: &mut C,
        report: &mut AllocationReport,
    ) {
        let mut load = assignments.load_by_target(Role::HarvestMinerals);

        for worker in snapshot.workers() {
            let current = assignments.get(worker.id).copied();
            match current {
                // Walking to the build site, or ordered this very frame.
                Some(a) if a.role == Role::Construction
                    && (!worker.is_idle() || a.since_frame == snapshot.frame) => continue,
                Some(a) if a.role == Role::Combat => continue,
                // Idle on gas: put it back on its own refinery.
                Some(a) if a.role == Role::HarvestGas && worker.is_idle() => {
                    if let Some(refinery) = a.target {
                        if let Err(err) = sink.issue(UnitCommand::Gather {
                            worker: worker.id,
                            node: refinery,
                        }) {
                            warn!(worker = worker.id, refinery, %err, "Gas gather rejected");
                            report.rejected += 1;
                        }
                    }
                    continue;
                }
                Some(_) if !worker.is_idle() => continue,
                _ => {}
            }

            if let Some(previous) = current {
                assignments.remove(worker.id);
                if previous.role == Role::HarvestMinerals {
                    if let Some(count) = previous.target.and_then(|t| load.get_mut(&t)) {
                        *count = count.saturating_sub(1);
                    }
                }
            }

            let nearest = snapshot
                .minerals
                .iter()
                .filter(|m| load.get(&m.id).copied().unwrap_or(0) < self.cap())
                .min_by_key(|m| (m.position.distance_squared(worker.position), m.id));

            let Some(mineral) = nearest else {
                report.unplaced += 1;
                continue;
            };

            match sink.issue(UnitCommand::Gather {
                worker: worker.id,
                node: mineral.id,
            }) {
                Ok(()) => {
                    assignments.assign(worker.id, Role::HarvestMinerals, Some(mineral.id), snapshot.frame);
                    *load.entry(mineral.id).or_insert(0) += 1;
                    report.to_minerals += 1;
                }
                Err(err) => {
                    warn!(worker = worker.id, mineral = mineral.id, %err, "Mineral assignment rejected");
                    report.rejected += 1;
                }
            }
        }
    }
}

/// Drop entries whose unit died or whose harvest target is gone.
fn prune(snapshot: &Snapshot, assignments: &mut AssignmentTable) -> usize {
    assignments
        .retain(|id, a| {
            snapshot.is_own_alive(id)
                && match (a.role, a.target) {
                    (Role::HarvestMinerals, Some(node)) => snapshot.mineral(node).is_some(),
                    (Role::HarvestGas, Some(node)) => snapshot
                        .own_unit(node)
                        .is_some_and(|r| r.kind.is_refinery()),
                    _ => true,
                }
        })
        .len()
}

fn node_position(snapshot: &Snapshot, role: Role, node: UnitId) -> Option<crate::math::Position> {
    match role {
        Role::HarvestMinerals => snapshot.mineral(node).map(|m| m.position),
        Role::HarvestGas => snapshot.own_unit(node).map(|r| r.position),
        Role::Construction | Role::Combat => None,
    }
}
