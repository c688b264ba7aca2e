//! Build order scheduler.
//!
//! Owns the production queue and makes at most one production decision per
//! frame. The queue head is only removed on confirmed progress:
//!
//! - a trainable unit is popped as soon as its train command is accepted;
//! - a structure is popped once the live count of its kind reaches the
//!   target recorded when the build command was accepted.
//!
//! While that pending record exists nothing else is produced. Every failure
//! becomes a [`SchedulerStatus::Blocked`] and is retried next frame.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info, warn};

use crate::assignments::{AssignmentTable, Role};
use crate::config::{PlacementConfig, SchedulerConfig};
use crate::error::ScheduleError;
use crate::math::TilePosition;
use crate::placement;
use crate::unit_kind::UnitKind;
use crate::world::{GameWorld, Snapshot, UnitCommand, UnitId};

/// A structure whose build command was accepted but which has not appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConstruction {
    /// Structure kind.
    pub kind: UnitKind,
    /// Live count of `kind` that confirms the start.
    pub target_count: usize,
    /// Worker sent to build it.
    pub builder: UnitId,
    /// Frame the command was accepted.
    pub issued_frame: u32,
}

/// Outcome of the most recent scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SchedulerStatus {
    /// Not ticked yet.
    #[default]
    Idle,
    /// A pending structure has not appeared yet.
    Waiting(UnitKind),
    /// A pending structure appeared and was removed from the queue.
    ConstructionStarted(UnitKind),
    /// A build command was accepted.
    BuildOrdered {
        /// Structure kind.
        kind: UnitKind,
        /// Chosen top-left tile.
        at: TilePosition,
        /// Worker sent.
        builder: UnitId,
    },
    /// A train command was accepted and the item removed from the queue.
    Trained {
        /// Unit kind.
        kind: UnitKind,
        /// Structure training it.
        producer: UnitId,
    },
    /// No progress this frame.
    Blocked(ScheduleError),
}

impl SchedulerStatus {
    /// Whether this tick removed the queue head.
    #[must_use]
    pub const fn popped(&self) -> bool {
        matches!(self, Self::ConstructionStarted(_) | Self::Trained { .. })
    }
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Waiting(kind) => write!(f, "Waiting for {kind} construction to start"),
            Self::ConstructionStarted(kind) => write!(f, "{kind} construction started"),
            Self::BuildOrdered { kind, at, .. } => write!(f, "Building {kind} at {at}"),
            Self::Trained { kind, .. } => write!(f, "Training {kind}"),
            Self::Blocked(err) => write!(f, "{err}"),
        }
    }
}

/// FIFO production queue plus the pending construction gate.
#[derive(Debug, Clone)]
pub struct BuildScheduler {
    queue: VecDeque<UnitKind>,
    pending: Option<PendingConstruction>,
    status: SchedulerStatus,
    config: SchedulerConfig,
    placement: PlacementConfig,
}

impl BuildScheduler {
    /// Create a scheduler with `opening` as the initial queue.
    #[must_use]
    pub fn new(
        opening: impl IntoIterator<Item = UnitKind>,
        config: SchedulerConfig,
        placement: PlacementConfig,
    ) -> Self {
        Self {
            queue: opening.into_iter().collect(),
            pending: None,
            status: SchedulerStatus::Idle,
            config,
            placement,
        }
    }

    /// Current queue, head first.
    #[must_use]
    pub fn queue(&self) -> &VecDeque<UnitKind> {
        &self.queue
    }

    /// The pending construction record, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingConstruction> {
        self.pending.as_ref()
    }

    /// Result of the last tick.
    #[must_use]
    pub fn status(&self) -> &SchedulerStatus {
        &self.status
    }

    /// Append an item at the tail.
    pub fn push(&mut self, kind: UnitKind) {
        self.queue.push_back(kind);
    }

    /// Replace the queue and drop any pending record.
    pub fn reset(&mut self, opening: impl IntoIterator<Item = UnitKind>) {
        self.queue = opening.into_iter().collect();
        self.pending = None;
        self.status = SchedulerStatus::Idle;
    }

    /// Make at most one production decision.
    pub fn tick<W: GameWorld + ?Sized>(
        &mut self,
        world: &mut W,
        snapshot: &Snapshot,
        assignments: &mut AssignmentTable,
    ) -> &SchedulerStatus {
        self.status = self.decide(world, snapshot, assignments);
        &self.status
    }

    fn decide<W: GameWorld + ?Sized>(
        &mut self,
        world: &mut W,
        snapshot: &Snapshot,
        assignments: &mut AssignmentTable,
    ) -> SchedulerStatus {
        if let Some(pending) = self.pending {
            return self.check_pending(pending, snapshot, assignments);
        }

        if self.queue.is_empty() {
            let kind = self.refill(snapshot);
            debug!(kind = %kind, "Build queue empty, refilled");
            self.queue.push_back(kind);
        }
        let Some(&kind) = self.queue.front() else {
            return SchedulerStatus::Idle;
        };

        let player = snapshot.player;
        if !player.can_afford(kind) {
            return SchedulerStatus::Blocked(ScheduleError::InsufficientResources {
                kind,
                have_minerals: player.minerals,
                need_minerals: kind.mineral_cost(),
                have_gas: player.gas,
                need_gas: kind.gas_cost(),
            });
        }

        let result = if kind.is_building() {
            self.order_structure(world, snapshot, assignments, kind)
        } else {
            self.train_unit(world, snapshot, kind)
        };
        result.unwrap_or_else(|err| {
            debug!(frame = snapshot.frame, %err, "Build order blocked");
            SchedulerStatus::Blocked(err)
        })
    }

    fn check_pending(
        &mut self,
        pending: PendingConstruction,
        snapshot: &Snapshot,
        assignments: &mut AssignmentTable,
    ) -> SchedulerStatus {
        let count = snapshot.count_own(pending.kind);
        if count >= pending.target_count {
            self.pending = None;
            self.queue.pop_front();
            info!(
                kind = %pending.kind,
                count,
                remaining = self.queue.len(),
                "Construction started"
            );
            return SchedulerStatus::ConstructionStarted(pending.kind);
        }

        let waited = snapshot.frame.saturating_sub(pending.issued_frame);
        let timeout = self.config.pending_timeout_frames;
        if timeout > 0 && waited >= timeout {
            self.pending = None;
            if assignments.role_of(pending.builder) == Some(Role::Construction) {
                assignments.remove(pending.builder);
            }
            warn!(
                kind = %pending.kind,
                builder = pending.builder,
                waited,
                "Pending construction abandoned"
            );
            return SchedulerStatus::Blocked(ScheduleError::ConstructionAbandoned {
                kind: pending.kind,
                frames: waited,
            });
        }

        SchedulerStatus::Waiting(pending.kind)
    }

    fn order_structure<W: GameWorld + ?Sized>(
        &mut self,
        world: &mut W,
        snapshot: &Snapshot,
        assignments: &mut AssignmentTable,
        kind: UnitKind,
    ) -> Result<SchedulerStatus, ScheduleError> {
        let builder = pick_builder(snapshot, assignments, kind).ok_or(ScheduleError::NoBuilder(kind))?;

        let candidates = placement::search(
            &*world,
            snapshot,
            kind,
            snapshot.player.start_location,
            &self.placement,
        );
        let at = placement::choose(&candidates).ok_or(ScheduleError::NoPlacement(kind))?;

        world
            .issue(UnitCommand::Build { builder, kind, at })
            .map_err(|source| {
                warn!(kind = %kind, builder, at = %at, %source, "Build command rejected");
                ScheduleError::CommandRejected { kind, source }
            })?;

        let target_count = snapshot.count_own(kind) + 1;
        assignments.assign(builder, Role::Construction, None, snapshot.frame);
        self.pending = Some(PendingConstruction {
            kind,
            target_count,
            builder,
            issued_frame: snapshot.frame,
        });
        info!(kind = %kind, builder, at = %at, target_count, "Build ordered");
        Ok(SchedulerStatus::BuildOrdered { kind, at, builder })
    }

    fn train_unit<W: GameWorld + ?Sized>(
        &mut self,
        world: &mut W,
        snapshot: &Snapshot,
        kind: UnitKind,
    ) -> Result<SchedulerStatus, ScheduleError> {
        let producer_kind = kind.what_builds().ok_or(ScheduleError::NoProducer {
            kind,
            producer: kind,
        })?;
        let producer = snapshot
            .own
            .iter()
            .filter(|u| u.kind == producer_kind && u.is_completed)
            .min_by_key(|u| u.training_queue)
            .map(|u| u.id)
            .ok_or(ScheduleError::NoProducer {
                kind,
                producer: producer_kind,
            })?;

        world
            .issue(UnitCommand::Train { producer, kind })
            .map_err(|source| {
                warn!(kind = %kind, producer, %source, "Train command rejected");
                ScheduleError::CommandRejected { kind, source }
            })?;

        self.queue.pop_front();
        info!(kind = %kind, producer, remaining = self.queue.len(), "Training");
        Ok(SchedulerStatus::Trained { kind, producer })
    }

    /// Choose one item to append when the queue runs dry.
    #[must_use]
    pub fn refill(&self, snapshot: &Snapshot) -> UnitKind {
        let rules = &self.config.refill;
        let player = snapshot.player;
        if player.supply_headroom() <= rules.supply_headroom {
            rules.supply
        } else if snapshot.count_own(rules.light_melee) < rules.min_light_melee {
            rules.light_melee
        } else if player.gas > player.minerals {
            rules.ranged
        } else {
            rules.light_melee
        }
    }
}

/// Lowest-id idle worker not already constructing, else the lowest-id
/// mineral harvester. Gas harvesters are never pulled.
fn pick_builder(snapshot: &Snapshot, assignments: &AssignmentTable, kind: UnitKind) -> Option<UnitId> {
    let producer = kind.what_builds()?;
    let candidates = || snapshot.workers().filter(move |w| w.kind == producer);

    candidates()
        .find(|w| {
            w.is_idle()
                && !matches!(
                    assignments.role_of(w.id),
                    Some(Role::Construction | Role::HarvestGas)
                )
        })
        .or_else(|| {
            candidates().find(|w| assignments.role_of(w.id) == Some(Role::HarvestMinerals))
        })
        .map(|w| w.id)
}
