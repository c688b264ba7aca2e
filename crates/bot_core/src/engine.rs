//! Engine facade.
//!
//! [`Engine`] owns every piece of decision state and runs the components in a
//! fixed order once per frame: build order scheduler, worker allocator,
//! combat commander. The adapter that receives the game's callbacks drives it
//! through [`BotEvents`].
//!
//! Adapters that deliver callbacks from several threads wrap the engine in a
//! [`SharedEngine`]. A frame that arrives while another one is still being
//! processed is dropped, never interleaved.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assignments::AssignmentTable;
use crate::build_order::{BuildScheduler, SchedulerStatus};
use crate::combat::{CombatCommander, CombatReport};
use crate::config::EngineConfig;
use crate::math::Position;
use crate::unit_kind::UnitKind;
use crate::workers::{AllocationReport, WorkerAllocator};
use crate::world::{GameWorld, Snapshot, UnitId};

/// Game lifecycle callbacks, one method per event.
pub trait BotEvents {
    /// A new game started.
    fn on_start(&mut self);

    /// One simulation frame. Runs synchronously to completion.
    fn on_frame<W: GameWorld + ?Sized>(&mut self, world: &mut W) -> FrameReport;

    /// A unit left the game.
    fn on_unit_destroyed(&mut self, unit: UnitId);

    /// The game ended.
    fn on_end(&mut self, is_winner: bool);
}

/// Values written by the player-facing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Directives {
    /// Where the army should go. `None` leaves combat units alone.
    pub objective: Option<Position>,
    /// One-shot viewport request, cleared once applied.
    pub camera_request: Option<Position>,
}

/// Everything one frame decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number.
    pub frame: u32,
    /// Scheduler outcome.
    pub scheduler: SchedulerStatus,
    /// Worker allocation outcome.
    pub workers: AllocationReport,
    /// Combat outcome.
    pub combat: CombatReport,
    /// Where the camera was moved, if it was.
    pub camera: Option<Position>,
}

/// Read-only view of the engine for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Last processed frame.
    pub frame: Option<u32>,
    /// Scheduler status text.
    pub scheduler: String,
    /// Queue head.
    pub next: Option<UnitKind>,
    /// Queue length.
    pub queued: usize,
    /// Structure the scheduler is waiting on.
    pub pending: Option<UnitKind>,
}

impl EngineStatus {
    /// Lines shown on screen.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Build: {}", self.scheduler)];
        if let Some(next) = self.next {
            lines.push(format!("Next: {next} ({} queued)", self.queued));
        }
        lines
    }
}

/// What happened to a frame handed to a [`SharedEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The frame ran to completion.
    Completed(FrameReport),
    /// Another frame was still running; this one was skipped.
    Dropped,
}

/// The decision engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    scheduler: BuildScheduler,
    workers: WorkerAllocator,
    combat: CombatCommander,
    assignments: AssignmentTable,
    directives: Directives,
    status: EngineStatus,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine from a configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            scheduler: BuildScheduler::new(
                config.opening.iter().copied(),
                config.scheduler.clone(),
                config.placement.clone(),
            ),
            workers: WorkerAllocator::new(config.workers.clone()),
            combat: CombatCommander::new(config.combat.clone()),
            assignments: AssignmentTable::new(),
            directives: Directives::default(),
            status: EngineStatus::default(),
            config,
        }
    }

    /// Create an engine from a RON configuration file.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Ok(Self::new(EngineConfig::load(path)?))
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Point the army at a location, or stand it down with `None`.
    pub fn set_objective(&mut self, objective: Option<Position>) {
        self.directives.objective = objective;
    }

    /// Ask for the viewport to be centered on `position` next frame.
    pub fn request_camera(&mut self, position: Position) {
        self.directives.camera_request = Some(position);
    }

    /// Current directives.
    #[must_use]
    pub fn directives(&self) -> Directives {
        self.directives
    }

    /// Status after the last frame.
    #[must_use]
    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Build queue, head first.
    #[must_use]
    pub fn queue(&self) -> Vec<UnitKind> {
        self.scheduler.queue().iter().copied().collect()
    }

    /// The scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &BuildScheduler {
        &self.scheduler
    }

    /// Resource assignments.
    #[must_use]
    pub fn assignments(&self) -> &AssignmentTable {
        &self.assignments
    }

    /// Combat commander.
    #[must_use]
    pub fn combat(&self) -> &CombatCommander {
        &self.combat
    }

    fn reset(&mut self) {
        self.scheduler.reset(self.config.opening.iter().copied());
        self.assignments.clear();
        self.combat.clear();
        self.status = EngineStatus::default();
    }

    fn publish_status(&mut self, frame: u32) {
        self.status = EngineStatus {
            frame: Some(frame),
            scheduler: self.scheduler.status().to_string(),
            next: self.scheduler.queue().front().copied(),
            queued: self.scheduler.queue().len(),
            pending: self.scheduler.pending().map(|p| p.kind),
        };
    }
}

impl BotEvents for Engine {
    fn on_start(&mut self) {
        self.reset();
        info!(opening = self.config.opening.len(), "Game started");
    }

    fn on_frame<W: GameWorld + ?Sized>(&mut self, world: &mut W) -> FrameReport {
        let snapshot = Snapshot::capture(&*world);
        let dead = self.assignments.prune_dead(&snapshot);
        if !dead.is_empty() {
            debug!(frame = snapshot.frame, ?dead, "Pruned assignments");
        }

        let scheduler = self
            .scheduler
            .tick(world, &snapshot, &mut self.assignments)
            .clone();
        let workers = self.workers.update(&snapshot, &mut self.assignments, world);
        let combat = self.combat.update(
            &snapshot,
            self.directives.objective,
            &mut self.assignments,
            world,
        );
        let camera = self
            .combat
            .recenter_camera(&mut self.directives.camera_request, world);

        self.publish_status(snapshot.frame);
        for line in self.status.lines() {
            world.draw_status(&line);
        }

        FrameReport {
            frame: snapshot.frame,
            scheduler,
            workers,
            combat,
            camera,
        }
    }

    fn on_unit_destroyed(&mut self, unit: UnitId) {
        self.assignments.remove(unit);
        let orphaned = self.assignments.retain(|_, a| a.target != Some(unit));
        self.combat.forget(unit);
        debug!(unit, orphaned = orphaned.len(), "Unit destroyed");
    }

    fn on_end(&mut self, is_winner: bool) {
        info!(
            is_winner,
            queued = self.scheduler.queue().len(),
            "Game ended"
        );
        self.reset();
    }
}

/// Thread-safe handle to an [`Engine`].
///
/// Frames use `try_lock` on the engine; directives live behind their own lock
/// so the player-facing layer never waits on a running frame.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    engine: Arc<Mutex<Engine>>,
    directives: Arc<Mutex<Directives>>,
}

impl SharedEngine {
    /// Wrap an engine.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        let directives = engine.directives();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            directives: Arc::new(Mutex::new(directives)),
        }
    }

    /// Run one frame unless another is in progress.
    pub fn tick<W: GameWorld + ?Sized>(&self, world: &mut W) -> TickOutcome {
        let mut engine = match self.engine.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                warn!("Frame arrived while another was running, dropped");
                return TickOutcome::Dropped;
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        {
            let mut directives = self.lock_directives();
            engine.directives.objective = directives.objective;
            if let Some(position) = directives.camera_request.take() {
                engine.directives.camera_request = Some(position);
            }
        }

        TickOutcome::Completed(engine.on_frame(world))
    }

    /// See [`BotEvents::on_start`].
    pub fn start(&self) {
        self.lock_engine().on_start();
    }

    /// See [`BotEvents::on_unit_destroyed`].
    pub fn unit_destroyed(&self, unit: UnitId) {
        self.lock_engine().on_unit_destroyed(unit);
    }

    /// See [`BotEvents::on_end`].
    pub fn end(&self, is_winner: bool) {
        self.lock_engine().on_end(is_winner);
    }

    /// Set the army objective.
    pub fn set_objective(&self, objective: Option<Position>) {
        self.lock_directives().objective = objective;
    }

    /// Queue a one-shot camera move.
    pub fn request_camera(&self, position: Position) {
        self.lock_directives().camera_request = Some(position);
    }

    /// Status after the last completed frame.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.lock_engine().status().clone()
    }

    /// Build queue, head first.
    #[must_use]
    pub fn queue(&self) -> Vec<UnitKind> {
        self.lock_engine().queue()
    }

    fn lock_engine(&self) -> MutexGuard<'_, Engine> {
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_directives(&self) -> MutexGuard<'_, Directives> {
        self.directives
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
