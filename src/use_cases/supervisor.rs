// Spawn/reap supervision for entity tasks.
//
// Spawning reserves against the run total first and rolls the reservation back
// on every failure path, so `spawned` never drifts. Shutdown collects task
// handles one region at a time and joins them with no lock held.

use super::actor::run_actor;
use super::world::World;
use crate::domain::{Actor, EndReason, Position, SlotKey, TaskKind, TaskLauncher};
use futures::FutureExt;
use futures::future::join_all;
use rand::Rng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, trace, warn};

// Upper bound on shutdown sweeps for tasks that were mid-launch when the
// termination flag went up.
const MAX_REAP_SWEEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(SlotKey),
    // Every target of the run has already been spawned.
    Exhausted,
    NoFreeSlot,
    LaunchFailed,
}

/// Handles of the two long-lived loops joined at shutdown.
#[derive(Debug, Default)]
pub struct LoopHandles {
    pub input: Option<JoinHandle<()>>,
    pub reloader: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownReport {
    pub entities_joined: usize,
    pub loops_joined: usize,
    // Entity tasks joined by the per-frame reap before shutdown began.
    pub reaped_during_run: usize,
    pub panicked: usize,
}

pub struct Supervisor {
    world: Arc<World>,
    launcher: Arc<dyn TaskLauncher>,
    rng: StdRng,
    reaped: usize,
    reaped_panicked: usize,
}

impl Supervisor {
    pub fn new(world: Arc<World>, launcher: Arc<dyn TaskLauncher>, rng: StdRng) -> Self {
        Self {
            world,
            launcher,
            rng,
            reaped: 0,
            reaped_panicked: 0,
        }
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Randomized wait before the next spawn attempt.
    pub fn next_spawn_delay(&mut self) -> Duration {
        self.world.difficulty().spawn_interval(&mut self.rng)
    }

    /// Spawns one target at a random column on the entry row.
    pub fn spawn_actor(&mut self) -> SpawnOutcome {
        let width = self.world.viewport().width.max(1);
        let column = self.rng.gen_range(0..width);
        self.spawn_actor_at(column)
    }

    pub fn spawn_actor_at(&mut self, column: i32) -> SpawnOutcome {
        if !self.world.with_run(|run| run.reserve_spawn()) {
            return SpawnOutcome::Exhausted;
        }

        let viewport = self.world.viewport();
        let position = Position::new(viewport.clamp_column(column), viewport.entry_row());
        let Some(key) = self
            .world
            .with_actors(|actors| actors.occupy(Actor::spawn(position)))
        else {
            self.world.with_run(|run| run.rollback_spawn());
            debug!("actor table full; spawn deferred");
            return SpawnOutcome::NoFreeSlot;
        };

        let task = run_actor(self.world.clone(), key).boxed();
        match self.launcher.launch(TaskKind::Actor, task) {
            Ok(handle) => {
                if !self
                    .world
                    .with_actors(|actors| actors.attach_handle(key, handle))
                {
                    trace!(slot = key.index, "actor finished before its handle was attached");
                }
                info!(slot = key.index, x = position.x, y = position.y, "actor spawned");
                SpawnOutcome::Spawned(key)
            }
            Err(error) => {
                warn!(%error, slot = key.index, "actor launch failed; rolling back spawn");
                self.world.with_actors(|actors| actors.vacate(key));
                self.world.with_run(|run| run.rollback_spawn());
                SpawnOutcome::LaunchFailed
            }
        }
    }

    /// Joins entity tasks that already vacated their slot. Returns (joined, panicked).
    pub async fn reap_finished(&mut self) -> (usize, usize) {
        let mut handles = self.world.with_actors(|actors| actors.take_finished());
        handles.extend(
            self.world
                .with_projectiles(|projectiles| projectiles.take_finished()),
        );
        let (joined, panicked) = join_handles(handles).await;
        self.reaped += joined;
        self.reaped_panicked += panicked;
        (joined, panicked)
    }

    /// Joins every outstanding entity task, live or finished. Returns (joined, panicked).
    pub async fn reap_entities(&self) -> (usize, usize) {
        let mut handles = self.world.with_actors(|actors| actors.take_handles());
        handles.extend(
            self.world
                .with_projectiles(|projectiles| projectiles.take_handles()),
        );
        join_handles(handles).await
    }

    /// Terminates the run and joins every task it started plus the two loops.
    pub async fn shutdown(&self, loops: LoopHandles) -> ShutdownReport {
        self.world.terminate(EndReason::Shutdown);
        let mut report = ShutdownReport {
            reaped_during_run: self.reaped,
            panicked: self.reaped_panicked,
            ..ShutdownReport::default()
        };

        self.drain_entities(&mut report).await;

        for handle in [loops.input, loops.reloader].into_iter().flatten() {
            if let Err(error) = handle.await {
                log_join_error(&error);
                report.panicked += 1;
            }
            report.loops_joined += 1;
        }

        // A fire racing the flag may have launched a shot before the input loop stopped.
        self.drain_entities(&mut report).await;

        info!(
            entities = report.entities_joined,
            loops = report.loops_joined,
            panicked = report.panicked,
            "shutdown complete"
        );
        report
    }

    async fn drain_entities(&self, report: &mut ShutdownReport) {
        for sweep in 0..MAX_REAP_SWEEPS {
            let (joined, panicked) = self.reap_entities().await;
            report.entities_joined += joined;
            report.panicked += panicked;
            let population = self.world.population();
            if population.actors == 0 && population.projectiles == 0 {
                return;
            }
            debug!(
                sweep,
                actors = population.actors,
                projectiles = population.projectiles,
                "entities still exiting"
            );
            tokio::task::yield_now().await;
        }
        warn!("entities still registered after shutdown sweeps");
    }
}

async fn join_handles(handles: Vec<JoinHandle<()>>) -> (usize, usize) {
    let joined = handles.len();
    let panicked = join_all(handles)
        .await
        .into_iter()
        .filter_map(Result::err)
        .inspect(log_join_error)
        .count();
    (joined, panicked)
}

fn log_join_error(error: &JoinError) {
    if error.is_panic() {
        error!(%error, "task panicked");
    } else {
        warn!(%error, "task cancelled");
    }
}
