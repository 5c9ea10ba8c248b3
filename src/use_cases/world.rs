// World State Store: one owner for all mutable run state, split into regions
// that each carry their own lock.
//
// Access goes through the `with_*` accessors. The closure receives the region
// for the duration of the lock and may only return owned values, so no caller
// keeps a live reference once the lock is released. Never `.await` or sleep
// inside an accessor.
//
// Lock order where two regions are held together (fire action only):
// bays -> projectiles. Every other path holds one region at a time.

use crate::domain::geometry::{MIN_SURFACE_HEIGHT, MIN_SURFACE_WIDTH};
use crate::domain::{
    Actor, CombatTuning, DifficultyConfig, EndReason, LaunchBay, Position, Projectile,
    RunCounters, RunState, SlotTable, ViewportMetrics,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;
use tokio::sync::futures::Notified;
use tokio::sync::{Notify, mpsc};
use tracing::{info, trace};

/// Default storage bounds for concurrently live entities.
pub const MAX_ACTORS: usize = 80;
pub const MAX_PROJECTILES: usize = 150;
pub const MAX_BAYS: usize = 15;

// Hit positions queued for the publisher's marker ring.
const HIT_FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldLimits {
    pub max_actors: usize,
    pub max_projectiles: usize,
}

impl Default for WorldLimits {
    fn default() -> Self {
        Self {
            max_actors: MAX_ACTORS,
            max_projectiles: MAX_PROJECTILES,
        }
    }
}

/// Everything needed to build a world; consumed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSettings {
    pub difficulty: DifficultyConfig,
    pub combat: CombatTuning,
    pub limits: WorldLimits,
    pub viewport: ViewportMetrics,
}

impl WorldSettings {
    pub fn new(difficulty: DifficultyConfig) -> Self {
        Self {
            difficulty,
            combat: CombatTuning::default(),
            limits: WorldLimits::default(),
            viewport: ViewportMetrics::default(),
        }
    }
}

/// Live entity counts, copied out of their regions one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Population {
    pub actors: usize,
    pub projectiles: usize,
}

pub struct World {
    // Immutable after init; read without a lock.
    difficulty: DifficultyConfig,
    combat: CombatTuning,

    actors: Mutex<SlotTable<Actor>>,
    projectiles: Mutex<SlotTable<Projectile>>,
    bays: Mutex<Vec<LaunchBay>>,
    run: Mutex<RunState>,
    viewport: Mutex<ViewportMetrics>,

    // Condition signal for the replenishment loop: a bay became empty.
    bay_emptied: Notify,

    // Process-wide termination flag; the only state read without a lock.
    terminated: AtomicBool,
    end_reason: OnceLock<EndReason>,
    shutdown: Notify,

    hit_tx: mpsc::Sender<Position>,
    hit_rx: Mutex<Option<mpsc::Receiver<Position>>>,
}

impl World {
    pub fn new(settings: WorldSettings) -> Arc<Self> {
        let WorldSettings {
            difficulty,
            combat,
            limits,
            viewport,
        } = settings;
        let bay_count = difficulty.bay_count.min(MAX_BAYS);
        let (hit_tx, hit_rx) = mpsc::channel(HIT_FEED_CAPACITY);

        Arc::new(Self {
            difficulty,
            combat,
            actors: Mutex::new(SlotTable::with_capacity(limits.max_actors)),
            projectiles: Mutex::new(SlotTable::with_capacity(limits.max_projectiles)),
            // Bays start empty; the replenishment loop fills them.
            bays: Mutex::new(vec![LaunchBay::default(); bay_count]),
            run: Mutex::new(RunState::new(difficulty.total_targets, viewport)),
            viewport: Mutex::new(viewport),
            bay_emptied: Notify::new(),
            terminated: AtomicBool::new(false),
            end_reason: OnceLock::new(),
            shutdown: Notify::new(),
            hit_tx,
            hit_rx: Mutex::new(Some(hit_rx)),
        })
    }

    pub fn difficulty(&self) -> &DifficultyConfig {
        &self.difficulty
    }

    pub fn combat(&self) -> &CombatTuning {
        &self.combat
    }

    pub fn with_actors<R>(&self, f: impl FnOnce(&mut SlotTable<Actor>) -> R) -> R {
        f(&mut lock(&self.actors))
    }

    pub fn with_projectiles<R>(&self, f: impl FnOnce(&mut SlotTable<Projectile>) -> R) -> R {
        f(&mut lock(&self.projectiles))
    }

    pub fn with_bays<R>(&self, f: impl FnOnce(&mut [LaunchBay]) -> R) -> R {
        f(lock(&self.bays).as_mut_slice())
    }

    pub fn with_run<R>(&self, f: impl FnOnce(&mut RunState) -> R) -> R {
        f(&mut lock(&self.run))
    }

    pub fn viewport(&self) -> ViewportMetrics {
        *lock(&self.viewport)
    }

    /// Stores a newly measured surface size. Returns the stored metrics when they changed.
    ///
    /// Only the snapshot publisher calls this.
    pub(crate) fn resize_viewport(&self, width: i32, height: i32) -> Option<ViewportMetrics> {
        let width = width.max(MIN_SURFACE_WIDTH);
        let height = height.max(MIN_SURFACE_HEIGHT);
        let mut viewport = lock(&self.viewport);
        if viewport.width == width && viewport.height == height {
            return None;
        }
        viewport.width = width;
        viewport.height = height;
        Some(*viewport)
    }

    pub fn counters(&self) -> RunCounters {
        self.with_run(|run| run.counters())
    }

    pub fn population(&self) -> Population {
        let actors = self.with_actors(|actors| actors.active());
        let projectiles = self.with_projectiles(|projectiles| projectiles.active());
        Population {
            actors,
            projectiles,
        }
    }

    pub fn loaded_bays(&self) -> usize {
        self.with_bays(|bays| bays.iter().filter(|bay| bay.loaded).count())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason.get().copied()
    }

    /// Raises the termination flag and wakes every waiter. Returns true for the first caller.
    ///
    /// The flag is never cleared for the lifetime of the world.
    pub fn terminate(&self, reason: EndReason) -> bool {
        let first = !self.terminated.swap(true, Ordering::AcqRel);
        if first {
            let _ = self.end_reason.set(reason);
            info!(%reason, "termination requested");
        }
        self.shutdown.notify_waiters();
        // The replenishment loop may be parked on the bay signal indefinitely.
        self.bay_emptied.notify_waiters();
        first
    }

    /// Resolves once the termination flag is set.
    pub async fn terminated(&self) {
        // Register before checking so a concurrent `terminate` cannot slip between.
        let notified = self.shutdown.notified();
        if self.is_terminated() {
            return;
        }
        notified.await;
    }

    /// Sleeps for `duration` unless termination arrives first. Returns true when terminated.
    pub async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => self.is_terminated(),
            _ = self.terminated() => true,
        }
    }

    /// Future that completes on the next bay-emptied signal or on termination.
    ///
    /// Create it before scanning the bays so a signal sent in between is not missed.
    pub(crate) fn bay_emptied(&self) -> Notified<'_> {
        self.bay_emptied.notified()
    }

    pub(crate) fn signal_bay_emptied(&self) {
        self.bay_emptied.notify_one();
    }

    /// Queues a hit position for the publisher; dropped when the feed is full.
    pub(crate) fn report_hit(&self, position: Position) {
        if self.hit_tx.try_send(position).is_err() {
            trace!(x = position.x, y = position.y, "hit feed full; marker dropped");
        }
    }

    /// Hands the hit feed to the publisher. Only the first caller receives it.
    pub(crate) fn take_hit_feed(&self) -> Option<mpsc::Receiver<Position>> {
        lock(&self.hit_rx).take()
    }
}

// Region data stays consistent across a panicking holder: every critical
// section is a plain field update, so recover the guard instead of propagating.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
