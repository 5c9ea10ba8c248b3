// Fire action: consumes one loaded bay and one projectile slot, then launches
// the projectile task once every lock is released.

use super::projectile::run_projectile;
use super::world::World;
use crate::domain::{Position, Projectile, SlotKey, TaskKind, TaskLauncher};
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

struct Loaded {
    bay: usize,
    key: SlotKey,
}

/// Attempts one shot. Returns false when nothing was launched.
///
/// An empty battery or a full projectile table is a normal outcome, not an error.
pub fn fire(world: &Arc<World>, launcher: &dyn TaskLauncher) -> bool {
    if world.is_terminated() {
        return false;
    }

    let viewport = world.viewport();
    let aim = world.with_run(|run| run.aim());
    let origin = Position::new(viewport.clamp_column(aim.column), viewport.ground_row());

    // Lock order: bays, then projectiles.
    let loaded = world.with_bays(|bays| {
        let bay = bays.iter().position(|bay| bay.loaded)?;
        let key = world.with_projectiles(|projectiles| {
            projectiles.occupy(Projectile::launch(origin, aim.direction, bay))
        })?;
        bays[bay].loaded = false;
        Some(Loaded { bay, key })
    });

    let Some(Loaded { bay, key }) = loaded else {
        debug!("no shot fired");
        return false;
    };

    world.signal_bay_emptied();
    world.with_run(|run| run.record_shot());

    let task = run_projectile(world.clone(), key).boxed();
    match launcher.launch(TaskKind::Projectile, task) {
        Ok(handle) => {
            if !world.with_projectiles(|projectiles| projectiles.attach_handle(key, handle)) {
                trace!(slot = key.index, "projectile finished before its handle was attached");
            }
            debug!(bay, slot = key.index, x = origin.x, direction = ?aim.direction, "shot fired");
            true
        }
        Err(error) => {
            warn!(%error, bay, slot = key.index, "projectile launch failed; rolling back shot");
            world.with_projectiles(|projectiles| projectiles.vacate(key));
            world.with_run(|run| run.rollback_shot());
            world.with_bays(|bays| {
                if let Some(bay) = bays.get_mut(bay) {
                    bay.loaded = true;
                }
            });
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AimDirection, DifficultyLevel, EndReason, LaunchError};
    use crate::use_cases::launcher::TokioLauncher;
    use crate::use_cases::world::WorldSettings;
    use futures::future::BoxFuture;
    use tokio::task::JoinHandle;

    struct Refusing;

    impl TaskLauncher for Refusing {
        fn launch(
            &self,
            kind: TaskKind,
            _task: BoxFuture<'static, ()>,
        ) -> Result<JoinHandle<()>, LaunchError> {
            Err(LaunchError::Refused(kind))
        }
    }

    fn loaded_world(bays: usize) -> Arc<World> {
        let world = World::new(WorldSettings::new(DifficultyLevel::Easy.config()));
        world.with_bays(|slots| slots.iter_mut().take(bays).for_each(|bay| bay.loaded = true));
        world
    }

    #[tokio::test]
    async fn when_every_bay_is_empty_then_no_shot_is_fired() {
        let world = loaded_world(0);
        assert!(!fire(&world, &TokioLauncher));
        assert_eq!(world.counters().shots, 0);
        assert_eq!(world.population().projectiles, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn when_bay_is_loaded_then_shot_leaves_from_the_aim_column() {
        let world = loaded_world(2);
        world.with_run(|run| run.set_aim_direction(AimDirection::DiagonalRight));
        let aim_column = world.with_run(|run| run.aim().column);

        assert!(fire(&world, &TokioLauncher));

        assert_eq!(world.loaded_bays(), 1);
        assert_eq!(world.counters().shots, 1);
        let launched = world.with_projectiles(|projectiles| {
            projectiles
                .iter()
                .map(|(_, p)| (p.position.x, p.direction, p.bay))
                .next()
        });
        assert_eq!(launched, Some((aim_column, AimDirection::DiagonalRight, 0)));
    }

    #[tokio::test]
    async fn when_launch_is_refused_then_bay_and_shot_are_restored() {
        let world = loaded_world(1);
        assert!(!fire(&world, &Refusing));
        assert_eq!(world.loaded_bays(), 1);
        assert_eq!(world.counters().shots, 0);
        assert_eq!(world.population().projectiles, 0);
    }

    #[tokio::test]
    async fn when_run_is_terminated_then_fire_is_refused() {
        let world = loaded_world(4);
        world.terminate(EndReason::Quit);
        assert!(!fire(&world, &TokioLauncher));
        assert_eq!(world.loaded_bays(), 4);
    }
}
