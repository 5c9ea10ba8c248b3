// Collision arbitration ("transition gate").
//
// A hit can be detected by the actor task (scanning projectiles) and by the
// projectile task (scanning actors). Only the caller that flips an actor's
// `alive` flag from true to false inside the actors critical section gets to
// credit the outcome. Everyone else observes `alive == false` and backs off.
// A projectile is spent by exactly one side as well: the actor that claims it,
// or the projectile itself right before it strikes. Each credited kill thus
// consumes its own projectile, and `hits` never exceeds `shots`.
//
// Credit is applied afterwards under the run-state lock, never while the
// entity region is held.

use super::world::World;
use crate::domain::{Actor, Position, Projectile, SlotKey};
use tracing::debug;

/// Check-and-flip for a destroyed target. True only for the winning caller.
pub fn flip_destroyed(actor: &mut Actor) -> bool {
    if !actor.alive {
        return false;
    }
    actor.alive = false;
    actor.destroyed = true;
    true
}

/// Check-and-flip for a target that reached the ground. True only for the winning caller.
pub fn flip_grounded(actor: &mut Actor) -> bool {
    if !actor.alive {
        return false;
    }
    actor.alive = false;
    true
}

/// Check-and-flip for a projectile. True only for the caller that retired it.
pub fn retire_projectile(projectile: &mut Projectile) -> bool {
    if !projectile.alive {
        return false;
    }
    projectile.alive = false;
    true
}

/// What a projectile found when it looked for a target at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strike {
    // Nothing in range; keep flying.
    Clear,
    // A target claimed this projectile first.
    Spent,
    // The target in range was taken by another shot before this one struck.
    Missed,
    Hit(Position),
}

/// Actor side: gate the ground transition for `key` and credit the escape.
pub fn ground_actor(world: &World, key: SlotKey) -> bool {
    let won = world.with_actors(|actors| actors.get_mut(key).is_some_and(flip_grounded));
    if won {
        credit_escape(world);
    }
    won
}

/// Actor side: gate the destroy transition for `key` after a projectile was claimed.
pub fn destroy_actor(world: &World, key: SlotKey) -> bool {
    world.with_actors(|actors| actors.get_mut(key).is_some_and(flip_destroyed))
}

/// Actor side: retires the first live projectile within tolerance of `at`.
pub fn claim_projectile_near(world: &World, at: Position) -> bool {
    let tolerance = world.combat().hit_tolerance;
    world.with_projectiles(|projectiles| {
        projectiles
            .iter_mut()
            .find(|(_, projectile)| projectile.alive && projectile.position.within(at, tolerance))
            .is_some_and(|(_, projectile)| retire_projectile(projectile))
    })
}

/// Projectile side: spends projectile `key` and strikes a live target near `at`.
///
/// The projectile retires itself before it flips a target, one region at a
/// time. If a target claimed it in the meantime, it strikes nothing.
pub fn strike_from(world: &World, key: SlotKey, at: Position) -> Strike {
    if !actor_near(world, at) {
        return Strike::Clear;
    }
    let spent = world.with_projectiles(|projectiles| {
        projectiles.get_mut(key).is_some_and(retire_projectile)
    });
    if !spent {
        return Strike::Spent;
    }
    match strike_actor_near(world, at) {
        Some(target) => {
            credit_kill(world, target);
            Strike::Hit(target)
        }
        None => Strike::Missed,
    }
}

fn actor_near(world: &World, at: Position) -> bool {
    let tolerance = world.combat().hit_tolerance;
    world.with_actors(|actors| {
        actors
            .iter()
            .any(|(_, actor)| actor.alive && actor.position.within(at, tolerance))
    })
}

/// Projectile side: flips the first live actor within tolerance of `at`.
///
/// Returns the position of the actor this caller destroyed. Scanning and the
/// flip share one critical section, so a found actor is always won.
pub fn strike_actor_near(world: &World, at: Position) -> Option<Position> {
    let tolerance = world.combat().hit_tolerance;
    world.with_actors(|actors| {
        actors
            .iter_mut()
            .find(|(_, actor)| actor.alive && actor.position.within(at, tolerance))
            .and_then(|(_, actor)| flip_destroyed(actor).then_some(actor.position))
    })
}

/// Credits a kill won through the gate and ends the run if it is now decided.
pub fn credit_kill(world: &World, at: Position) {
    let points = world.combat().score_per_kill;
    let decided = world.with_run(|run| {
        run.record_kill(points);
        run.end_condition()
    });
    world.report_hit(at);
    debug!(x = at.x, y = at.y, "target destroyed");
    if let Some(reason) = decided {
        world.terminate(reason);
    }
}

fn credit_escape(world: &World) {
    let decided = world.with_run(|run| {
        run.record_escape();
        run.end_condition()
    });
    debug!("target reached the ground");
    if let Some(reason) = decided {
        world.terminate(reason);
    }
}
