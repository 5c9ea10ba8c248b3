// Per-target task: descends one row per step until it is destroyed, reaches the
// ground, or the run terminates.

use super::gate;
use super::world::World;
use crate::domain::{Position, SlotKey};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorExit {
    Grounded,
    Destroyed,
    // Another task flipped this target first.
    Preempted,
    Terminated,
}

pub async fn run_actor(world: Arc<World>, key: SlotKey) {
    let exit = drive(&world, key).await;
    world.with_actors(|actors| actors.vacate(key));
    debug!(slot = key.index, ?exit, "actor task finished");
}

async fn drive(world: &World, key: SlotKey) -> ActorExit {
    let step = world.difficulty().actor_step;
    loop {
        if world.is_terminated() {
            return ActorExit::Terminated;
        }

        let Some(position) = advance(world, key) else {
            return ActorExit::Preempted;
        };

        if position.y >= world.viewport().ground_row() {
            return if gate::ground_actor(world, key) {
                ActorExit::Grounded
            } else {
                ActorExit::Preempted
            };
        }

        if gate::claim_projectile_near(world, position) {
            if gate::destroy_actor(world, key) {
                gate::credit_kill(world, position);
                return ActorExit::Destroyed;
            }
            return ActorExit::Preempted;
        }

        if world.pause(step).await {
            return ActorExit::Terminated;
        }
    }
}

// Moves the target down one row. `None` once it is no longer alive.
fn advance(world: &World, key: SlotKey) -> Option<Position> {
    world.with_actors(|actors| {
        let actor = actors.get_mut(key).filter(|actor| actor.alive)?;
        actor.position.y += 1;
        Some(actor.position)
    })
}
