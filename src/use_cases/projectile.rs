// Per-shot task: travels along its launch vector until it leaves the play
// field, strikes a target, or the run terminates.

use super::gate::{self, Strike};
use super::world::World;
use crate::domain::{Position, SlotKey};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileExit {
    OutOfBounds,
    Struck,
    // Retired by a target that claimed it.
    Spent,
    // Its target went down to another shot first.
    Missed,
    Terminated,
}

pub async fn run_projectile(world: Arc<World>, key: SlotKey) {
    let exit = drive(&world, key).await;
    world.with_projectiles(|projectiles| projectiles.vacate(key));
    debug!(slot = key.index, ?exit, "projectile task finished");
}

async fn drive(world: &World, key: SlotKey) -> ProjectileExit {
    let step = world.combat().projectile_step;
    loop {
        if world.is_terminated() {
            return ProjectileExit::Terminated;
        }

        let Some(position) = advance(world, key) else {
            return ProjectileExit::Spent;
        };

        if !world.viewport().contains(position) {
            retire(world, key);
            return ProjectileExit::OutOfBounds;
        }

        match gate::strike_from(world, key, position) {
            Strike::Clear => {}
            Strike::Hit(_) => return ProjectileExit::Struck,
            Strike::Spent => return ProjectileExit::Spent,
            Strike::Missed => return ProjectileExit::Missed,
        }

        if world.pause(step).await {
            return ProjectileExit::Terminated;
        }
    }
}

fn advance(world: &World, key: SlotKey) -> Option<Position> {
    world.with_projectiles(|projectiles| {
        let projectile = projectiles.get_mut(key).filter(|p| p.alive)?;
        projectile.position = projectile.position.offset(projectile.velocity);
        Some(projectile.position)
    })
}

fn retire(world: &World, key: SlotKey) {
    world.with_projectiles(|projectiles| {
        if let Some(projectile) = projectiles.get_mut(key) {
            gate::retire_projectile(projectile);
        }
    });
}
