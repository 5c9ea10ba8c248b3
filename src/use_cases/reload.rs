// Replenishment loop for the launch bays.
//
// scanning  -> reloading: an empty bay exists; capture the aim direction and
//                         sleep for the reload time without holding any lock.
// reloading -> scanning:  load the bay if it is still empty and the run is live.
// scanning  -> waiting:   every bay is loaded; park on the bay-emptied signal.
// waiting   -> scanning:  woken by a fire or by termination; always re-scan.

use super::world::World;
use std::sync::Arc;
use tracing::{debug, info};

pub async fn run_reloader(world: Arc<World>) {
    let reload = world.difficulty().reload;
    let mut reloaded: u64 = 0;

    loop {
        // Registered before the scan so a fire in between still wakes us.
        let emptied = world.bay_emptied();

        if world.is_terminated() {
            break;
        }

        let Some(bay) = world.with_bays(|bays| bays.iter().position(|bay| !bay.loaded)) else {
            emptied.await;
            continue;
        };
        drop(emptied);

        let direction = world.with_run(|run| run.aim().direction);
        if world.pause(reload).await {
            break;
        }

        let loaded = world.with_bays(|bays| match bays.get_mut(bay) {
            Some(slot) if !slot.loaded && !world.is_terminated() => {
                slot.loaded = true;
                slot.direction = direction;
                true
            }
            _ => false,
        });
        if loaded {
            reloaded += 1;
            debug!(bay, ?direction, "bay reloaded");
        }
    }

    info!(reloaded, "replenishment loop stopped");
}
