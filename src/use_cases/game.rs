// Orchestrating loop: advances run time, evaluates end rules, schedules spawns
// and paces snapshot production until the termination flag goes up.

use super::publisher::Publisher;
use super::supervisor::{SpawnOutcome, Supervisor};
use crate::domain::{EndReason, PresentationSink};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

pub async fn orchestrate<S: PresentationSink>(
    supervisor: &mut Supervisor,
    publisher: &mut Publisher<S>,
    frame_interval: Duration,
) -> EndReason {
    let world = supervisor.world().clone();
    let started = Instant::now();
    // The first target waits one spawn interval, like every later one.
    let mut next_spawn = started + supervisor.next_spawn_delay();

    let mut interval = tokio::time::interval(frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        difficulty = %world.difficulty().level,
        targets = world.difficulty().total_targets,
        "run started"
    );

    loop {
        tokio::select! {
            _ = world.terminated() => break,
            _ = interval.tick() => {}
        }

        let now = Instant::now();
        let decided = world.with_run(|run| {
            run.set_elapsed(now - started);
            run.end_condition()
        });
        if let Some(reason) = decided {
            world.terminate(reason);
            break;
        }

        if now >= next_spawn && world.with_run(|run| run.spawn_pending()) {
            match supervisor.spawn_actor() {
                SpawnOutcome::Spawned(_) | SpawnOutcome::Exhausted => {}
                outcome => debug!(?outcome, "spawn skipped"),
            }
            next_spawn = now + supervisor.next_spawn_delay();
        }

        let (reaped, panicked) = supervisor.reap_finished().await;
        if reaped > 0 {
            trace!(reaped, panicked, "finished entity tasks joined");
        }

        publisher.publish_frame();
    }

    // Last frame shows the final counters.
    world.with_run(|run| run.set_elapsed(started.elapsed()));
    publisher.publish_frame();

    let reason = world.end_reason().unwrap_or(EndReason::Shutdown);
    info!(%reason, frames = publisher.frames_published(), "run ended");
    reason
}
