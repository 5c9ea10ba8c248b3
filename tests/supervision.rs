mod support;

use anti_air::domain::{EndReason, TaskLauncher, Verdict};
use anti_air::use_cases::{
    LoopHandles, SpawnOutcome, Supervisor, TokioLauncher, World, fire, run_reloader,
    spawn_input_loop,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use support::{LimitedLauncher, RefusingLauncher, ScriptedInput, easy_world, load_all_bays, wait_until};

fn supervisor(world: &Arc<World>, launcher: Arc<dyn TaskLauncher>) -> Supervisor {
    Supervisor::new(world.clone(), launcher, StdRng::seed_from_u64(42))
}

#[tokio::test(start_paused = true)]
async fn when_sixteen_of_thirty_reach_ground_then_run_terminates_at_once() {
    let world = easy_world();
    let mut supervisor = supervisor(&world, Arc::new(TokioLauncher));

    // Staggered so the targets touch down one at a time.
    for column in 0..30 {
        assert!(matches!(
            supervisor.spawn_actor_at(column * 3),
            SpawnOutcome::Spawned(_)
        ));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(world.counters().spawned, 30);

    assert!(wait_until(Duration::from_secs(60), Duration::from_millis(10), || world.is_terminated()).await);

    let counters = world.counters();
    assert_eq!(world.end_reason(), Some(EndReason::Overrun));
    assert_eq!(counters.escaped, 16);
    assert_eq!(counters.destroyed, 0);
    assert_eq!(counters.verdict(), Verdict::DefeatOverrun);

    let report = supervisor.shutdown(LoopHandles::default()).await;
    assert_eq!(report.panicked, 0);
    assert_eq!(world.population().actors, 0);
    assert_eq!(world.counters().escaped, 16);
}

#[tokio::test]
async fn when_launch_fails_then_spawn_reservation_is_rolled_back() {
    let world = easy_world();
    let mut supervisor = supervisor(&world, Arc::new(RefusingLauncher));

    for _ in 0..5 {
        assert_eq!(supervisor.spawn_actor(), SpawnOutcome::LaunchFailed);
    }

    let counters = world.counters();
    assert_eq!(counters.spawned, 0);
    assert_eq!(world.population().actors, 0);
    assert!(world.with_run(|run| run.spawn_pending()));
}

#[tokio::test]
async fn when_launches_start_failing_midway_then_only_real_spawns_are_counted() {
    let world = easy_world();
    let mut supervisor = supervisor(&world, Arc::new(LimitedLauncher::new(3)));

    let outcomes: Vec<_> = (0..6).map(|column| supervisor.spawn_actor_at(column * 10)).collect();

    let spawned = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, SpawnOutcome::Spawned(_)))
        .count();
    assert_eq!(spawned, 3);
    assert_eq!(world.counters().spawned, 3);
    assert_eq!(world.population().actors, 3);

    supervisor.shutdown(LoopHandles::default()).await;
}

#[tokio::test]
async fn when_shutdown_is_requested_then_every_task_is_joined() {
    let world = easy_world();
    let launcher: Arc<dyn TaskLauncher> = Arc::new(TokioLauncher);
    let mut supervisor = supervisor(&world, launcher.clone());

    let reloader = tokio::spawn(run_reloader(world.clone()));
    let input = spawn_input_loop(
        world.clone(),
        launcher.clone(),
        ScriptedInput::idle(),
        Duration::from_millis(5),
    )
    .expect("runtime available");

    const ACTORS: usize = 12;
    for column in 0..ACTORS as i32 {
        assert!(matches!(
            supervisor.spawn_actor_at(column * 8),
            SpawnOutcome::Spawned(_)
        ));
    }
    load_all_bays(&world);
    let shots = (0..3).filter(|_| fire(&world, launcher.as_ref())).count();
    assert_eq!(shots, 3);

    let report = supervisor
        .shutdown(LoopHandles {
            input: Some(input),
            reloader: Some(reloader),
        })
        .await;

    assert_eq!(report.entities_joined, ACTORS + shots);
    assert_eq!(report.loops_joined, 2);
    assert_eq!(report.panicked, 0);
    assert_eq!(world.population().actors, 0);
    assert_eq!(world.population().projectiles, 0);
    assert!(world.with_actors(|actors| actors.take_handles()).is_empty());
    assert_eq!(world.end_reason(), Some(EndReason::Shutdown));
}
