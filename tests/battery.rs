mod support;

use anti_air::domain::{DifficultyLevel, EndReason};
use anti_air::use_cases::{TokioLauncher, fire, run_reloader};
use std::time::Duration;
use support::{easy_world, wait_until, world_for};

const STEP: Duration = Duration::from_millis(5);

#[tokio::test(start_paused = true)]
async fn when_single_bay_is_fired_repeatedly_then_it_reloads_within_reload_time() {
    let mut difficulty = DifficultyLevel::Easy.config();
    difficulty.bay_count = 1;
    let world = world_for(difficulty);
    let reload = difficulty.reload;
    let reloader = tokio::spawn(run_reloader(world.clone()));

    for _ in 0..5 {
        assert!(wait_until(reload * 2, STEP, || world.loaded_bays() == 1).await);
        assert!(fire(&world, &TokioLauncher));
        assert_eq!(world.loaded_bays(), 0);

        let emptied_at = tokio::time::Instant::now();
        assert!(wait_until(reload * 2, STEP, || world.loaded_bays() == 1).await);
        let waited = emptied_at.elapsed();
        assert!(
            waited <= reload + Duration::from_millis(50),
            "reload took {waited:?}"
        );
    }

    assert_eq!(world.counters().shots, 5);
    world.terminate(EndReason::Shutdown);
    reloader.await.expect("reloader should exit");
}

#[tokio::test(start_paused = true)]
async fn when_all_bays_are_empty_then_fire_is_skipped_until_a_reload() {
    let world = easy_world();
    let reload = world.difficulty().reload;
    let reloader = tokio::spawn(run_reloader(world.clone()));

    assert!(!fire(&world, &TokioLauncher));
    tokio::time::sleep(reload / 2).await;
    assert!(!fire(&world, &TokioLauncher));
    assert_eq!(world.counters().shots, 0);

    assert!(wait_until(reload * 2, STEP, || world.loaded_bays() >= 1).await);
    assert!(fire(&world, &TokioLauncher));
    assert_eq!(world.counters().shots, 1);

    world.terminate(EndReason::Shutdown);
    reloader.await.expect("reloader should exit");
}

#[tokio::test(start_paused = true)]
async fn when_projectile_exits_the_top_then_no_counter_except_shots_moves() {
    let world = easy_world();
    support::load_all_bays(&world);

    assert!(fire(&world, &TokioLauncher));
    assert!(
        wait_until(Duration::from_secs(5), STEP, || world.population().projectiles == 0).await
    );

    let counters = world.counters();
    assert_eq!(counters.shots, 1);
    assert_eq!(
        (counters.hits, counters.destroyed, counters.escaped, counters.score),
        (0, 0, 0, 0)
    );
}
