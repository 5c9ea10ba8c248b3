// Applies player actions to the world and drives the blocking input reader.

use super::fire::fire;
use super::world::World;
use crate::domain::{Action, EndReason, InputSource, LaunchError, TaskLauncher};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Applies one action. Returns true when it changed the world.
pub fn apply(world: &Arc<World>, launcher: &dyn TaskLauncher, action: Action) -> bool {
    match action {
        Action::MoveLeft | Action::MoveRight => {
            let delta = if action == Action::MoveLeft { -1 } else { 1 };
            let width = world.viewport().width;
            world.with_run(|run| {
                let before = run.aim().column;
                run.shift_aim(delta, width);
                run.aim().column != before
            })
        }
        Action::SetAim(direction) => {
            world.with_run(|run| run.set_aim_direction(direction));
            true
        }
        Action::Fire => fire(world, launcher),
        Action::Quit => world.terminate(EndReason::Quit),
    }
}

/// Polls the input source until the run terminates. Blocks the calling thread.
pub fn run_input_loop<I: InputSource>(
    world: Arc<World>,
    launcher: Arc<dyn TaskLauncher>,
    mut input: I,
    poll: Duration,
) {
    let mut applied: u64 = 0;
    while !world.is_terminated() {
        match input.poll_action(poll) {
            Ok(Some(action)) => {
                if apply(&world, launcher.as_ref(), action) {
                    applied += 1;
                }
                debug!(?action, "input applied");
            }
            Ok(None) => {}
            Err(error) => {
                warn!(%error, "input read failed");
                std::thread::sleep(poll);
            }
        }
    }
    info!(applied, "input loop stopped");
}

/// Starts the input loop on the blocking pool of the current runtime.
pub fn spawn_input_loop<I: InputSource + 'static>(
    world: Arc<World>,
    launcher: Arc<dyn TaskLauncher>,
    input: I,
    poll: Duration,
) -> Result<JoinHandle<()>, LaunchError> {
    let handle = Handle::try_current()?;
    Ok(handle.spawn_blocking(move || run_input_loop(world, launcher, input, poll)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AimDirection, DifficultyLevel};
    use crate::use_cases::launcher::TokioLauncher;
    use crate::use_cases::world::WorldSettings;
    use std::collections::VecDeque;
    use std::io;

    struct Scripted(VecDeque<Action>);

    impl InputSource for Scripted {
        fn poll_action(&mut self, timeout: Duration) -> io::Result<Option<Action>> {
            match self.0.pop_front() {
                Some(action) => Ok(Some(action)),
                None => {
                    std::thread::sleep(timeout);
                    Ok(None)
                }
            }
        }
    }

    fn world() -> Arc<World> {
        World::new(WorldSettings::new(DifficultyLevel::Easy.config()))
    }

    #[test]
    fn when_aim_is_at_left_edge_then_move_left_changes_nothing() {
        let world = world();
        world.with_run(|run| run.shift_aim(-1000, 120));
        assert!(!apply(&world, &TokioLauncher, Action::MoveLeft));
        assert!(apply(&world, &TokioLauncher, Action::MoveRight));
        assert_eq!(world.with_run(|run| run.aim().column), 1);
    }

    #[test]
    fn when_direction_is_selected_then_aim_follows() {
        let world = world();
        apply(&world, &TokioLauncher, Action::SetAim(AimDirection::HorizontalLeft));
        assert_eq!(
            world.with_run(|run| run.aim().direction),
            AimDirection::HorizontalLeft
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn when_quit_is_read_then_input_loop_terminates_the_run() {
        let world = world();
        let script = Scripted(VecDeque::from([Action::MoveRight, Action::Fire, Action::Quit]));
        let handle = spawn_input_loop(
            world.clone(),
            Arc::new(TokioLauncher),
            script,
            Duration::from_millis(5),
        )
        .expect("runtime available");

        handle.await.expect("input loop should exit");
        assert_eq!(world.end_reason(), Some(EndReason::Quit));
        // Bays start empty, so the fire was skipped.
        assert_eq!(world.counters().shots, 0);
    }
}
