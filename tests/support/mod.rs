// Shared fixtures for the integration tests: sinks, launchers, inputs and
// polling helpers.
#![allow(dead_code)]

use anti_air::domain::{
    Action, DifficultyConfig, DifficultyLevel, InputSource, LaunchError, PresentationSink,
    Snapshot, TaskKind, TaskLauncher,
};
use anti_air::use_cases::{World, WorldSettings};
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

// Records every presented frame at a fixed surface size.
pub struct RecordingSink {
    pub size: (i32, i32),
    pub frames: Vec<Snapshot>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            size: (120, 32),
            frames: Vec::new(),
        }
    }
}

impl PresentationSink for RecordingSink {
    fn measure(&mut self) -> io::Result<(i32, i32)> {
        Ok(self.size)
    }

    fn present(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        self.frames.push(snapshot.clone());
        Ok(())
    }
}

// Refuses every launch.
pub struct RefusingLauncher;

impl TaskLauncher for RefusingLauncher {
    fn launch(
        &self,
        kind: TaskKind,
        _task: BoxFuture<'static, ()>,
    ) -> Result<JoinHandle<()>, LaunchError> {
        Err(LaunchError::Refused(kind))
    }
}

// Spawns on the current runtime until `allowed` launches were made, then refuses.
pub struct LimitedLauncher {
    allowed: usize,
    launched: AtomicUsize,
}

impl LimitedLauncher {
    pub fn new(allowed: usize) -> Self {
        Self {
            allowed,
            launched: AtomicUsize::new(0),
        }
    }
}

impl TaskLauncher for LimitedLauncher {
    fn launch(
        &self,
        kind: TaskKind,
        task: BoxFuture<'static, ()>,
    ) -> Result<JoinHandle<()>, LaunchError> {
        if self.launched.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(LaunchError::Refused(kind));
        }
        Ok(tokio::runtime::Handle::try_current()?.spawn(task))
    }
}

// Replays a fixed script; each entry waits `delay` before yielding its action.
pub struct ScriptedInput {
    script: VecDeque<(Duration, Action)>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = (Duration, Action)>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn idle() -> Self {
        Self::new([])
    }
}

impl InputSource for ScriptedInput {
    fn poll_action(&mut self, timeout: Duration) -> io::Result<Option<Action>> {
        let Some((delay, action)) = self.script.front_mut() else {
            std::thread::sleep(timeout);
            return Ok(None);
        };
        if *delay > timeout {
            *delay -= timeout;
            std::thread::sleep(timeout);
            return Ok(None);
        }
        std::thread::sleep(*delay);
        let action = *action;
        self.script.pop_front();
        Ok(Some(action))
    }
}

pub fn world_for(difficulty: DifficultyConfig) -> Arc<World> {
    World::new(WorldSettings::new(difficulty))
}

pub fn easy_world() -> Arc<World> {
    world_for(DifficultyLevel::Easy.config())
}

pub fn load_all_bays(world: &World) {
    world.with_bays(|bays| bays.iter_mut().for_each(|bay| bay.loaded = true));
}

// Polls `condition` every `step` until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, step: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(step).await;
    }
}
