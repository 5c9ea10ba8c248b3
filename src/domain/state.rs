// Domain-level entity records, run counters and end-of-run rules.

use super::geometry::{AimDirection, Position, ViewportMetrics};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// A descending target. Position is mutated only by its own task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub position: Position,
    pub alive: bool,
    pub destroyed: bool,
}

impl Actor {
    pub fn spawn(position: Position) -> Self {
        Self {
            position,
            alive: true,
            destroyed: false,
        }
    }
}

/// An in-flight shot moving along a fixed step vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projectile {
    pub position: Position,
    pub direction: AimDirection,
    pub velocity: (i32, i32),
    // Bay the shot was launched from.
    pub bay: usize,
    pub alive: bool,
}

impl Projectile {
    pub fn launch(position: Position, direction: AimDirection, bay: usize) -> Self {
        Self {
            position,
            direction,
            velocity: direction.step(),
            bay,
            alive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchBay {
    pub loaded: bool,
    // Aim direction baked in when the bay was last reloaded.
    pub direction: AimDirection,
}

/// Battery column and currently selected firing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Aim {
    pub column: i32,
    pub direction: AimDirection,
}

/// Actions the input collaborator can apply to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SetAim(AimDirection),
    Fire,
    Quit,
}

/// Why the termination flag was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    // More than half of the targets reached the ground.
    Overrun,
    // Every target was either destroyed or reached the ground.
    AllHandled,
    Quit,
    Shutdown,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Overrun => "overrun",
            Self::AllHandled => "all targets handled",
            Self::Quit => "quit requested",
            Self::Shutdown => "shutdown",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Victory,
    DefeatOverrun,
    DefeatTooFewKills,
}

/// Lock-free copy of the run counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunCounters {
    pub score: u32,
    pub total: u32,
    pub destroyed: u32,
    pub escaped: u32,
    pub spawned: u32,
    pub shots: u32,
    pub hits: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub elapsed: Duration,
}

impl RunCounters {
    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.destroyed + self.escaped)
    }

    /// Hit ratio in percent; 0 before the first shot.
    pub fn accuracy(&self) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        100.0 * f64::from(self.hits) / f64::from(self.shots)
    }

    pub fn verdict(&self) -> Verdict {
        if self.escaped > self.total / 2 {
            Verdict::DefeatOverrun
        } else if self.destroyed >= self.total / 2 {
            Verdict::Victory
        } else {
            Verdict::DefeatTooFewKills
        }
    }
}

/// Score, progress and aim for one run. Guarded by the run-state lock.
#[derive(Debug, Clone)]
pub struct RunState {
    total: u32,
    score: u32,
    destroyed: u32,
    escaped: u32,
    spawned: u32,
    shots: u32,
    hits: u32,
    streak: u32,
    best_streak: u32,
    elapsed: Duration,
    aim: Aim,
}

impl RunState {
    pub fn new(total: u32, viewport: ViewportMetrics) -> Self {
        Self {
            total,
            score: 0,
            destroyed: 0,
            escaped: 0,
            spawned: 0,
            shots: 0,
            hits: 0,
            streak: 0,
            best_streak: 0,
            elapsed: Duration::ZERO,
            aim: Aim {
                column: viewport.width / 2,
                direction: AimDirection::Vertical,
            },
        }
    }

    /// Reserves one spawn before the target exists. False once every target was spawned.
    pub fn reserve_spawn(&mut self) -> bool {
        if self.spawned >= self.total {
            return false;
        }
        self.spawned += 1;
        true
    }

    pub fn rollback_spawn(&mut self) {
        self.spawned = self.spawned.saturating_sub(1);
    }

    pub fn spawn_pending(&self) -> bool {
        self.spawned < self.total
    }

    pub fn record_kill(&mut self, points: u32) {
        debug_assert!(self.destroyed + self.escaped < self.total);
        self.destroyed += 1;
        self.score += points;
        self.hits += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
    }

    pub fn record_escape(&mut self) {
        debug_assert!(self.destroyed + self.escaped < self.total);
        self.escaped += 1;
        // A target on the ground breaks the combo.
        self.streak = 0;
    }

    pub fn record_shot(&mut self) {
        self.shots += 1;
    }

    pub fn rollback_shot(&mut self) {
        self.shots = self.shots.saturating_sub(1);
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn aim(&self) -> Aim {
        self.aim
    }

    pub fn shift_aim(&mut self, delta: i32, width: i32) {
        self.aim.column = (self.aim.column + delta).clamp(0, (width - 1).max(0));
    }

    pub fn set_aim_direction(&mut self, direction: AimDirection) {
        self.aim.direction = direction;
    }

    /// Pulls the battery back inside a surface that just shrank.
    pub fn clamp_aim(&mut self, width: i32) {
        self.shift_aim(0, width);
    }

    /// Overrun wins over completion: losing more than half ends the run immediately.
    pub fn end_condition(&self) -> Option<EndReason> {
        if self.escaped > self.total / 2 {
            Some(EndReason::Overrun)
        } else if self.destroyed + self.escaped >= self.total {
            Some(EndReason::AllHandled)
        } else {
            None
        }
    }

    pub fn counters(&self) -> RunCounters {
        RunCounters {
            score: self.score,
            total: self.total,
            destroyed: self.destroyed,
            escaped: self.escaped,
            spawned: self.spawned,
            shots: self.shots,
            hits: self.hits,
            streak: self.streak,
            best_streak: self.best_streak,
            elapsed: self.elapsed,
        }
    }
}
