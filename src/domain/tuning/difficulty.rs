//! Per-level gameplay tuning.
//!
//! Consumed once when the world is built and never mutated afterwards.
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Maps the numeric level used on the command line (0, 1, 2).
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    pub fn config(self) -> DifficultyConfig {
        match self {
            Self::Easy => DifficultyConfig {
                level: self,
                bay_count: 4,
                reload: Duration::from_millis(2500),
                total_targets: 30,
                actor_step: Duration::from_millis(800),
                spawn_interval_min: Duration::from_millis(2000),
                spawn_interval_max: Duration::from_millis(3000),
            },
            Self::Medium => DifficultyConfig {
                level: self,
                bay_count: 7,
                reload: Duration::from_millis(1500),
                total_targets: 40,
                actor_step: Duration::from_millis(600),
                spawn_interval_min: Duration::from_millis(2000),
                spawn_interval_max: Duration::from_millis(2000),
            },
            Self::Hard => DifficultyConfig {
                level: self,
                bay_count: 12,
                reload: Duration::from_millis(800),
                total_targets: 60,
                actor_step: Duration::from_millis(450),
                spawn_interval_min: Duration::from_millis(1000),
                spawn_interval_max: Duration::from_millis(2000),
            },
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyConfig {
    pub level: DifficultyLevel,

    /// Number of launch bays available to the battery.
    pub bay_count: usize,

    /// Time the replenishment loop needs to reload one bay.
    pub reload: Duration,

    /// Targets that will descend over the whole run.
    pub total_targets: u32,

    /// Time between two vertical steps of a descending target.
    pub actor_step: Duration,

    pub spawn_interval_min: Duration,
    pub spawn_interval_max: Duration,
}

impl DifficultyConfig {
    /// Picks the delay before the next spawn; fixed when min >= max.
    pub fn spawn_interval(&self, rng: &mut impl Rng) -> Duration {
        if self.spawn_interval_min >= self.spawn_interval_max {
            return self.spawn_interval_min;
        }
        let min = self.spawn_interval_min.as_millis() as u64;
        let max = self.spawn_interval_max.as_millis() as u64;
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        DifficultyLevel::default().config()
    }
}
