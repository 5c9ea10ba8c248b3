//! Gameplay tuning shared by every difficulty level.
//!
//! Keep this separate from runtime configuration (frame cadence, log targets, etc.).
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatTuning {
    /// Time between two steps of an in-flight projectile.
    pub projectile_step: Duration,

    /// Forgiving collision window in cells, applied on both axes by both sides.
    pub hit_tolerance: i32,

    /// Points credited for each destroyed target.
    pub score_per_kill: u32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            projectile_step: Duration::from_millis(35),
            hit_tolerance: 2,
            score_per_kill: 10,
        }
    }
}
