// Final run summary handed to the reporting collaborator.

use super::state::{RunCounters, Verdict};
use super::tuning::DifficultyLevel;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub difficulty: DifficultyLevel,
    pub score: u32,
    pub destroyed: u32,
    pub total: u32,
    pub escaped: u32,
    pub shots: u32,
    pub hits: u32,
    pub accuracy: f64,
    pub best_streak: u32,
    pub elapsed_secs: u64,
    pub verdict: Verdict,
}

impl RunReport {
    pub fn new(difficulty: DifficultyLevel, counters: RunCounters) -> Self {
        Self {
            difficulty,
            score: counters.score,
            destroyed: counters.destroyed,
            total: counters.total,
            escaped: counters.escaped,
            shots: counters.shots,
            hits: counters.hits,
            accuracy: counters.accuracy(),
            best_streak: counters.best_streak,
            elapsed_secs: counters.elapsed.as_secs(),
            verdict: counters.verdict(),
        }
    }
}
