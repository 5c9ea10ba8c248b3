// Domain layer: entity records, run rules and the ports the core talks through.

pub mod errors;
pub mod geometry;
pub mod ports;
pub mod report;
pub mod slots;
pub mod snapshot;
pub mod state;
pub mod tuning;

pub use errors::{LaunchError, StartupError};
pub use geometry::{AimDirection, Position, ViewportMetrics};
pub use ports::{InputSource, PresentationSink, TaskKind, TaskLauncher};
pub use report::RunReport;
pub use slots::{SlotKey, SlotTable};
pub use snapshot::{BayGauge, HitMarker, MarkerRing, ProjectileView, Snapshot};
pub use state::{
    Action, Actor, Aim, EndReason, LaunchBay, Projectile, RunCounters, RunState, Verdict,
};
pub use tuning::{CombatTuning, DifficultyConfig, DifficultyLevel};
