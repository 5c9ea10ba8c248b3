// Use cases layer: the concurrent simulation core.

pub mod actor;
pub mod fire;
pub mod game;
pub mod gate;
pub mod input;
pub mod launcher;
pub mod projectile;
pub mod publisher;
pub mod reload;
pub mod supervisor;
pub mod world;

pub use fire::fire;
pub use game::orchestrate;
pub use input::{apply, spawn_input_loop};
pub use launcher::TokioLauncher;
pub use publisher::Publisher;
pub use reload::run_reloader;
pub use supervisor::{LoopHandles, ShutdownReport, SpawnOutcome, Supervisor};
pub use world::{Population, World, WorldLimits, WorldSettings};
