// Command-line surface.

use crate::domain::DifficultyLevel;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "anti_air",
    version,
    about = "Terminal anti-air defence",
    after_help = "Rules:\n  The run ends when every ship is destroyed or reaches the ground,\n  or immediately once more than half of them reach the ground.\n  Victory requires destroying at least half of the ships.\n\nControls:\n  A/D Move | W/Q/E/Z/C Direction | SPACE Fire | X/ESC Quit"
)]
pub struct Cli {
    /// Difficulty: 0|easy, 1|medium, 2|hard.
    #[arg(value_parser = parse_difficulty, default_value = "medium")]
    pub difficulty: DifficultyLevel,

    /// Run without a terminal: nothing is drawn and no keys are read.
    #[arg(long)]
    pub headless: bool,

    /// Seed for the spawn generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the final report as JSON.
    #[arg(long)]
    pub json: bool,
}

fn parse_difficulty(value: &str) -> Result<DifficultyLevel, String> {
    if let Ok(index) = value.parse::<u8>() {
        return DifficultyLevel::from_index(index)
            .ok_or_else(|| format!("difficulty index must be 0, 1 or 2 (got {index})"));
    }
    DifficultyLevel::ALL
        .into_iter()
        .find(|level| level.name().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown difficulty '{value}'"))
}
