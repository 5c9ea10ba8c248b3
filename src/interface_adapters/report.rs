// End-of-run report formatting.

use crate::domain::{RunReport, Verdict};

pub fn render_text(report: &RunReport) -> String {
    let rule = "=".repeat(40);
    let verdict = match report.verdict {
        Verdict::Victory => "*** VICTORY! ***",
        Verdict::DefeatOverrun => "*** DEFEAT! (too many reached ground) ***",
        Verdict::DefeatTooFewKills => "*** DEFEAT! (destroyed less than half) ***",
    };
    format!(
        "\n{rule}\n{:^40}\n{rule}\n\
         Difficulty: {}\n\
         Final Score: {}\n\
         Ships Destroyed: {} / {}\n\
         Ships Reached Ground: {}\n\
         Shots: {} | Hits: {} | Accuracy: {:.1}%\n\
         Best Streak: {}\n\
         Time: {}s\n\
         {verdict}\n{rule}\n",
        "GAME OVER",
        report.difficulty.name(),
        report.score,
        report.destroyed,
        report.total,
        report.escaped,
        report.shots,
        report.hits,
        report.accuracy,
        report.best_streak,
        report.elapsed_secs,
    )
}

pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DifficultyLevel, RunCounters};
    use std::time::Duration;

    fn report() -> RunReport {
        RunReport::new(
            DifficultyLevel::Hard,
            RunCounters {
                score: 320,
                total: 60,
                destroyed: 32,
                escaped: 28,
                spawned: 60,
                shots: 40,
                hits: 32,
                streak: 0,
                best_streak: 9,
                elapsed: Duration::from_secs(95),
            },
        )
    }

    #[test]
    fn when_text_is_rendered_then_counters_and_verdict_appear() {
        let text = render_text(&report());
        assert!(text.contains("Final Score: 320"));
        assert!(text.contains("Ships Destroyed: 32 / 60"));
        assert!(text.contains("Accuracy: 80.0%"));
        assert!(text.contains("Time: 95s"));
        assert!(text.contains("VICTORY"));
    }

    #[test]
    fn when_json_is_rendered_then_verdict_uses_snake_case() {
        let json = render_json(&report()).expect("report serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["verdict"], "victory");
        assert_eq!(value["difficulty"], "hard");
        assert_eq!(value["best_streak"], 9);
    }
}
