//! Presentation sink
//!
//! The host engine owns canvases, text widgets and audio sources. The round
//! controller pushes updates through [`RoundSink`]; every method defaults to a
//! no-op so a host only implements what it has wired up.

use serde::{Deserialize, Serialize};

use crate::sim::projectile::{Projectile, ProjectileId};
use crate::sim::state::RoundSummary;

/// Sound triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    /// Danger ball blocked
    Block,
    /// Mistake: ignore ball blocked, or danger ball missed
    Buzzer,
}

/// Show/hide groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    /// World-space start menu (name, dropdowns, start button)
    StartMenu,
    StartButton,
    Dropdowns,
    Countdown,
    /// Rule text next to the start menu
    StartRules,
    /// Corner HUD (score, timer, rules)
    Hud,
    RuleChangeBanner,
    Results,
}

/// Text widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextField {
    Countdown,
    Score,
    Timer,
    BlockRule,
    IgnoreRule,
    BannerBlockRule,
    BannerIgnoreRule,
    Results,
}

/// Host-side presentation hooks
pub trait RoundSink {
    fn set_visible(&mut self, _panel: Panel, _visible: bool) {}
    fn set_text(&mut self, _field: TextField, _text: &str) {}
    fn play(&mut self, _cue: AudioCue) {}
    /// Enable or disable the paddle actors
    fn set_paddles_active(&mut self, _active: bool) {}
    fn projectile_spawned(&mut self, _projectile: &Projectile) {}
    fn projectile_destroyed(&mut self, _id: ProjectileId) {}
}

/// Sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RoundSink for NullSink {}

pub fn score_text(score: i32) -> String {
    format!("Score: {}", score)
}

/// Whole seconds, rounded up
pub fn timer_text(remaining: f32) -> String {
    format!("Time: {}", remaining.max(0.0).ceil() as u32)
}

/// Results panel body
pub fn results_text(summary: &RoundSummary) -> String {
    let mut text = format!(
        "<size=120%><b>Game Over!</b></size>\n\n\
         <size=115%>Score: <b>{}</b></size>\n\n\
         Danger Balls Blocked: <b>{}</b>\n\
         Ignore Balls Blocked: <b>{}</b>\n\
         Missed Danger Balls: <b>{}</b>\n\
         Missed Ignore Balls: <b>{}</b>\n\
         <size=115%>Error %: <b>{}</b></size>",
        summary.score,
        summary.good_blocks,
        summary.bad_blocks,
        summary.missed_blocks,
        summary.ignore_missed,
        summary.error_percent(),
    );
    if let Some(mean) = summary.mean_reaction_time {
        text.push_str(&format!("\nMean Reaction: <b>{:.0} ms</b>", mean * 1000.0));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_text_rounds_up() {
        assert_eq!(timer_text(119.2), "Time: 120");
        assert_eq!(timer_text(60.0), "Time: 60");
        assert_eq!(timer_text(-0.5), "Time: 0");
    }

    #[test]
    fn test_results_text() {
        let summary = RoundSummary {
            player_name: "Ana".into(),
            score: 2,
            good_blocks: 3,
            bad_blocks: 1,
            missed_blocks: 0,
            ignore_missed: 4,
            error_rate: 0.25,
            onset_count: 2,
            mean_reaction_time: Some(0.4125),
        };
        let text = results_text(&summary);
        assert!(text.contains("Score: <b>2</b>"));
        assert!(text.contains("Missed Ignore Balls: <b>4</b>"));
        assert!(text.contains("Error %: <b>25.0%</b>"));
        assert!(text.contains("Mean Reaction: <b>412 ms</b>") || text.contains("Mean Reaction: <b>413 ms</b>"));
    }
}
