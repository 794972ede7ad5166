//! Round state, scoring and events
//!
//! Everything the round controller mutates lives here.

use serde::{Deserialize, Serialize};

use super::onset::HandOnsetSample;
use super::palette::ColorId;
use super::projectile::{Outcome, Projectile, ProjectileId};
use super::rules::RuleContext;
use crate::settings::{TimeoutPolicy, Variant};
use crate::ui::AudioCue;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Start menu is up, waiting for the start action
    #[default]
    PreStart,
    /// "3, 2, 1, GO!"
    Countdown,
    /// Active gameplay
    Playing,
    /// Mid-round rule change banner (3 seconds)
    RuleChangePause,
    /// Results are showing
    Ended,
}

/// Which counter an outcome bumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Counter {
    GoodBlocks,
    BadBlocks,
    MissedBlocks,
    IgnoreMissed,
}

/// Score change for one resolved projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEffect {
    pub counter: Option<Counter>,
    pub delta: i32,
    pub cue: Option<AudioCue>,
}

impl ScoreEffect {
    const NONE: Self = Self {
        counter: None,
        delta: 0,
        cue: None,
    };
    const GOOD_BLOCK: Self = Self {
        counter: Some(Counter::GoodBlocks),
        delta: 1,
        cue: Some(AudioCue::Block),
    };
    const BAD_BLOCK: Self = Self {
        counter: Some(Counter::BadBlocks),
        delta: -1,
        cue: Some(AudioCue::Buzzer),
    };
}

/// Scoring table for a resolved projectile
pub fn score_outcome(
    outcome: Outcome,
    is_danger: bool,
    variant: Variant,
    timeout_policy: TimeoutPolicy,
) -> ScoreEffect {
    match outcome {
        Outcome::BlockedByPaddle => paddle_block(is_danger),
        Outcome::BlockedByBody if !variant.distinguishes_body() => paddle_block(is_danger),
        // Body blocks never earn points, only penalize ignores
        Outcome::BlockedByBody if is_danger => ScoreEffect::NONE,
        Outcome::BlockedByBody => ScoreEffect::BAD_BLOCK,
        Outcome::ReachedGoal if is_danger => ScoreEffect {
            counter: Some(Counter::MissedBlocks),
            delta: -1,
            cue: Some(AudioCue::Buzzer),
        },
        Outcome::ReachedGoal => ScoreEffect {
            counter: Some(Counter::IgnoreMissed),
            delta: 0,
            cue: None,
        },
        Outcome::TimedOut => match timeout_policy {
            TimeoutPolicy::IgnoreCountsAsBlock if !is_danger => ScoreEffect::BAD_BLOCK,
            _ => ScoreEffect::NONE,
        },
    }
}

fn paddle_block(is_danger: bool) -> ScoreEffect {
    if is_danger {
        ScoreEffect::GOOD_BLOCK
    } else {
        ScoreEffect::BAD_BLOCK
    }
}

/// Score and counters for the current round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundStats {
    pub score: i32,
    pub good_blocks: u32,
    pub bad_blocks: u32,
    pub missed_blocks: u32,
    pub ignore_missed: u32,
    pub onsets: Vec<HandOnsetSample>,
}

impl RoundStats {
    pub fn apply(&mut self, effect: &ScoreEffect) {
        self.score += effect.delta;
        match effect.counter {
            Some(Counter::GoodBlocks) => self.good_blocks += 1,
            Some(Counter::BadBlocks) => self.bad_blocks += 1,
            Some(Counter::MissedBlocks) => self.missed_blocks += 1,
            Some(Counter::IgnoreMissed) => self.ignore_missed += 1,
            None => {}
        }
    }

    /// bad / (good + bad), 0 with no blocks
    pub fn error_rate(&self) -> f32 {
        let total = self.good_blocks + self.bad_blocks;
        if total == 0 {
            0.0
        } else {
            self.bad_blocks as f32 / total as f32
        }
    }

    pub fn mean_reaction_time(&self) -> Option<f32> {
        if self.onsets.is_empty() {
            return None;
        }
        let sum: f32 = self.onsets.iter().map(|s| s.reaction_time).sum();
        Some(sum / self.onsets.len() as f32)
    }
}

/// End-of-round results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub player_name: String,
    pub score: i32,
    pub good_blocks: u32,
    pub bad_blocks: u32,
    pub missed_blocks: u32,
    pub ignore_missed: u32,
    pub error_rate: f32,
    pub onset_count: usize,
    pub mean_reaction_time: Option<f32>,
}

impl RoundSummary {
    pub fn from_stats(player_name: &str, stats: &RoundStats) -> Self {
        Self {
            player_name: player_name.to_string(),
            score: stats.score,
            good_blocks: stats.good_blocks,
            bad_blocks: stats.bad_blocks,
            missed_blocks: stats.missed_blocks,
            ignore_missed: stats.ignore_missed,
            error_rate: stats.error_rate(),
            onset_count: stats.onsets.len(),
            mean_reaction_time: stats.mean_reaction_time(),
        }
    }

    /// Error rate as a one-decimal percentage, e.g. `25.0%`
    pub fn error_percent(&self) -> String {
        format!("{:.1}%", self.error_rate * 100.0)
    }
}

/// Logical events, drained by the host each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    PhaseChanged {
        from: RoundPhase,
        to: RoundPhase,
    },
    CountdownLabel(String),
    ProjectileSpawned {
        id: ProjectileId,
        color: ColorId,
        is_danger: bool,
    },
    ProjectileResolved {
        id: ProjectileId,
        outcome: Outcome,
        is_danger: bool,
        effect: ScoreEffect,
    },
    RulesChanged {
        previous: RuleContext,
        current: RuleContext,
    },
    HandOnset(HandOnsetSample),
    RoundEnded(RoundSummary),
}

/// Serializable round data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub player_name: String,
    /// Remaining seconds, never negative
    pub timer: f32,
    /// Duration captured when play began
    pub round_duration: f32,
    /// Scaled seconds of play since the round began
    pub round_clock: f32,
    pub stats: RoundStats,
    /// The one-shot mid-round rule change has happened
    pub rules_changed: bool,
    /// Live projectiles (sorted by id)
    pub projectiles: Vec<Projectile>,
    next_id: ProjectileId,
}

impl RoundState {
    pub fn next_projectile_id(&mut self) -> ProjectileId {
        self.next_id += 1;
        self.next_id
    }

    /// Clear per-round data for a new round
    pub fn reset_round(&mut self, duration: f32) {
        self.timer = duration;
        self.round_duration = duration;
        self.round_clock = 0.0;
        self.stats = RoundStats::default();
        self.rules_changed = false;
    }

    pub fn projectile_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.projectiles.iter_mut().find(|p| p.id == id)
    }
}
