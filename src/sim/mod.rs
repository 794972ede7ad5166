//! Round simulation
//!
//! All gameplay logic lives here. This module is engine-agnostic:
//! - Seeded RNG only (injected into the controller)
//! - Explicit timers advanced by the tick, no background tasks
//! - Stable iteration order (projectiles by id)
//! - No rendering or platform dependencies; presentation goes through `RoundSink`

pub mod body;
pub mod onset;
pub mod palette;
pub mod projectile;
pub mod round;
pub mod rules;
pub mod state;
pub mod tick;
pub mod timer;

pub use body::{BodyCapsule, BodyShape, HeadPose};
pub use onset::{Hand, HandOnsetDetector, HandOnsetSample};
pub use palette::{ColorId, MASTER_PALETTE};
pub use projectile::{
    ContactKind, Outcome, Projectile, ProjectileId, ProjectileState, SurfaceCategory,
    classify_contact,
};
pub use round::RoundController;
pub use rules::{RuleContext, RuleError, RuleText, STROOP_PAIRS};
pub use state::{
    Counter, RoundEvent, RoundPhase, RoundState, RoundStats, RoundSummary, ScoreEffect,
    score_outcome,
};
pub use tick::TickInput;
pub use timer::{COUNTDOWN_LABELS, Countdown, CountdownStep, SpawnScheduler, Wait};
