//! Selective Goalie - VR Stroop reaction-inhibition game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (round state machine, projectiles, hand onset)
//! - `settings`: Round configuration with dropdown choices and JSON loading
//! - `ui`: Presentation sink the host engine implements (text, panels, audio)

pub mod settings;
pub mod sim;
pub mod ui;

pub use settings::{ConfigError, RoundSettings, TimeoutPolicy, Variant};
pub use ui::{AudioCue, NullSink, Panel, RoundSink, TextField};

use glam::{Vec2, Vec3};
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (90 Hz headset refresh)
    pub const SIM_DT: f32 = 1.0 / 90.0;

    /// Untouched projectiles are removed this long after spawn (seconds)
    pub const DESPAWN_SECONDS: f32 = 6.0;
    /// Length of the mid-round rule change banner (seconds)
    pub const RULE_CHANGE_PAUSE_SECONDS: f32 = 3.0;
    /// Each countdown label ("3", "2", "1", "GO!") is held this long
    pub const COUNTDOWN_STEP_SECONDS: f32 = 1.0;

    /// Round duration fallback (seconds)
    pub const DEFAULT_DURATION: u32 = 120;
    /// Projectile speed fallback (units/second)
    pub const DEFAULT_SPEED: f32 = 10.0;
    /// Spawn interval bounds (seconds)
    pub const DEFAULT_MIN_INTERVAL: f32 = 0.5;
    pub const DEFAULT_MAX_INTERVAL: f32 = 1.1;
    /// Radius of the disc on the goal plane that projectiles aim at
    pub const DEFAULT_GOAL_RADIUS: f32 = 0.5;

    /// Hand speed that counts as movement onset (m/s)
    pub const HAND_SPEED_THRESHOLD: f32 = 0.35;
    /// Lower bound on dt when computing hand speed
    pub const ONSET_DT_EPSILON: f32 = 1e-4;

    /// Body capsule defaults
    pub const BODY_MIN_HEIGHT: f32 = 1.2;
    pub const BODY_MAX_HEIGHT: f32 = 2.2;
    pub const BODY_RADIUS: f32 = 0.25;
    pub const BODY_FORWARD_OFFSET: f32 = 0.10;

    /// Player name used when none is entered
    pub const DEFAULT_PLAYER_NAME: &str = "Player";
}

/// Uniform point inside a disc of the given radius (like a scaled unit circle sample)
#[inline]
pub fn random_in_disc<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec2 {
    // sqrt keeps the density uniform over area
    let r = radius * rng.random::<f32>().sqrt();
    let theta = rng.random::<f32>() * std::f32::consts::TAU;
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Point on a plane spanned by `right`/`up` around `center`
#[inline]
pub fn plane_point(center: Vec3, right: Vec3, up: Vec3, offset: Vec2) -> Vec3 {
    center + right * offset.x + up * offset.y
}
