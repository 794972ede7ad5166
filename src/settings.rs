//! Round settings and dropdown choices
//!
//! Loaded from JSON by the host; anything malformed falls back to defaults.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Round duration choices offered in the start menu (seconds)
pub const DURATION_CHOICES: [u32; 3] = [120, 180, 300];
pub const DURATION_LABELS: [&str; 3] = ["2:00", "3:00", "5:00"];

/// Projectile speed choices offered in the start menu (units/second)
pub const SPEED_CHOICES: [f32; 5] = [6.0, 8.0, 10.0, 12.0, 14.0];
pub const SPEED_LABELS: [&str; 5] = ["Slow", "Medium-", "Medium", "Medium+", "Fast"];

/// Errors from loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid spawn interval: min {min} > max {max}")]
    IntervalRange { min: f32, max: f32 },

    #[error("No spawn points configured")]
    NoSpawnPoints,

    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be finite")]
    NonFiniteVector { field: &'static str },
}

/// Which manager rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Six-color palette, body blocks only ever penalize
    #[default]
    Selective,
    /// Two fixed color pairs that alternate, body blocks count as paddle blocks
    Stroop,
}

impl Variant {
    /// Whether a body contact is scored separately from a paddle contact
    pub fn distinguishes_body(&self) -> bool {
        matches!(self, Variant::Selective)
    }
}

/// What an untouched projectile does when it despawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeoutPolicy {
    /// Removed with no score effect
    #[default]
    Silent,
    /// An ignore-colored ball that never reached the goal was deflected: score it as a block
    IgnoreCountsAsBlock,
}

/// Round configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundSettings {
    pub variant: Variant,
    pub timeout_policy: TimeoutPolicy,

    // === Round ===
    /// Round length (seconds)
    pub duration: u32,
    /// Projectile speed (units/second)
    pub speed: f32,
    /// Spawn interval bounds (seconds)
    pub min_interval: f32,
    pub max_interval: f32,
    /// Gameplay time scale (hand onset ignores it)
    pub time_scale: f32,

    // === Arena ===
    pub spawn_points: Vec<Vec3>,
    pub goal_center: Vec3,
    /// Goal plane axes
    pub goal_right: Vec3,
    pub goal_up: Vec3,
    pub goal_radius: f32,

    // === Hand onset ===
    pub hand_speed_threshold: f32,
    /// Re-arm both hand detectors at every spawn, using the spawn as cue
    pub auto_arm_on_spawn: bool,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            variant: Variant::Selective,
            timeout_policy: TimeoutPolicy::Silent,

            duration: DEFAULT_DURATION,
            speed: DEFAULT_SPEED,
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            time_scale: 1.0,

            // Three launchers in an arc ten meters out
            spawn_points: vec![
                Vec3::new(-2.0, 1.6, 10.0),
                Vec3::new(0.0, 1.8, 10.0),
                Vec3::new(2.0, 1.6, 10.0),
            ],
            goal_center: Vec3::new(0.0, 1.2, 0.0),
            goal_right: Vec3::X,
            goal_up: Vec3::Y,
            goal_radius: DEFAULT_GOAL_RADIUS,

            hand_speed_threshold: HAND_SPEED_THRESHOLD,
            auto_arm_on_spawn: false,
        }
    }
}

impl RoundSettings {
    /// Settings for a variant with everything else default
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from JSON, falling back to defaults on any error
    pub fn load_or_default(json: Option<&str>) -> Self {
        let Some(json) = json else {
            log::info!("Using default round settings");
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded round settings ({:?})", settings.variant);
                settings
            }
            Err(e) => {
                log::warn!("{} - using default round settings", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spawn_points.is_empty() {
            return Err(ConfigError::NoSpawnPoints);
        }
        // serde_json reads out-of-range numbers like 1e39 as infinity
        for (field, value) in [
            ("speed", self.speed),
            ("min_interval", self.min_interval),
            ("max_interval", self.max_interval),
            ("time_scale", self.time_scale),
            ("goal_radius", self.goal_radius),
            ("hand_speed_threshold", self.hand_speed_threshold),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("goal_center", self.goal_center),
            ("goal_right", self.goal_right),
            ("goal_up", self.goal_up),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteVector { field });
            }
        }
        if !self.spawn_points.iter().all(|p| p.is_finite()) {
            return Err(ConfigError::NonFiniteVector { field: "spawn_points" });
        }
        if self.duration == 0 {
            return Err(ConfigError::NonPositive {
                field: "duration",
                value: 0.0,
            });
        }
        if self.min_interval > self.max_interval {
            return Err(ConfigError::IntervalRange {
                min: self.min_interval,
                max: self.max_interval,
            });
        }
        Ok(())
    }

    /// Apply a duration choice; anything not on the menu falls back to the default
    pub fn select_duration(&mut self, seconds: u32) {
        if DURATION_CHOICES.contains(&seconds) {
            self.duration = seconds;
        } else {
            log::warn!("Unknown duration {}s, falling back to {}s", seconds, DEFAULT_DURATION);
            self.duration = DEFAULT_DURATION;
        }
    }

    /// Apply a speed choice; anything not on the menu falls back to the default
    pub fn select_speed(&mut self, speed: f32) {
        if SPEED_CHOICES.iter().any(|s| (s - speed).abs() < f32::EPSILON) {
            self.speed = speed;
        } else {
            log::warn!("Unknown speed {}, falling back to {}", speed, DEFAULT_SPEED);
            self.speed = DEFAULT_SPEED;
        }
    }

    /// Dropdown index handler; out-of-range indices leave the duration alone
    pub fn select_duration_index(&mut self, index: usize) {
        match DURATION_CHOICES.get(index) {
            Some(&seconds) => self.duration = seconds,
            None => log::warn!("Duration dropdown index {} out of range", index),
        }
    }

    /// Dropdown index handler; out-of-range indices leave the speed alone
    pub fn select_speed_index(&mut self, index: usize) {
        match SPEED_CHOICES.get(index) {
            Some(&speed) => self.speed = speed,
            None => log::warn!("Speed dropdown index {} out of range", index),
        }
    }

    /// Dropdown entry matching the current duration (first entry if none)
    pub fn duration_index(&self) -> usize {
        DURATION_CHOICES
            .iter()
            .position(|&d| d == self.duration)
            .unwrap_or(0)
    }

    /// Dropdown entry matching the current speed ("Medium" if none)
    pub fn speed_index(&self) -> usize {
        SPEED_CHOICES
            .iter()
            .position(|s| (s - self.speed).abs() < f32::EPSILON)
            .unwrap_or(2)
    }
}
