//! Hand movement onset detection
//!
//! Tracks a hand's speed and records the first threshold crossing after the
//! detector is armed with a cue time. Runs on unscaled time so gameplay time
//! scaling never skews reaction times.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{HAND_SPEED_THRESHOLD, ONSET_DT_EPSILON};

/// Which tracked hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn index(&self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

/// A captured reaction time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandOnsetSample {
    pub hand: Hand,
    /// Unscaled clock at the cue
    pub cue_timestamp: f64,
    /// Unscaled clock at the onset tick
    pub onset_timestamp: f64,
    /// Seconds from cue to onset (never negative)
    pub reaction_time: f32,
}

/// Speed threshold edge detector with a one-shot latch per arm cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandOnsetDetector {
    pub hand: Hand,
    pub threshold: f32,
    last_pos: Option<Vec3>,
    cue: Option<f64>,
    captured: bool,
    /// A sub-threshold tick has been seen since arming
    seen_below: bool,
}

impl HandOnsetDetector {
    pub fn new(hand: Hand) -> Self {
        Self::with_threshold(hand, HAND_SPEED_THRESHOLD)
    }

    pub fn with_threshold(hand: Hand, threshold: f32) -> Self {
        Self {
            hand,
            threshold,
            last_pos: None,
            cue: None,
            captured: false,
            seen_below: false,
        }
    }

    /// Start a new capture cycle relative to `cue_timestamp`
    pub fn arm(&mut self, cue_timestamp: f64) {
        self.cue = Some(cue_timestamp);
        self.captured = false;
        self.seen_below = false;
    }

    /// Stop tracking; nothing is emitted
    pub fn disarm(&mut self) {
        self.cue = None;
        self.seen_below = false;
    }

    pub fn has_captured(&self) -> bool {
        self.captured
    }

    /// Tracking dropped out this tick. The next position only re-seeds, so
    /// motion across the gap is never read as one tick of speed.
    pub fn lose_tracking(&mut self) {
        self.last_pos = None;
    }

    /// Feed one tick of tracking. `dt` and `now` are unscaled.
    pub fn update(&mut self, pos: Vec3, dt: f32, now: f64) -> Option<HandOnsetSample> {
        let Some(last_pos) = self.last_pos.replace(pos) else {
            // First observation only seeds the position
            return None;
        };
        let cue = self.cue?;
        if self.captured || now < cue {
            return None;
        }

        let speed = (pos - last_pos).length() / dt.max(ONSET_DT_EPSILON);
        if speed < self.threshold {
            self.seen_below = true;
            return None;
        }
        if !self.seen_below {
            return None;
        }

        self.captured = true;
        let sample = HandOnsetSample {
            hand: self.hand,
            cue_timestamp: cue,
            onset_timestamp: now,
            reaction_time: (now - cue).max(0.0) as f32,
        };
        log::debug!(
            "{:?} hand onset {:.3}s (speed {:.2})",
            self.hand,
            sample.reaction_time,
            speed
        );
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 0.01;

    #[test]
    fn test_unarmed_never_emits() {
        let mut det = HandOnsetDetector::new(Hand::Left);
        assert!(det.update(Vec3::ZERO, DT, 0.0).is_none());
        assert!(det.update(Vec3::new(1.0, 0.0, 0.0), DT, 0.01).is_none());
    }

    #[test]
    fn test_emits_once_per_arm_cycle() {
        let mut det = HandOnsetDetector::new(Hand::Right);
        det.update(Vec3::ZERO, DT, 0.0);
        det.arm(0.0);

        // Still
        assert!(det.update(Vec3::ZERO, DT, 0.25).is_none());
        // 0.1m in 10ms = 10 m/s
        let sample = det.update(Vec3::new(0.1, 0.0, 0.0), DT, 0.5).unwrap();
        assert_eq!(sample.hand, Hand::Right);
        assert!((sample.reaction_time - 0.5).abs() < 1e-6);

        // Latched: slow then fast again does nothing
        assert!(det.update(Vec3::new(0.1, 0.0, 0.0), DT, 0.51).is_none());
        assert!(det.update(Vec3::new(0.5, 0.0, 0.0), DT, 0.52).is_none());

        // Re-arm opens a new cycle
        det.arm(1.0);
        assert!(det.update(Vec3::new(0.5, 0.0, 0.0), DT, 1.0).is_none());
        assert!(det.update(Vec3::new(0.6, 0.0, 0.0), DT, 1.25).is_some());
    }

    #[test]
    fn test_requires_crossing_from_below() {
        let mut det = HandOnsetDetector::new(Hand::Left);
        det.update(Vec3::ZERO, DT, 0.0);
        det.arm(0.0);
        // Already moving fast when armed
        assert!(det.update(Vec3::new(0.1, 0.0, 0.0), DT, 0.01).is_none());
        assert!(det.update(Vec3::new(0.2, 0.0, 0.0), DT, 0.02).is_none());
        // Stops, then moves again
        assert!(det.update(Vec3::new(0.2, 0.0, 0.0), DT, 0.03).is_none());
        assert!(det.update(Vec3::new(0.3, 0.0, 0.0), DT, 0.04).is_some());
    }

    #[test]
    fn test_disarm_stops_capture() {
        let mut det = HandOnsetDetector::new(Hand::Left);
        det.update(Vec3::ZERO, DT, 0.0);
        det.arm(0.0);
        det.update(Vec3::ZERO, DT, 0.01);
        det.disarm();
        assert!(det.update(Vec3::new(1.0, 0.0, 0.0), DT, 0.02).is_none());
        assert!(!det.has_captured());
    }

    #[test]
    fn test_ignores_ticks_before_cue() {
        let mut det = HandOnsetDetector::new(Hand::Left);
        det.update(Vec3::ZERO, DT, 0.0);
        det.arm(2.0);
        det.update(Vec3::ZERO, DT, 1.0);
        assert!(det.update(Vec3::new(1.0, 0.0, 0.0), DT, 1.5).is_none());
        assert!(det.update(Vec3::new(1.0, 0.0, 0.0), DT, 2.0).is_none());
        let sample = det.update(Vec3::new(2.0, 0.0, 0.0), DT, 2.5).unwrap();
        assert!((sample.reaction_time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tracking_gap_reseeds_position() {
        let mut det = HandOnsetDetector::new(Hand::Left);
        det.update(Vec3::ZERO, DT, 0.0);
        det.arm(0.0);
        assert!(det.update(Vec3::ZERO, DT, 0.01).is_none());

        // Hand drifted 0.5m while untracked; not an onset on reacquire
        det.lose_tracking();
        assert!(det.update(Vec3::new(0.5, 0.0, 0.0), DT, 0.5).is_none());
        assert!(det.update(Vec3::new(0.5, 0.0, 0.0), DT, 0.51).is_none());
        assert!(!det.has_captured());

        let sample = det.update(Vec3::new(0.6, 0.0, 0.0), DT, 0.52).unwrap();
        assert!((sample.reaction_time - 0.52).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_nonnegative_sample(
            steps in proptest::collection::vec(-0.05f32..0.05, 1..200),
            cue in 0.0f64..1.0,
        ) {
            let mut det = HandOnsetDetector::new(Hand::Left);
            det.update(Vec3::ZERO, DT, 0.0);
            det.arm(cue);
            let mut pos = Vec3::ZERO;
            let mut emitted = 0;
            for (i, step) in steps.iter().enumerate() {
                pos.x += step;
                let now = (i + 1) as f64 * DT as f64;
                if let Some(sample) = det.update(pos, DT, now) {
                    emitted += 1;
                    prop_assert!(sample.reaction_time >= 0.0);
                }
            }
            prop_assert!(emitted <= 1);
        }
    }
}
