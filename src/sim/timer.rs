//! Explicit wait timers driven by the tick
//!
//! Each timer holds its remaining time and is advanced by the scaled dt.
//! Cancelling a timer just drops its deadline, so nothing fires afterwards.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::COUNTDOWN_STEP_SECONDS;

/// Labels shown during the pre-round countdown
pub const COUNTDOWN_LABELS: [&str; 4] = ["3", "2", "1", "GO!"];

/// One-shot wait
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Wait {
    remaining: Option<f32>,
}

impl Wait {
    pub fn start(&mut self, seconds: f32) {
        self.remaining = Some(seconds);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Advance. On the tick the wait completes, returns the part of `dt`
    /// left over past the deadline.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        let remaining = self.remaining.as_mut()?;
        *remaining -= dt;
        if *remaining <= 0.0 {
            let overshoot = -*remaining;
            self.remaining = None;
            Some(overshoot)
        } else {
            None
        }
    }
}

/// What one countdown advance did. `overshoot` is the unused part of `dt`,
/// to be fed into the next advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownStep {
    /// Still holding the current label
    Hold,
    /// Moved to a new label
    Show { label: &'static str, overshoot: f32 },
    /// "GO!" has been held its full step
    Finished { overshoot: f32 },
}

/// "3, 2, 1, GO!" with each label held one step
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Countdown {
    step: usize,
    wait: Wait,
}

impl Countdown {
    /// Restart at the first label and return it
    pub fn start(&mut self) -> &'static str {
        self.step = 0;
        self.wait.start(COUNTDOWN_STEP_SECONDS);
        COUNTDOWN_LABELS[0]
    }

    pub fn cancel(&mut self) {
        self.wait.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.wait.is_pending()
    }

    pub fn label(&self) -> Option<&'static str> {
        self.is_running().then(|| COUNTDOWN_LABELS[self.step])
    }

    /// Advance by at most one label. Call again with the returned overshoot
    /// until it holds, so a long tick walks through every label it covers.
    pub fn advance(&mut self, dt: f32) -> CountdownStep {
        let Some(overshoot) = self.wait.advance(dt) else {
            return CountdownStep::Hold;
        };
        self.step += 1;
        match COUNTDOWN_LABELS.get(self.step) {
            Some(label) => {
                self.wait.start(COUNTDOWN_STEP_SECONDS);
                CountdownStep::Show {
                    label: *label,
                    overshoot,
                }
            }
            None => CountdownStep::Finished { overshoot },
        }
    }
}

/// The spawn loop. There is only ever one; starting it again replaces the pending interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnScheduler {
    min_interval: f32,
    max_interval: f32,
    next_in: Option<f32>,
}

impl SpawnScheduler {
    pub fn new(min_interval: f32, max_interval: f32) -> Self {
        Self {
            min_interval,
            max_interval: max_interval.max(min_interval),
            next_in: None,
        }
    }

    fn draw_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        // An unbounded range cannot be sampled; fall back to the lower bound
        if self.max_interval > self.min_interval && self.max_interval.is_finite() {
            rng.random_range(self.min_interval..=self.max_interval)
        } else {
            self.min_interval
        }
    }

    /// Begin (or restart) waiting for the next spawn
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.next_in = Some(self.draw_interval(rng));
    }

    pub fn cancel(&mut self) {
        self.next_in = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_in.is_some()
    }

    pub fn next_in(&self) -> Option<f32> {
        self.next_in
    }

    /// Advance and return how many spawns are due this tick
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> u32 {
        let Some(mut next_in) = self.next_in else {
            return 0;
        };
        next_in -= dt;
        let mut due = 0;
        while next_in <= 0.0 {
            due += 1;
            next_in += self.draw_interval(rng).max(f32::EPSILON);
        }
        self.next_in = Some(next_in);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wait_fires_once() {
        let mut wait = Wait::default();
        assert_eq!(wait.advance(1.0), None);
        wait.start(3.0);
        assert_eq!(wait.advance(1.5), None);
        assert_eq!(wait.advance(1.5), Some(0.0));
        assert!(!wait.is_pending());
        assert_eq!(wait.advance(1.0), None);
    }

    #[test]
    fn test_wait_reports_overshoot() {
        let mut wait = Wait::default();
        wait.start(3.0);
        assert_eq!(wait.advance(4.5), Some(1.5));
        assert!(!wait.is_pending());
    }

    #[test]
    fn test_countdown_sequence() {
        let mut countdown = Countdown::default();
        assert_eq!(countdown.start(), "3");
        assert_eq!(countdown.advance(0.5), CountdownStep::Hold);
        assert_eq!(
            countdown.advance(0.5),
            CountdownStep::Show { label: "2", overshoot: 0.0 }
        );
        assert_eq!(
            countdown.advance(1.0),
            CountdownStep::Show { label: "1", overshoot: 0.0 }
        );
        assert_eq!(
            countdown.advance(1.0),
            CountdownStep::Show { label: "GO!", overshoot: 0.0 }
        );
        assert_eq!(countdown.label(), Some("GO!"));
        assert_eq!(countdown.advance(1.0), CountdownStep::Finished { overshoot: 0.0 });
        assert!(!countdown.is_running());
        assert_eq!(countdown.advance(1.0), CountdownStep::Hold);
    }

    #[test]
    fn test_countdown_long_tick_walks_every_label() {
        let mut countdown = Countdown::default();
        countdown.start();
        let mut dt = 4.5;
        let mut labels = Vec::new();
        loop {
            match countdown.advance(dt) {
                CountdownStep::Hold => panic!("countdown stalled with {} left", dt),
                CountdownStep::Show { label, overshoot } => {
                    labels.push(label);
                    dt = overshoot;
                }
                CountdownStep::Finished { overshoot } => {
                    assert_eq!(overshoot, 0.5);
                    break;
                }
            }
        }
        assert_eq!(labels, vec!["2", "1", "GO!"]);
    }

    #[test]
    fn test_scheduler_with_unbounded_max_uses_min() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut scheduler = SpawnScheduler::new(0.5, f32::INFINITY);
        scheduler.start(&mut rng);
        assert_eq!(scheduler.next_in(), Some(0.5));
    }

    #[test]
    fn test_scheduler_interval_bounds() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut scheduler = SpawnScheduler::new(0.5, 1.1);
        for _ in 0..100 {
            scheduler.start(&mut rng);
            let next = scheduler.next_in().unwrap();
            assert!((0.5..=1.1).contains(&next));
        }
    }

    #[test]
    fn test_scheduler_catches_up_on_long_tick() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut scheduler = SpawnScheduler::new(0.5, 0.5);
        scheduler.start(&mut rng);
        assert_eq!(scheduler.advance(0.25, &mut rng), 0);
        assert_eq!(scheduler.advance(0.25, &mut rng), 1);
        assert_eq!(scheduler.advance(1.0, &mut rng), 2);
    }

    #[test]
    fn test_cancelled_scheduler_never_fires() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut scheduler = SpawnScheduler::new(0.5, 1.1);
        scheduler.start(&mut rng);
        scheduler.cancel();
        assert_eq!(scheduler.advance(100.0, &mut rng), 0);
        assert!(!scheduler.is_active());
    }
}
