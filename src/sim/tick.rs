//! Per-frame round advance
//!
//! The host calls [`RoundController::tick`] once per frame with the raw frame
//! delta. Gameplay timers use the scaled delta; hand onset uses the raw one.

use glam::Vec3;
use rand::Rng;

use super::body::{BodyCapsule, HeadPose};
use super::onset::Hand;
use super::projectile::{Outcome, ProjectileId};
use super::round::RoundController;
use super::rules::RuleContext;
use super::state::{RoundEvent, RoundPhase, RoundSummary};
use super::timer::{CountdownStep, SpawnScheduler};
use crate::consts::RULE_CHANGE_PAUSE_SECONDS;
use crate::ui::{self, Panel, TextField};

/// Tracking input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tracked hand (paddle) positions, indexed by [`Hand::index`]
    pub hands: [Option<Vec3>; 2],
    /// Headset pose for the body capsule
    pub head: Option<HeadPose>,
    /// Floor height of the XR rig
    pub rig_base_y: f32,
}

impl<R: Rng> RoundController<R> {
    /// Advance with no tracking input
    pub fn step(&mut self, dt: f32) {
        self.tick(&TickInput::default(), dt);
    }

    /// Advance the round by one frame
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let dt = dt.max(0.0);
        self.unscaled_clock += dt as f64;
        let scaled_dt = dt * self.settings.time_scale;

        if let Some(head) = &input.head {
            self.body = Some(BodyCapsule::track(head, input.rig_base_y, &self.body_shape));
        }
        self.track_hands(input, dt);

        match self.state.phase {
            RoundPhase::Countdown => self.advance_countdown(scaled_dt),
            RoundPhase::Playing => self.advance_playing(scaled_dt),
            RoundPhase::RuleChangePause => {
                let overshoot = self.pause.advance(scaled_dt);
                // Balls already in flight keep going while the banner is up
                let paused = scaled_dt - overshoot.unwrap_or(0.0);
                self.state.round_clock += paused;
                self.advance_projectiles(paused);
                if let Some(rest) = overshoot {
                    self.resume_play();
                    if rest > 0.0 {
                        self.advance_playing(rest);
                    }
                }
            }
            RoundPhase::PreStart | RoundPhase::Ended => {}
        }
    }

    /// Walk through every label the tick covers, then hand leftover time to play
    fn advance_countdown(&mut self, dt: f32) {
        let mut dt = dt;
        loop {
            match self.countdown.advance(dt) {
                CountdownStep::Hold => return,
                CountdownStep::Show { label, overshoot } => {
                    self.events.push(RoundEvent::CountdownLabel(label.to_string()));
                    self.notify(|sink| sink.set_text(TextField::Countdown, label));
                    dt = overshoot;
                }
                CountdownStep::Finished { overshoot } => {
                    self.begin_play();
                    if overshoot > 0.0 {
                        self.advance_playing(overshoot);
                    }
                    return;
                }
            }
        }
    }

    fn advance_playing(&mut self, dt: f32) {
        self.state.timer = (self.state.timer - dt).max(0.0);
        self.state.round_clock += dt;
        let timer = ui::timer_text(self.state.timer);
        self.notify(|sink| sink.set_text(TextField::Timer, &timer));

        self.advance_projectiles(dt);

        if self.state.timer <= 0.0 {
            self.end_round();
        } else if !self.state.rules_changed && self.state.timer <= self.state.round_duration / 2.0 {
            self.begin_rule_change();
        } else {
            let due = self.spawner.advance(dt, &mut self.rng);
            for _ in 0..due {
                self.spawn_random();
            }
        }
    }

    fn track_hands(&mut self, input: &TickInput, dt: f32) {
        let now = self.unscaled_clock;
        for hand in Hand::ALL {
            let Some(pos) = input.hands[hand.index()] else {
                self.hands[hand.index()].lose_tracking();
                continue;
            };
            let Some(sample) = self.hands[hand.index()].update(pos, dt, now) else {
                continue;
            };
            if self.is_live_phase() {
                self.state.stats.onsets.push(sample);
            }
            self.events.push(RoundEvent::HandOnset(sample));
        }
    }

    fn advance_projectiles(&mut self, dt: f32) {
        let timed_out: Vec<(ProjectileId, Outcome)> = self
            .state
            .projectiles
            .iter_mut()
            .filter_map(|p| p.advance(dt).map(|outcome| (p.id, outcome)))
            .collect();
        for (id, outcome) in timed_out {
            self.finish_projectile(id, outcome);
        }
    }

    fn begin_play(&mut self) {
        self.state.reset_round(self.settings.duration as f32);
        self.spawner = SpawnScheduler::new(self.settings.min_interval, self.settings.max_interval);
        self.spawner.start(&mut self.rng);
        self.set_phase(RoundPhase::Playing);

        let score = ui::score_text(0);
        let timer = ui::timer_text(self.state.timer);
        self.notify(|sink| {
            sink.set_visible(Panel::StartMenu, false);
            sink.set_visible(Panel::Countdown, false);
            sink.set_visible(Panel::StartRules, false);
            sink.set_visible(Panel::Results, false);
            sink.set_visible(Panel::Hud, true);
            sink.set_text(TextField::Score, &score);
            sink.set_text(TextField::Timer, &timer);
        });
        self.show_hud_rules();
    }

    fn begin_rule_change(&mut self) {
        self.state.rules_changed = true;
        self.spawner.cancel();

        let previous = self.rules;
        self.rules = RuleContext::draw(&mut self.rng, self.settings.variant, Some(&previous));
        self.pause.start(RULE_CHANGE_PAUSE_SECONDS);
        self.set_phase(RoundPhase::RuleChangePause);
        self.events.push(RoundEvent::RulesChanged {
            previous,
            current: self.rules,
        });

        let block = self.rules.block_text().markup();
        let ignore = self.rules.ignore_text().markup();
        self.notify(|sink| {
            sink.set_text(TextField::BannerBlockRule, &block);
            sink.set_text(TextField::BannerIgnoreRule, &ignore);
            sink.set_visible(Panel::RuleChangeBanner, true);
        });
    }

    fn resume_play(&mut self) {
        // Restarting replaces any pending interval, so only one loop runs
        self.spawner.start(&mut self.rng);
        self.set_phase(RoundPhase::Playing);
        self.notify(|sink| sink.set_visible(Panel::RuleChangeBanner, false));
        self.show_hud_rules();
    }

    fn end_round(&mut self) {
        self.state.timer = 0.0;
        self.spawner.cancel();
        self.pause.cancel();
        self.disarm_hand_detector();
        self.clear_projectiles();
        self.set_phase(RoundPhase::Ended);

        let summary = RoundSummary::from_stats(&self.state.player_name, &self.state.stats);
        log::info!(
            "Round over for {}: score {}, error {}",
            summary.player_name,
            summary.score,
            summary.error_percent()
        );
        let results = ui::results_text(&summary);
        let timer = ui::timer_text(0.0);
        self.notify(|sink| {
            sink.set_paddles_active(false);
            sink.set_visible(Panel::Results, true);
            sink.set_text(TextField::Results, &results);
            sink.set_text(TextField::Timer, &timer);
        });
        self.events.push(RoundEvent::RoundEnded(summary));
    }
}
