//! Round controller
//!
//! Owns the round state machine and everything the host talks to: start and
//! reset actions, projectile contact reports, dropdown selections and hand
//! detector arming. The per-frame advance lives in `tick.rs`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::{BodyCapsule, BodyShape};
use super::onset::{Hand, HandOnsetDetector};
use super::palette::ColorId;
use super::projectile::{
    ContactKind, Outcome, Projectile, ProjectileId, SurfaceCategory, classify_contact,
};
use super::rules::RuleContext;
use super::state::{RoundEvent, RoundPhase, RoundState, RoundStats, RoundSummary, score_outcome};
use super::timer::{Countdown, SpawnScheduler, Wait};
use crate::consts::*;
use crate::settings::RoundSettings;
use crate::ui::{self, Panel, RoundSink, TextField};
use crate::{plane_point, random_in_disc};

/// The round state machine plus its collaborators
pub struct RoundController<R: Rng = Pcg32> {
    pub(super) settings: RoundSettings,
    pub(super) state: RoundState,
    pub(super) rules: RuleContext,
    pub(super) countdown: Countdown,
    pub(super) pause: Wait,
    pub(super) spawner: SpawnScheduler,
    pub(super) hands: [HandOnsetDetector; 2],
    pub(super) body_shape: BodyShape,
    pub(super) body: Option<BodyCapsule>,
    /// Seconds of real time fed to `tick`, ignoring the time scale
    pub(super) unscaled_clock: f64,
    pub(super) events: Vec<RoundEvent>,
    pub(super) sink: Option<Box<dyn RoundSink>>,
    pub(super) rng: R,
}

impl RoundController<Pcg32> {
    /// Controller with a seeded PCG source
    pub fn with_seed(settings: RoundSettings, seed: u64) -> Self {
        Self::new(settings, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> RoundController<R> {
    pub fn new(settings: RoundSettings, mut rng: R) -> Self {
        let rules = RuleContext::draw(&mut rng, settings.variant, None);
        let threshold = settings.hand_speed_threshold;
        let spawner = SpawnScheduler::new(settings.min_interval, settings.max_interval);
        let mut state = RoundState::default();
        state.timer = settings.duration as f32;
        Self {
            settings,
            state,
            rules,
            countdown: Countdown::default(),
            pause: Wait::default(),
            spawner,
            hands: [
                HandOnsetDetector::with_threshold(Hand::Left, threshold),
                HandOnsetDetector::with_threshold(Hand::Right, threshold),
            ],
            body_shape: BodyShape::default(),
            body: None,
            unscaled_clock: 0.0,
            events: Vec::new(),
            sink: None,
            rng,
        }
    }

    /// Install the presentation sink and bring it to the start menu
    pub fn set_sink(&mut self, sink: Box<dyn RoundSink>) {
        self.sink = Some(sink);
        self.show_start_ui();
    }

    pub fn take_sink(&mut self) -> Option<Box<dyn RoundSink>> {
        self.sink.take()
    }

    pub fn set_body_shape(&mut self, shape: BodyShape) {
        self.body_shape = shape;
    }

    // === Accessors ===

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn timer(&self) -> f32 {
        self.state.timer
    }

    pub fn stats(&self) -> &RoundStats {
        &self.state.stats
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn rules(&self) -> &RuleContext {
        &self.rules
    }

    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.state.projectiles
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.state.projectiles.iter().find(|p| p.id == id)
    }

    pub fn body_capsule(&self) -> Option<&BodyCapsule> {
        self.body.as_ref()
    }

    pub fn hand_detector(&self, hand: Hand) -> &HandOnsetDetector {
        &self.hands[hand.index()]
    }

    /// Whether the spawn loop has a pending spawn
    pub fn is_spawning(&self) -> bool {
        self.spawner.is_active()
    }

    /// Whether the rule change banner is counting down
    pub fn is_rule_change_pending(&self) -> bool {
        self.pause.is_pending()
    }

    pub fn unscaled_time(&self) -> f64 {
        self.unscaled_clock
    }

    /// Results for the current (or just ended) round
    pub fn summary(&self) -> RoundSummary {
        RoundSummary::from_stats(&self.state.player_name, &self.state.stats)
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    // === Host actions ===

    /// Start action from the menu. Only valid on the start menu.
    pub fn start_round(&mut self, player_name: &str) -> bool {
        if self.state.phase != RoundPhase::PreStart {
            log::debug!("start_round ignored in {:?}", self.state.phase);
            return false;
        }
        let name = player_name.trim();
        self.state.player_name = if name.is_empty() {
            DEFAULT_PLAYER_NAME.to_string()
        } else {
            name.to_string()
        };

        self.rules = RuleContext::draw(&mut self.rng, self.settings.variant, None);
        let label = self.countdown.start();
        self.set_phase(RoundPhase::Countdown);
        self.events.push(RoundEvent::CountdownLabel(label.to_string()));
        log::info!("Round starting for {}", self.state.player_name);

        let block = self.rules.block_text().markup();
        let ignore = self.rules.ignore_text().markup();
        self.notify(|sink| {
            sink.set_visible(Panel::Dropdowns, false);
            sink.set_visible(Panel::StartButton, false);
            sink.set_visible(Panel::Countdown, true);
            sink.set_text(TextField::Countdown, label);
            sink.set_visible(Panel::StartRules, true);
            sink.set_text(TextField::BlockRule, &block);
            sink.set_text(TextField::IgnoreRule, &ignore);
            sink.set_paddles_active(true);
        });
        true
    }

    /// Back to the start menu from any phase. Cancels every pending timer and
    /// removes all live projectiles.
    pub fn reset_round(&mut self) {
        self.countdown.cancel();
        self.pause.cancel();
        self.spawner.cancel();
        self.disarm_hand_detector();
        self.clear_projectiles();

        self.state.reset_round(self.settings.duration as f32);
        self.state.player_name.clear();
        self.rules = RuleContext::draw(&mut self.rng, self.settings.variant, None);
        self.set_phase(RoundPhase::PreStart);
        log::info!("Round reset");
        self.show_start_ui();
    }

    /// Arm both hand detectors relative to a cue on the unscaled clock
    pub fn arm_hand_detector(&mut self, cue_timestamp: f64) {
        for detector in &mut self.hands {
            detector.arm(cue_timestamp);
        }
    }

    pub fn disarm_hand_detector(&mut self) {
        for detector in &mut self.hands {
            detector.disarm();
        }
    }

    /// Solid collision reported by the host
    pub fn on_projectile_contact(&mut self, id: ProjectileId, surface: SurfaceCategory) -> Option<Outcome> {
        self.resolve_contact(id, ContactKind::Collision, &[surface])
    }

    /// Trigger volume entry reported by the host
    pub fn on_projectile_zone_enter(&mut self, id: ProjectileId, zone: SurfaceCategory) -> Option<Outcome> {
        self.resolve_contact(id, ContactKind::Overlap, &[zone])
    }

    /// Contact with a collider carrying several categories (layer and tag)
    pub fn resolve_contact(
        &mut self,
        id: ProjectileId,
        kind: ContactKind,
        surfaces: &[SurfaceCategory],
    ) -> Option<Outcome> {
        if !self.is_live_phase() {
            log::debug!("Contact for {} ignored in {:?}", id, self.state.phase);
            return None;
        }
        let outcome = classify_contact(kind, surfaces)?;
        let Some(projectile) = self.state.projectile_mut(id) else {
            log::debug!("Contact for unknown projectile {}", id);
            return None;
        };
        let outcome = projectile.resolve(outcome)?;
        self.finish_projectile(id, outcome);
        Some(outcome)
    }

    pub fn on_duration_selected(&mut self, seconds: u32) {
        self.settings.select_duration(seconds);
    }

    pub fn on_speed_selected(&mut self, units_per_second: f32) {
        self.settings.select_speed(units_per_second);
    }

    pub fn on_duration_index_selected(&mut self, index: usize) {
        self.settings.select_duration_index(index);
    }

    pub fn on_speed_index_selected(&mut self, index: usize) {
        self.settings.select_speed_index(index);
    }

    /// Replace the active rule (debug menus and scripted sessions)
    pub fn set_rules(&mut self, rules: RuleContext) {
        self.rules = rules;
        self.show_hud_rules();
    }

    /// Spawn one ball of `color` aimed at the goal disc. Only while playing.
    pub fn spawn_projectile(&mut self, color: ColorId) -> Option<ProjectileId> {
        if self.state.phase != RoundPhase::Playing {
            log::debug!("Spawn ignored in {:?}", self.state.phase);
            return None;
        }
        let count = self.settings.spawn_points.len();
        if count == 0 {
            log::warn!("No spawn points configured");
            return None;
        }
        let origin = self.settings.spawn_points[self.rng.random_range(0..count)];
        let offset = random_in_disc(&mut self.rng, self.settings.goal_radius);
        let target = plane_point(
            self.settings.goal_center,
            self.settings.goal_right,
            self.settings.goal_up,
            offset,
        );
        let vel = (target - origin).normalize_or_zero() * self.settings.speed;
        let is_danger = self.rules.is_danger(color);

        let id = self.state.next_projectile_id();
        let projectile = Projectile::new(id, origin, vel, color, is_danger, self.state.round_clock);
        self.notify(|sink| sink.projectile_spawned(&projectile));
        self.state.projectiles.push(projectile);
        self.events.push(RoundEvent::ProjectileSpawned { id, color, is_danger });

        if self.settings.auto_arm_on_spawn {
            self.arm_hand_detector(self.unscaled_clock);
        }
        Some(id)
    }

    // === Internals shared with tick ===

    pub(super) fn is_live_phase(&self) -> bool {
        matches!(
            self.state.phase,
            RoundPhase::Playing | RoundPhase::RuleChangePause
        )
    }

    pub(super) fn notify(&mut self, f: impl FnOnce(&mut dyn RoundSink)) {
        if let Some(sink) = self.sink.as_deref_mut() {
            f(sink);
        }
    }

    pub(super) fn set_phase(&mut self, to: RoundPhase) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        self.state.phase = to;
        log::info!("Phase {:?} -> {:?}", from, to);
        self.events.push(RoundEvent::PhaseChanged { from, to });
    }

    /// Spawn with a color drawn from the active pair
    pub(super) fn spawn_random(&mut self) -> Option<ProjectileId> {
        let color = self.rules.colors()[self.rng.random_range(0..2)];
        self.spawn_projectile(color)
    }

    /// Score an already-resolved projectile and remove it
    pub(super) fn finish_projectile(&mut self, id: ProjectileId, outcome: Outcome) {
        let Some(index) = self.state.projectiles.iter().position(|p| p.id == id) else {
            return;
        };
        let projectile = self.state.projectiles.remove(index);
        let effect = score_outcome(
            outcome,
            projectile.is_danger,
            self.settings.variant,
            self.settings.timeout_policy,
        );
        self.state.stats.apply(&effect);
        log::debug!(
            "Projectile {} {:?} (danger {}) -> {:+}",
            id,
            outcome,
            projectile.is_danger,
            effect.delta
        );

        let score = ui::score_text(self.state.stats.score);
        self.notify(|sink| {
            if let Some(cue) = effect.cue {
                sink.play(cue);
            }
            sink.set_text(TextField::Score, &score);
            sink.projectile_destroyed(id);
        });
        self.events.push(RoundEvent::ProjectileResolved {
            id,
            outcome,
            is_danger: projectile.is_danger,
            effect,
        });
    }

    /// Remove every live projectile without scoring
    pub(super) fn clear_projectiles(&mut self) {
        let projectiles = std::mem::take(&mut self.state.projectiles);
        self.notify(|sink| {
            for projectile in &projectiles {
                sink.projectile_destroyed(projectile.id);
            }
        });
    }

    pub(super) fn show_hud_rules(&mut self) {
        let block = self.rules.block_text().markup();
        let ignore = self.rules.ignore_text().markup();
        self.notify(|sink| {
            sink.set_text(TextField::BlockRule, &block);
            sink.set_text(TextField::IgnoreRule, &ignore);
        });
    }

    fn show_start_ui(&mut self) {
        let block = self.rules.block_text().markup();
        let ignore = self.rules.ignore_text().markup();
        self.notify(|sink| {
            sink.set_visible(Panel::Results, false);
            sink.set_visible(Panel::RuleChangeBanner, false);
            sink.set_visible(Panel::Hud, false);
            sink.set_visible(Panel::Countdown, false);
            sink.set_visible(Panel::StartRules, false);
            sink.set_visible(Panel::StartMenu, true);
            sink.set_visible(Panel::StartButton, true);
            sink.set_visible(Panel::Dropdowns, true);
            sink.set_text(TextField::BlockRule, &block);
            sink.set_text(TextField::IgnoreRule, &ignore);
            sink.set_paddles_active(false);
        });
    }
}
