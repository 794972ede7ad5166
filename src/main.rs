//! Selective Goalie headless runner
//!
//! Plays one scripted round at the headset rate and prints the summary as
//! JSON. Usage: `selective-goalie [seed] [settings.json] [player]`

use std::collections::HashMap;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use selective_goalie::consts::SIM_DT;
use selective_goalie::sim::{
    Hand, HeadPose, ProjectileId, RoundController, RoundEvent, RoundPhase, SurfaceCategory,
    TickInput,
};
use selective_goalie::ui::{AudioCue, Panel, RoundSink, TextField};
use selective_goalie::RoundSettings;

/// Bot accuracy
const BLOCK_DANGER_CHANCE: f64 = 0.85;
const BLOCK_IGNORE_CHANCE: f64 = 0.1;
/// Distance in front of the goal plane where the bot commits
const DECISION_DISTANCE: f32 = 1.0;
/// Simulated hand reaction after a spawn (seconds)
const REACTION_RANGE: std::ops::RangeInclusive<f64> = 0.25..=0.6;

/// Forwards presentation updates to the log
struct LogSink;

impl RoundSink for LogSink {
    fn set_visible(&mut self, panel: Panel, visible: bool) {
        log::trace!("{:?} visible={}", panel, visible);
    }

    fn set_text(&mut self, field: TextField, text: &str) {
        // The timer updates every tick
        if field != TextField::Timer {
            log::debug!("{:?}: {}", field, text);
        }
    }

    fn play(&mut self, cue: AudioCue) {
        log::debug!("Play {:?}", cue);
    }
}

/// Scripted goalie: blocks most danger balls, some ignore balls, and jerks a
/// hand a little while after each spawn
struct Bot {
    rng: Pcg32,
    decided: HashMap<ProjectileId, bool>,
    /// Unscaled time at which the left hand starts moving
    move_at: Option<f64>,
    hand: Vec3,
}

impl Bot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            decided: HashMap::new(),
            move_at: None,
            hand: Vec3::new(-0.3, 1.2, 0.3),
        }
    }

    fn on_event(&mut self, event: &RoundEvent, now: f64) {
        match event {
            RoundEvent::ProjectileSpawned { .. } => {
                self.move_at = Some(now + self.rng.random_range(REACTION_RANGE));
            }
            RoundEvent::ProjectileResolved { id, .. } => {
                self.decided.remove(id);
            }
            _ => {}
        }
    }

    fn input(&mut self, now: f64) -> TickInput {
        if let Some(at) = self.move_at {
            if now >= at {
                self.hand.x += 0.02;
            }
            if now >= at + 0.2 {
                self.move_at = None;
            }
        }
        TickInput {
            hands: [Some(self.hand), Some(Vec3::new(0.3, 1.2, 0.3))],
            head: Some(HeadPose {
                position: Vec3::new(0.0, 1.7, -0.2),
                forward: Vec3::Z,
            }),
            rig_base_y: 0.0,
        }
    }

    /// Report contacts for balls that reached the decision line
    fn react(&mut self, round: &mut RoundController) {
        let mut contacts = Vec::new();
        for projectile in round.projectiles() {
            if projectile.pos.z > DECISION_DISTANCE {
                continue;
            }
            let chance = if projectile.is_danger {
                BLOCK_DANGER_CHANCE
            } else {
                BLOCK_IGNORE_CHANCE
            };
            let rng = &mut self.rng;
            let block = *self
                .decided
                .entry(projectile.id)
                .or_insert_with(|| rng.random_bool(chance));
            if block {
                contacts.push((projectile.id, SurfaceCategory::Paddle, false));
            } else if projectile.pos.z <= 0.0 {
                contacts.push((projectile.id, SurfaceCategory::Goal, true));
            }
        }
        for (id, surface, overlap) in contacts {
            if overlap {
                round.on_projectile_zone_enter(id, surface);
            } else {
                round.on_projectile_contact(id, surface);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    let settings_json = args.next().and_then(|path| match std::fs::read_to_string(&path) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("Failed to read {}: {}", path, e);
            None
        }
    });
    let player = args.next().unwrap_or_default();

    let mut settings = RoundSettings::load_or_default(settings_json.as_deref());
    settings.auto_arm_on_spawn = true;
    log::info!(
        "Selective Goalie (headless) seed={} variant={:?} duration={}s",
        seed,
        settings.variant,
        settings.duration
    );

    let mut round = RoundController::with_seed(settings, seed);
    round.set_sink(Box::new(LogSink));
    let mut bot = Bot::new(seed);

    round.start_round(&player);
    let mut summary = None;
    while summary.is_none() {
        let now = round.unscaled_time();
        let input = bot.input(now);
        round.tick(&input, SIM_DT);
        bot.react(&mut round);

        let now = round.unscaled_time();
        for event in round.drain_events() {
            bot.on_event(&event, now);
            match event {
                RoundEvent::RulesChanged { current, .. } => {
                    log::info!(
                        "Rules changed: {} / {}",
                        current.block_text().plain(),
                        current.ignore_text().plain()
                    );
                }
                RoundEvent::HandOnset(sample) if sample.hand == Hand::Left => {
                    log::debug!("Reaction {:.0} ms", sample.reaction_time * 1000.0);
                }
                RoundEvent::RoundEnded(result) => summary = Some(result),
                _ => {}
            }
        }
        if round.phase() == RoundPhase::PreStart {
            log::error!("Round fell back to the start menu");
            return;
        }
    }

    match summary.map(|s| serde_json::to_string_pretty(&s)) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => log::error!("Failed to serialize summary: {}", e),
        None => {}
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build is a library for the host engine; there is no runner
}
