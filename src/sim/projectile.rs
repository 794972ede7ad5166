//! Projectiles and contact classification
//!
//! A projectile flies until exactly one terminal event: a paddle or body
//! block, reaching the goal zone, or the despawn timeout.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::palette::ColorId;
use crate::consts::DESPAWN_SECONDS;

pub type ProjectileId = u32;

/// Surface categories the host tags colliders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceCategory {
    Paddle,
    Body,
    Goal,
}

/// How the host saw the projectile touch something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    /// Solid collision
    Collision,
    /// Trigger volume overlap
    Overlap,
}

/// Terminal outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    BlockedByPaddle,
    BlockedByBody,
    ReachedGoal,
    TimedOut,
}

/// Projectile lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Flying,
    Resolved(Outcome),
}

/// Map a contact to an outcome.
///
/// Paddle wins over body, body over goal. The goal only counts for overlaps;
/// a solid collision with a goal-tagged collider is not an outcome.
pub fn classify_contact(kind: ContactKind, surfaces: &[SurfaceCategory]) -> Option<Outcome> {
    if surfaces.contains(&SurfaceCategory::Paddle) {
        return Some(Outcome::BlockedByPaddle);
    }
    if surfaces.contains(&SurfaceCategory::Body) {
        return Some(Outcome::BlockedByBody);
    }
    if kind == ContactKind::Overlap && surfaces.contains(&SurfaceCategory::Goal) {
        return Some(Outcome::ReachedGoal);
    }
    None
}

/// A ball in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub pos: Vec3,
    pub vel: Vec3,
    pub color: ColorId,
    /// Fixed at spawn from the rule active then
    pub is_danger: bool,
    /// Round clock (scaled seconds) at spawn
    pub spawned_at: f32,
    /// Scaled seconds since spawn
    pub age: f32,
    pub state: ProjectileState,
}

impl Projectile {
    pub fn new(id: ProjectileId, pos: Vec3, vel: Vec3, color: ColorId, is_danger: bool, now: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            color,
            is_danger,
            spawned_at: now,
            age: 0.0,
            state: ProjectileState::Flying,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    /// Move and age the ball. Returns `TimedOut` the tick it outlives the despawn window.
    pub fn advance(&mut self, dt: f32) -> Option<Outcome> {
        if !self.is_flying() {
            return None;
        }
        self.pos += self.vel * dt;
        self.age += dt;
        if self.age > DESPAWN_SECONDS {
            self.resolve(Outcome::TimedOut)
        } else {
            None
        }
    }

    /// First terminal transition wins; later calls return None
    pub fn resolve(&mut self, outcome: Outcome) -> Option<Outcome> {
        if !self.is_flying() {
            return None;
        }
        self.state = ProjectileState::Resolved(outcome);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball() -> Projectile {
        Projectile::new(1, Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), ColorId::Red, true, 0.0)
    }

    #[test]
    fn test_classify_precedence() {
        use SurfaceCategory::*;
        assert_eq!(
            classify_contact(ContactKind::Overlap, &[Goal, Body, Paddle]),
            Some(Outcome::BlockedByPaddle)
        );
        assert_eq!(
            classify_contact(ContactKind::Overlap, &[Goal, Body]),
            Some(Outcome::BlockedByBody)
        );
        assert_eq!(
            classify_contact(ContactKind::Overlap, &[Goal]),
            Some(Outcome::ReachedGoal)
        );
        assert_eq!(classify_contact(ContactKind::Collision, &[Goal]), None);
        assert_eq!(
            classify_contact(ContactKind::Collision, &[Body]),
            Some(Outcome::BlockedByBody)
        );
        assert_eq!(classify_contact(ContactKind::Overlap, &[]), None);
    }

    #[test]
    fn test_advance_moves_and_times_out() {
        let mut p = ball();
        assert_eq!(p.advance(1.0), None);
        assert!((p.pos.z + 10.0).abs() < 1e-5);

        // Exactly at the window is still alive
        assert_eq!(p.advance(5.0), None);
        assert_eq!(p.advance(0.01), Some(Outcome::TimedOut));
        assert!(!p.is_flying());
    }

    #[test]
    fn test_first_outcome_wins() {
        let mut p = ball();
        assert_eq!(p.resolve(Outcome::BlockedByPaddle), Some(Outcome::BlockedByPaddle));
        assert_eq!(p.resolve(Outcome::ReachedGoal), None);
        assert_eq!(p.advance(10.0), None);
        assert_eq!(p.state, ProjectileState::Resolved(Outcome::BlockedByPaddle));
    }
}
