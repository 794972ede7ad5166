//! Player body capsule that follows the headset
//!
//! Keeps an upright capsule under the head so balls that hit the torso can be
//! told apart from paddle blocks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Headset pose in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub position: Vec3,
    pub forward: Vec3,
}

/// Capsule shape limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BodyShape {
    pub min_height: f32,
    pub max_height: f32,
    pub radius: f32,
    /// Push the capsule this far in front of the headset
    pub forward_offset: f32,
}

impl Default for BodyShape {
    fn default() -> Self {
        Self {
            min_height: BODY_MIN_HEIGHT,
            max_height: BODY_MAX_HEIGHT,
            radius: BODY_RADIUS,
            forward_offset: BODY_FORWARD_OFFSET,
        }
    }
}

/// Where the host should place the body collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyCapsule {
    pub center: Vec3,
    pub height: f32,
    pub radius: f32,
    /// Rotation about +Y (radians), matching head yaw
    pub yaw: f32,
}

impl BodyCapsule {
    /// Fit the capsule under a head pose standing on `base_y`
    pub fn track(head: &HeadPose, base_y: f32, shape: &BodyShape) -> Self {
        let height = (head.position.y - base_y).clamp(shape.min_height, shape.max_height);

        // Yaw-only forward; looking straight up/down gives no offset
        let flat_forward = Vec3::new(head.forward.x, 0.0, head.forward.z).normalize_or_zero();
        let yaw = if flat_forward == Vec3::ZERO {
            0.0
        } else {
            flat_forward.x.atan2(flat_forward.z)
        };

        let base = Vec3::new(head.position.x, base_y, head.position.z);
        let center = base + flat_forward * shape.forward_offset + Vec3::Y * (height * 0.5);

        Self {
            center,
            height,
            radius: shape.radius,
            yaw,
        }
    }
}
