//! Blade pinning on terrain contact
//!
//! A falling blade that first touches the landmass while within the pin
//! tolerance of upright is frozen in place for good. Anything else is left to
//! the physics engine.

use std::f32::consts::TAU;

use super::body::{BodyId, BodyKind, BodyView};
use super::physics::{CollisionStart, PhysicsWorld};
use crate::normalize_angle;

/// Outcome of one collision-start event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Blade landed upright and is now static
    Pinned(BodyId),
    /// Blade touched terrain too far from vertical and stays dynamic
    Tilted(BodyId),
    /// Not a falling-blade/terrain pair
    Ignored,
}

/// True if `angle` is within `tolerance` of upright in either direction
#[inline]
pub fn is_vertical(angle: f32, tolerance: f32) -> bool {
    let a = normalize_angle(angle);
    a < tolerance || a > TAU - tolerance
}

/// Decides which terrain contacts pin a blade
#[derive(Debug, Clone, Copy)]
pub struct StickClassifier {
    tolerance: f32,
}

impl StickClassifier {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Pick the falling blade out of a blade/terrain pair
    pub fn falling_blade<'a>(a: &'a BodyView, b: &'a BodyView) -> Option<&'a BodyView> {
        use BodyKind::*;
        match (a.kind, b.kind) {
            (FallingBlade, Terrain) => Some(a),
            (Terrain, FallingBlade) => Some(b),
            // Blades resting on blades never pin
            (FallingBlade | PinnedBlade, FallingBlade | PinnedBlade) => None,
            (PinnedBlade, Terrain) | (Terrain, PinnedBlade) | (Terrain, Terrain) => None,
        }
    }

    /// Handle one collision-start event
    pub fn on_collision_start<W: PhysicsWorld>(&self, world: &mut W, pair: CollisionStart) -> Contact {
        let (Some(a), Some(b)) = (world.body(pair.a), world.body(pair.b)) else {
            return Contact::Ignored;
        };
        let Some(blade) = Self::falling_blade(&a, &b) else {
            return Contact::Ignored;
        };
        let id = blade.id;

        if !is_vertical(blade.angle, self.tolerance) {
            log::debug!("Blade {:?} hit terrain tilted at {:.2} rad", id, blade.angle);
            return Contact::Tilted(id);
        }
        if world.pin(id) {
            log::debug!("Blade {:?} pinned at {:?}", id, blade.pos);
            Contact::Pinned(id)
        } else {
            Contact::Ignored
        }
    }
}
