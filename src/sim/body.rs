//! Body identity and tagging
//!
//! Every body in the physics world carries a [`BodyKind`] fixed at creation
//! (and changed only by pinning), so gameplay code never inspects labels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque body identifier, allocated by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// What a body is, from the game's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// The static landmass
    Terrain,
    /// A dynamic blade that has not pinned
    FallingBlade,
    /// A blade frozen in place after landing upright
    PinnedBlade,
}

impl BodyKind {
    pub fn is_blade(self) -> bool {
        matches!(self, BodyKind::FallingBlade | BodyKind::PinnedBlade)
    }
}

/// Read-only view of a body's state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyView {
    pub id: BodyId,
    pub kind: BodyKind,
    pub pos: Vec2,
    /// Rotation in radians (not normalized)
    pub angle: f32,
    pub linvel: Vec2,
    pub angvel: f32,
}

/// Request to create a blade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BladeSpawn {
    /// Center position
    pub pos: Vec2,
    /// Full width and height of the rectangle (long axis is vertical at angle 0)
    pub size: Vec2,
    pub angle: f32,
    pub angvel: f32,
    pub density: f32,
}
