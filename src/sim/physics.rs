//! Physics engine contract
//!
//! Gameplay code talks to the engine only through [`PhysicsWorld`]. Collision
//! callbacks are replaced by the typed event list returned from
//! [`PhysicsWorld::step`], so the classifier and monitor can be tested against
//! a scripted world.

use thiserror::Error;

use super::body::{BladeSpawn, BodyId, BodyView};
use super::terrain::Polygon;

/// Physics failures (only terrain construction can fail)
#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("terrain polygon has only {0} distinct points")]
    DegenerateTerrain(usize),
    #[error("terrain polygon could not be decomposed into convex parts")]
    Decomposition,
}

/// Two bodies started touching during a step (unordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionStart {
    pub a: BodyId,
    pub b: BodyId,
}

/// The subset of a rigid-body engine the game needs
pub trait PhysicsWorld {
    /// Insert the landmass as a static body tagged `Terrain`
    fn insert_terrain(&mut self, polygon: &Polygon) -> Result<BodyId, PhysicsError>;

    /// Insert a dynamic blade tagged `FallingBlade`
    fn spawn_blade(&mut self, spawn: &BladeSpawn) -> BodyId;

    /// Remove a body (no-op if it does not exist)
    fn remove_body(&mut self, id: BodyId);

    /// Remove every body
    fn clear(&mut self);

    /// Freeze a falling blade: static, zero velocity, tagged `PinnedBlade`.
    /// Returns false if the body is missing or not a falling blade.
    fn pin(&mut self, id: BodyId) -> bool;

    fn body(&self, id: BodyId) -> Option<BodyView>;

    /// Owned snapshot of all bodies, ordered by id
    fn bodies(&self) -> Vec<BodyView>;

    /// Advance the simulation by `dt` seconds and report new contacts
    fn step(&mut self, dt: f32) -> Vec<CollisionStart>;
}
