//! Scripted physics world for unit tests
//!
//! Bodies move only by their own velocity (no gravity, no contacts). Tests
//! place bodies directly and queue the collision pairs the next step reports.

use std::collections::BTreeMap;

use glam::Vec2;

use super::body::{BladeSpawn, BodyId, BodyKind, BodyView};
use super::physics::{CollisionStart, PhysicsError, PhysicsWorld};
use super::terrain::Polygon;

#[derive(Debug, Default)]
pub struct ScriptedWorld {
    bodies: BTreeMap<BodyId, BodyView>,
    pending: Vec<CollisionStart>,
    next_id: u64,
    pub steps: u32,
    /// Make `insert_terrain` fail as a decomposition error would
    pub reject_terrain: bool,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a collision between `a` and `b` on the next step
    pub fn queue_collision(&mut self, a: BodyId, b: BodyId) {
        self.pending.push(CollisionStart { a, b });
    }

    pub fn set_position(&mut self, id: BodyId, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
        }
    }

    pub fn set_angle(&mut self, id: BodyId, angle: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.angle = angle;
        }
    }

    pub fn set_linvel(&mut self, id: BodyId, linvel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.linvel = linvel;
        }
    }

    pub fn count(&self, kind: BodyKind) -> usize {
        self.bodies.values().filter(|b| b.kind == kind).count()
    }

    fn alloc(&mut self) -> BodyId {
        self.next_id += 1;
        BodyId(self.next_id)
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn insert_terrain(&mut self, polygon: &Polygon) -> Result<BodyId, PhysicsError> {
        if self.reject_terrain {
            return Err(PhysicsError::Decomposition);
        }
        if polygon.points().len() < 3 {
            return Err(PhysicsError::DegenerateTerrain(polygon.points().len()));
        }
        let id = self.alloc();
        self.bodies.insert(
            id,
            BodyView {
                id,
                kind: BodyKind::Terrain,
                pos: Vec2::ZERO,
                angle: 0.0,
                linvel: Vec2::ZERO,
                angvel: 0.0,
            },
        );
        Ok(id)
    }

    fn spawn_blade(&mut self, spawn: &BladeSpawn) -> BodyId {
        let id = self.alloc();
        self.bodies.insert(
            id,
            BodyView {
                id,
                kind: BodyKind::FallingBlade,
                pos: spawn.pos,
                angle: spawn.angle,
                linvel: Vec2::ZERO,
                angvel: spawn.angvel,
            },
        );
        id
    }

    fn remove_body(&mut self, id: BodyId) {
        self.bodies.remove(&id);
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.pending.clear();
    }

    fn pin(&mut self, id: BodyId) -> bool {
        match self.bodies.get_mut(&id) {
            Some(body) if body.kind == BodyKind::FallingBlade => {
                body.kind = BodyKind::PinnedBlade;
                body.linvel = Vec2::ZERO;
                body.angvel = 0.0;
                true
            }
            _ => false,
        }
    }

    fn body(&self, id: BodyId) -> Option<BodyView> {
        self.bodies.get(&id).copied()
    }

    fn bodies(&self) -> Vec<BodyView> {
        self.bodies.values().copied().collect()
    }

    fn step(&mut self, dt: f32) -> Vec<CollisionStart> {
        self.steps += 1;
        for body in self.bodies.values_mut() {
            if body.kind == BodyKind::FallingBlade {
                body.pos += body.linvel * dt;
                body.angle += body.angvel * dt;
            }
        }
        let pending = std::mem::take(&mut self.pending);
        // Pairs whose bodies vanished before the step are not reported
        pending
            .into_iter()
            .filter(|c| self.bodies.contains_key(&c.a) && self.bodies.contains_key(&c.b))
            .collect()
    }
}
