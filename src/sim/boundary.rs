//! Lost-blade detection
//!
//! Runs before each physics step. Falling blades below the limit are removed
//! from the world and reported so the session can take a life.

use super::body::{BodyId, BodyKind};
use super::physics::PhysicsWorld;

#[derive(Debug, Clone, Copy)]
pub struct BoundaryMonitor {
    limit_y: f32,
}

impl BoundaryMonitor {
    /// `limit_y` is usually viewport height plus a margin
    pub fn new(limit_y: f32) -> Self {
        Self { limit_y }
    }

    pub fn limit_y(&self) -> f32 {
        self.limit_y
    }

    /// Remove falling blades past the limit and return their ids (in id order)
    pub fn sweep<W: PhysicsWorld>(&self, world: &mut W) -> Vec<BodyId> {
        // Work from a snapshot so removal cannot disturb iteration
        let lost: Vec<BodyId> = world
            .bodies()
            .into_iter()
            .filter(|b| b.kind == BodyKind::FallingBlade && b.pos.y > self.limit_y)
            .map(|b| b.id)
            .collect();

        for &id in &lost {
            world.remove_body(id);
            log::debug!("Blade {:?} fell past y={}", id, self.limit_y);
        }
        lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BladeSpawn;
    use crate::sim::test_world::ScriptedWorld;
    use glam::Vec2;

    fn spawn_at(world: &mut ScriptedWorld, y: f32) -> BodyId {
        world.spawn_blade(&BladeSpawn {
            pos: Vec2::new(100.0, y),
            size: Vec2::new(12.0, 90.0),
            angle: 0.0,
            angvel: 0.0,
            density: 1.0,
        })
    }

    #[test]
    fn test_sweep_removes_only_blades_past_limit() {
        let mut world = ScriptedWorld::new();
        let safe = spawn_at(&mut world, 650.0);
        let edge = spawn_at(&mut world, 700.0);
        let gone_a = spawn_at(&mut world, 701.0);
        let gone_b = spawn_at(&mut world, 5000.0);

        let lost = BoundaryMonitor::new(700.0).sweep(&mut world);

        assert_eq!(lost, vec![gone_a, gone_b]);
        assert!(world.body(safe).is_some());
        assert!(world.body(edge).is_some());
        assert!(world.body(gone_a).is_none());
        assert!(world.body(gone_b).is_none());
    }

    #[test]
    fn test_pinned_blades_are_never_swept() {
        let mut world = ScriptedWorld::new();
        let id = spawn_at(&mut world, 900.0);
        world.pin(id);
        assert!(BoundaryMonitor::new(700.0).sweep(&mut world).is_empty());
        assert!(world.body(id).is_some());
    }

    #[test]
    fn test_second_sweep_finds_nothing() {
        let mut world = ScriptedWorld::new();
        spawn_at(&mut world, 800.0);
        spawn_at(&mut world, 810.0);
        let monitor = BoundaryMonitor::new(700.0);
        assert_eq!(monitor.sweep(&mut world).len(), 2);
        assert!(monitor.sweep(&mut world).is_empty());
    }
}
