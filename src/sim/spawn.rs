//! Pointer presses to falling blades

use glam::Vec2;
use rand::Rng;

use super::body::{BladeSpawn, BodyId};
use super::physics::PhysicsWorld;
use super::state::SessionState;
use crate::tuning::BladeTuning;

/// Turns presses into blades, throttled by a cooldown
#[derive(Debug, Clone)]
pub struct SpawnController {
    blade: BladeTuning,
    cooldown_ms: f64,
}

impl SpawnController {
    pub fn new(blade: BladeTuning, cooldown_ms: f64) -> Self {
        Self { blade, cooldown_ms }
    }

    pub fn cooldown_ms(&self) -> f64 {
        self.cooldown_ms
    }

    /// Blade parameters for a press at `x`, with a small random spin
    pub fn blade_at(&self, x: f32, rng: &mut impl Rng) -> BladeSpawn {
        let jitter = self.blade.spin_jitter;
        BladeSpawn {
            pos: Vec2::new(x, self.blade.spawn_y),
            size: Vec2::new(self.blade.width, self.blade.height),
            angle: 0.0,
            angvel: rng.random_range(-jitter..=jitter),
            density: self.blade.density,
        }
    }

    /// Handle a press at screen x `x` at time `now_ms`.
    /// Returns the new blade, or None if the press was rejected.
    pub fn on_pointer_down<W: PhysicsWorld>(
        &self,
        state: &mut SessionState,
        world: &mut W,
        x: f32,
        now_ms: f64,
        rng: &mut impl Rng,
    ) -> Option<BodyId> {
        if !state.can_spawn(now_ms, self.cooldown_ms) {
            return None;
        }
        let id = world.spawn_blade(&self.blade_at(x, rng));
        state.record_spawn(now_ms);
        log::debug!("Spawned blade {:?} at x={:.1}", id, x);
        Some(id)
    }
}
