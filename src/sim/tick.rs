//! Fixed timestep simulation tick
//!
//! One tick runs, in order: boundary sweep, physics step, pinning of the
//! contacts that step reported, timer bookkeeping. The sweep runs before the
//! step so a blade removed this tick can never also be pinned by it.

use super::boundary::BoundaryMonitor;
use super::physics::PhysicsWorld;
use super::state::{GameEvent, LifeLoss, SessionState};
use super::stick::{Contact, StickClassifier};
use crate::highscores::HighScores;

/// Per-session collaborators a tick needs besides the world
#[derive(Debug, Clone, Copy)]
pub struct TickRules {
    pub boundary: BoundaryMonitor,
    pub classifier: StickClassifier,
    /// Life-lost flash duration (ticks)
    pub flash_ticks: u32,
}

/// Advance the session by one fixed timestep
pub fn tick<W: PhysicsWorld>(
    state: &mut SessionState,
    world: &mut W,
    scores: &mut HighScores,
    rules: &TickRules,
    dt: f32,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Before the step: lost blades
    for id in rules.boundary.sweep(world) {
        match state.blade_lost(rules.flash_ticks, scores) {
            LifeLoss::Ignored => {}
            LifeLoss::LifeLost { lives_left } => {
                events.push(GameEvent::BladeLost { id, lives_left });
            }
            LifeLoss::GameOver { score, rank } => {
                events.push(GameEvent::BladeLost { id, lives_left: 0 });
                events.push(GameEvent::GameOver { score, rank });
                log::info!("Game over with score {} (rank {:?})", score, rank);
            }
        }
    }

    // The step itself, then its contacts
    for pair in world.step(dt) {
        if let Contact::Pinned(id) = rules.classifier.on_collision_start(world, pair) {
            events.push(GameEvent::BladePinned(id));
        }
    }

    state.tick_timers();
    events
}
