//! Session orchestration
//!
//! A [`Session`] owns one play-through's worth of collaborators: the physics
//! world, the terrain, the spawner, the high score table and its storage. It
//! is driven from a single thread by two entry points that never overlap:
//! pointer presses and fixed-rate ticks.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::highscores::HighScores;
use crate::persistence::Storage;
use crate::sim::{
    BoundaryMonitor, GameEvent, PhysicsWorld, Polygon, SessionState, SpawnController, StickClassifier,
    TerrainError, TerrainGenerator, TickRules, tick,
};
use crate::tuning::{Tuning, TuningError};
use crate::ui::Snapshot;

/// Failures that prevent a session from starting
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Tuning(#[from] TuningError),
    #[error("failed to build terrain: {0}")]
    Terrain(#[from] TerrainError),
}

pub struct Session<W: PhysicsWorld, S: Storage> {
    tuning: Tuning,
    state: SessionState,
    world: W,
    storage: S,
    high_scores: HighScores,
    terrain: TerrainGenerator,
    polygon: Polygon,
    spawner: SpawnController,
    rules: TickRules,
    rng: Pcg32,
    accumulator: f32,
}

impl<W: PhysicsWorld, S: Storage> Session<W, S> {
    /// Start a session. Fails if the tuning is unusable or the terrain cannot
    /// be built, rather than running with undefined geometry.
    pub fn new(tuning: Tuning, mut world: W, storage: S, seed: u64) -> Result<Self, SessionError> {
        tuning.validate()?;

        let high_scores = HighScores::load(&storage);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut terrain = TerrainGenerator::new(tuning.terrain.clone());
        world.clear();
        let polygon = terrain.regenerate(&mut world, tuning.viewport, &mut rng)?;

        let spawner = SpawnController::new(tuning.blade.clone(), tuning.session.spawn_cooldown_ms);
        let rules = TickRules {
            boundary: BoundaryMonitor::new(tuning.boundary_y()),
            classifier: StickClassifier::new(tuning.blade.pin_tolerance),
            flash_ticks: tuning.session.flash_ticks,
        };

        log::info!("Session started with seed {}", seed);
        Ok(Self {
            state: SessionState::new(tuning.session.max_lives),
            tuning,
            world,
            storage,
            high_scores,
            terrain,
            polygon,
            spawner,
            rules,
            rng,
            accumulator: 0.0,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn terrain(&self) -> &Polygon {
        &self.polygon
    }

    pub fn terrain_body(&self) -> Option<crate::sim::BodyId> {
        self.terrain.body()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn rules(&self) -> &TickRules {
        &self.rules
    }

    pub fn spawn_cooldown_ms(&self) -> f64 {
        self.spawner.cooldown_ms()
    }

    /// Player pressed at screen x `x` at time `now_ms`
    pub fn pointer_down(&mut self, x: f32, now_ms: f64) -> Option<GameEvent> {
        self.spawner
            .on_pointer_down(&mut self.state, &mut self.world, x, now_ms, &mut self.rng)
            .map(|id| GameEvent::BladeSpawned { id, x })
    }

    /// Run one fixed step
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let events = tick(
            &mut self.state,
            &mut self.world,
            &mut self.high_scores,
            &self.rules,
            SIM_DT,
        );
        if events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
            self.persist_high_scores();
        }
        events
    }

    /// Feed a frame's elapsed time (seconds) and run the fixed steps it covers
    pub fn advance(&mut self, frame_dt: f32) -> Vec<GameEvent> {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.tick());
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        events
    }

    /// Rebuild the terrain, drop every other body and zero every counter.
    ///
    /// The new terrain goes in first; if that fails the session is unchanged.
    pub fn restart(&mut self) -> Result<GameEvent, SessionError> {
        let polygon = self
            .terrain
            .regenerate(&mut self.world, self.tuning.viewport, &mut self.rng)?;
        let ground = self.terrain.body();
        for body in self.world.bodies() {
            if Some(body.id) != ground {
                self.world.remove_body(body.id);
            }
        }
        self.polygon = polygon;
        self.state.reset();
        self.accumulator = 0.0;
        log::info!("Session restarted");
        Ok(GameEvent::Restarted)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            &self.state,
            &self.high_scores,
            &self.polygon,
            &self.world.bodies(),
        )
    }

    fn persist_high_scores(&mut self) {
        if let Err(e) = self.high_scores.save(&mut self.storage) {
            log::warn!("Could not save high scores: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::HIGH_SCORES_KEY;
    use crate::persistence::MemoryStorage;
    use crate::sim::test_world::ScriptedWorld;
    use crate::sim::{BodyKind, GamePhase, RapierWorld};
    use glam::Vec2;

    fn session() -> Session<ScriptedWorld, MemoryStorage> {
        Session::new(Tuning::default(), ScriptedWorld::new(), MemoryStorage::new(), 42).unwrap()
    }

    fn blade_ids(session: &Session<ScriptedWorld, MemoryStorage>) -> Vec<crate::sim::BodyId> {
        session
            .world()
            .bodies()
            .into_iter()
            .filter(|b| b.kind.is_blade())
            .map(|b| b.id)
            .collect()
    }

    /// Drop a blade and push it below the boundary
    fn lose_blade(session: &mut Session<ScriptedWorld, MemoryStorage>, now_ms: f64) -> Vec<GameEvent> {
        let Some(GameEvent::BladeSpawned { id, .. }) = session.pointer_down(400.0, now_ms) else {
            panic!("spawn rejected at {now_ms}");
        };
        session.world.set_position(id, Vec2::new(400.0, 10_000.0));
        session.tick()
    }

    #[test]
    fn test_new_session_initial_state() {
        let session = session();
        assert_eq!(session.state().lives(), 3);
        assert_eq!(session.state().score(), 0);
        assert!(session.state().is_playing());
        assert_eq!(session.world().count(BodyKind::Terrain), 1);
        assert_eq!(session.high_scores().scores(), &[0, 0, 0]);
    }

    #[test]
    fn test_invalid_tuning_aborts_start() {
        let mut tuning = Tuning::default();
        tuning.terrain.step = -1.0;
        let result = Session::new(tuning, ScriptedWorld::new(), MemoryStorage::new(), 1);
        assert!(matches!(result, Err(SessionError::Tuning(_))));
    }

    #[test]
    fn test_non_finite_tuning_aborts_start() {
        let tuning: Tuning = serde_json::from_str(r#"{ "blade": { "spin_jitter": 1e39 } }"#).unwrap();
        let result = Session::new(tuning, ScriptedWorld::new(), MemoryStorage::new(), 1);
        assert!(matches!(result, Err(SessionError::Tuning(_))));
    }

    #[test]
    fn test_presses_inside_cooldown_create_one_blade() {
        let mut session = session();
        assert!(session.pointer_down(300.0, 5000.0).is_some());
        assert!(session.pointer_down(300.0, 5100.0).is_none());
        assert_eq!(blade_ids(&session).len(), 1);
        assert_eq!(session.state().score(), 1);
    }

    #[test]
    fn test_upright_landing_through_session() {
        let mut session = session();
        let Some(GameEvent::BladeSpawned { id, .. }) = session.pointer_down(400.0, 0.0) else {
            panic!("spawn rejected");
        };
        session.world.set_angle(id, 0.0);
        let ground = session.terrain_body().unwrap();
        session.world.queue_collision(ground, id);

        let events = session.tick();
        assert_eq!(events, vec![GameEvent::BladePinned(id)]);
        assert_eq!(session.state().score(), 1);
        assert_eq!(session.state().lives(), 3);
    }

    #[test]
    fn test_game_over_saves_high_scores() {
        let mut session = session();
        // One blade that stays, three that fall
        session.pointer_down(200.0, 0.0);
        lose_blade(&mut session, 1000.0);
        lose_blade(&mut session, 2000.0);
        let events = lose_blade(&mut session, 3000.0);

        assert!(events.contains(&GameEvent::GameOver {
            score: 1,
            rank: Some(1)
        }));
        assert_eq!(session.state().phase(), GamePhase::GameOver);
        assert_eq!(
            session.storage().get(HIGH_SCORES_KEY).unwrap().as_deref(),
            Some("[1,0,0]")
        );
        assert!(session.pointer_down(400.0, 10_000.0).is_none());
    }

    #[test]
    fn test_high_scores_survive_into_next_session() {
        let mut first = session();
        for t in 0..3 {
            lose_blade(&mut first, t as f64 * 1000.0);
        }
        assert_eq!(first.state().phase(), GamePhase::GameOver);

        let mut storage = MemoryStorage::new();
        storage
            .set(HIGH_SCORES_KEY, &first.storage().get(HIGH_SCORES_KEY).unwrap().unwrap())
            .unwrap();
        let second = Session::new(Tuning::default(), ScriptedWorld::new(), storage, 7).unwrap();
        assert_eq!(second.high_scores(), first.high_scores());
    }

    #[test]
    fn test_corrupt_storage_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(HIGH_SCORES_KEY, "not json at all").unwrap();
        let session = Session::new(Tuning::default(), ScriptedWorld::new(), storage, 1).unwrap();
        assert_eq!(session.high_scores().scores(), &[0, 0, 0]);
    }

    #[test]
    fn test_restart_twice_is_idempotent() {
        let mut session = session();
        session.pointer_down(200.0, 0.0);
        lose_blade(&mut session, 1000.0);

        session.restart().unwrap();
        let first = session.state().clone();
        assert_eq!(session.world().count(BodyKind::Terrain), 1);
        assert!(blade_ids(&session).is_empty());

        session.restart().unwrap();
        assert_eq!(session.state(), &first);
        assert_eq!(session.state().lives(), 3);
        assert_eq!(session.state().score(), 0);
        assert!(session.state().is_playing());
        assert_eq!(session.world().count(BodyKind::Terrain), 1);
        assert_eq!(session.world().bodies().len(), 1);
    }

    #[test]
    fn test_failed_restart_leaves_session_intact() {
        let mut session = session();
        for t in 0..3 {
            lose_blade(&mut session, t as f64 * 1000.0);
        }
        let survivor = session.world.spawn_blade(&session.spawner.blade_at(300.0, &mut session.rng));
        let ground = session.terrain_body();
        let polygon = session.terrain().clone();

        session.world.reject_terrain = true;
        assert!(matches!(session.restart(), Err(SessionError::Terrain(_))));

        assert_eq!(session.terrain_body(), ground);
        assert_eq!(session.terrain(), &polygon);
        assert_eq!(session.world().count(BodyKind::Terrain), 1);
        assert!(session.world().body(survivor).is_some());
        assert_eq!(session.state().phase(), GamePhase::GameOver);

        // Once the world accepts terrain again, restart goes through
        session.world.reject_terrain = false;
        session.restart().unwrap();
        assert!(session.state().is_playing());
        assert_eq!(session.world().bodies().len(), 1);
    }

    #[test]
    fn test_rules_follow_tuning() {
        let session = session();
        let tuning = session.tuning();
        assert_eq!(session.rules().boundary.limit_y(), tuning.boundary_y());
        assert_eq!(session.rules().classifier.tolerance(), tuning.blade.pin_tolerance);
        assert_eq!(session.spawn_cooldown_ms(), tuning.session.spawn_cooldown_ms);
    }

    #[test]
    fn test_restart_after_game_over_accepts_input() {
        let mut session = session();
        for t in 0..3 {
            lose_blade(&mut session, t as f64 * 1000.0);
        }
        assert!(!session.state().is_playing());

        assert_eq!(session.restart().unwrap(), GameEvent::Restarted);
        // Cooldown timer was reset too
        assert!(session.pointer_down(100.0, 0.0).is_some());
    }

    #[test]
    fn test_advance_runs_fixed_steps() {
        let mut session = session();
        session.advance(0.001);
        assert_eq!(session.world().steps, 0);

        // Long frames are clamped to 0.1s, i.e. about six steps
        session.advance(5.0);
        assert!((5..=6).contains(&session.world().steps));
        assert!(session.world().steps <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let mut session = session();
        session.pointer_down(300.0, 0.0);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.score, 1);
        assert_eq!(snapshot.blades.len(), 1);
        assert_eq!(snapshot.terrain, session.terrain().points().to_vec());
    }

    #[test]
    fn test_rapier_restart_keeps_single_terrain_body() {
        let tuning = Tuning::default();
        let world = RapierWorld::new(tuning.session.gravity);
        let mut session = Session::new(tuning, world, MemoryStorage::new(), 9).unwrap();
        session.pointer_down(400.0, 0.0);
        for _ in 0..10 {
            session.tick();
        }

        session.restart().unwrap();
        session.restart().unwrap();

        let bodies = session.world().bodies();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].kind, BodyKind::Terrain);
        assert_eq!(session.state().lives(), 3);
        assert_eq!(session.state().score(), 0);
    }
}
