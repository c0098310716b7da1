//! Session state and transitions
//!
//! Fields are private: every change goes through a transition method so each
//! counter has exactly one writer path.

use serde::{Deserialize, Serialize};

use super::body::BodyId;
use crate::highscores::HighScores;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Accepting input, counting lives
    Playing,
    /// Out of lives; waiting for an explicit restart
    GameOver,
}

/// Something that happened during input handling or a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BladeSpawned { id: BodyId, x: f32 },
    BladePinned(BodyId),
    BladeLost { id: BodyId, lives_left: u8 },
    GameOver { score: u32, rank: Option<usize> },
    Restarted,
}

/// Result of a blade falling out of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeLoss {
    /// Not playing; counters untouched
    Ignored,
    LifeLost { lives_left: u8 },
    /// Last life gone; score already recorded in the high score table
    GameOver { score: u32, rank: Option<usize> },
}

/// Lives, score and timers for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    max_lives: u8,
    lives: u8,
    score: u32,
    phase: GamePhase,
    /// Timestamp (ms) of the last accepted spawn
    last_spawn_ms: Option<f64>,
    /// Remaining ticks of the life-lost flash
    flash_ticks: u32,
    time_ticks: u64,
}

impl SessionState {
    pub fn new(max_lives: u8) -> Self {
        Self {
            max_lives,
            lives: max_lives,
            score: 0,
            phase: GamePhase::Playing,
            last_spawn_ms: None,
            flash_ticks: 0,
            time_ticks: 0,
        }
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn max_lives(&self) -> u8 {
        self.max_lives
    }

    /// Blades spawned and not lost
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn last_spawn_ms(&self) -> Option<f64> {
        self.last_spawn_ms
    }

    pub fn flash_ticks(&self) -> u32 {
        self.flash_ticks
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Whether a spawn at `now_ms` passes the play and cooldown guards
    pub fn can_spawn(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        self.is_playing()
            && self
                .last_spawn_ms
                .is_none_or(|last| now_ms - last >= cooldown_ms)
    }

    /// An accepted spawn: stamp the time and count the blade
    pub fn record_spawn(&mut self, now_ms: f64) {
        self.last_spawn_ms = Some(now_ms);
        self.score += 1;
    }

    /// A blade fell past the boundary.
    ///
    /// Entering `GameOver` records the final score in `scores` as part of the
    /// same transition.
    pub fn blade_lost(&mut self, flash_ticks: u32, scores: &mut HighScores) -> LifeLoss {
        if !self.is_playing() {
            return LifeLoss::Ignored;
        }

        self.score = self.score.saturating_sub(1);
        self.lives = self.lives.saturating_sub(1);
        self.flash_ticks = flash_ticks;

        if self.lives == 0 {
            self.phase = GamePhase::GameOver;
            let rank = scores.add_score(self.score);
            LifeLoss::GameOver {
                score: self.score,
                rank,
            }
        } else {
            LifeLoss::LifeLost {
                lives_left: self.lives,
            }
        }
    }

    /// Per-tick bookkeeping
    pub fn tick_timers(&mut self) {
        self.time_ticks += 1;
        self.flash_ticks = self.flash_ticks.saturating_sub(1);
    }

    /// Back to the initial state
    pub fn reset(&mut self) {
        *self = Self::new(self.max_lives);
    }
}
