//! Presentation snapshots
//!
//! Everything a renderer or HUD needs, copied out of the session so drawing
//! code never touches gameplay state.

use glam::Vec2;
use serde::Serialize;

use crate::highscores::HighScores;
use crate::sim::{BodyKind, BodyView, Polygon, SessionState};

/// A blade as drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BladeSprite {
    pub pos: Vec2,
    pub angle: f32,
    pub pinned: bool,
}

/// Read-only view of one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub lives: u8,
    pub max_lives: u8,
    pub score: u32,
    pub high_scores: Vec<u32>,
    pub playing: bool,
    /// A life was just lost; flash the hearts
    pub flash: bool,
    pub terrain: Vec<Vec2>,
    pub blades: Vec<BladeSprite>,
}

impl Snapshot {
    pub fn capture(
        state: &SessionState,
        scores: &HighScores,
        polygon: &Polygon,
        bodies: &[BodyView],
    ) -> Self {
        let blades = bodies
            .iter()
            .filter(|b| b.kind.is_blade())
            .map(|b| BladeSprite {
                pos: b.pos,
                angle: b.angle,
                pinned: b.kind == BodyKind::PinnedBlade,
            })
            .collect();

        Self {
            lives: state.lives(),
            max_lives: state.max_lives(),
            score: state.score(),
            high_scores: scores.scores().to_vec(),
            playing: state.is_playing(),
            flash: state.flash_ticks() > 0,
            terrain: polygon.points().to_vec(),
            blades,
        }
    }

    /// Filled hearts for remaining lives, hollow for lost ones
    pub fn hearts(&self) -> String {
        let lost = self.max_lives.saturating_sub(self.lives) as usize;
        "♥".repeat(self.lives as usize) + &"♡".repeat(lost)
    }

    /// One-line HUD text
    pub fn hud_line(&self) -> String {
        let best = self
            .high_scores
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" / ");
        let status = if self.playing { "" } else { "  GAME OVER" };
        format!("{}  Score: {}  Best: {}{}", self.hearts(), self.score, best, status)
    }
}
