//! Blade Drop - a stacking arcade game on a floating island
//!
//! Core modules:
//! - `sim`: Gameplay core (terrain, spawning, pinning, boundary, session state)
//! - `session`: Session orchestration (lives, restarts, high score persistence)
//! - `persistence`: Key-value storage for saved data
//! - `tuning`: Data-driven game balance
//! - `ui`: Read-only snapshots for presentation

pub mod highscores;
pub mod persistence;
pub mod session;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use highscores::HighScores;
pub use session::{Session, SessionError};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per redraw)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Upper bound on horizontal terrain samples per pass
    pub const MAX_TERRAIN_SAMPLES: usize = 10_000;

    /// Lives at the start of a session
    pub const MAX_LIVES: u8 = 3;

    /// Storage key for the high score table
    pub const HIGH_SCORES_KEY: &str = "blade_drop_highscores";
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}
