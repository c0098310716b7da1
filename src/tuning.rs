//! Data-driven game balance
//!
//! Every gameplay number that is not a hard engine constant lives here so a
//! JSON file can override it. Missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_LIVES, MAX_TERRAIN_SAMPLES};

/// Errors raised while loading or validating tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Visible play area in pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Landmass shape parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTuning {
    /// Left edge of the landmass as a fraction of viewport width
    pub start_frac: f32,
    /// Right edge of the landmass as a fraction of viewport width
    pub end_frac: f32,
    /// Horizontal distance between samples (pixels)
    pub step: f32,
    /// Nominal surface height as a fraction of viewport height
    pub surface_frac: f32,
    pub top_noise_scale: f64,
    pub top_amplitude: f32,
    pub bottom_noise_scale: f64,
    /// Noise-space y offset for the bottom pass
    pub bottom_noise_offset: f64,
    /// Depth of the belly at the middle of the span
    pub depth: f32,
    pub bottom_amplitude: f32,
    /// Thinnest the landmass may get between its two ends (pixels)
    pub min_thickness: f32,
}

impl Default for TerrainTuning {
    fn default() -> Self {
        Self {
            start_frac: 0.1,
            end_frac: 0.9,
            step: 10.0,
            surface_frac: 0.6,
            top_noise_scale: 0.005,
            top_amplitude: 40.0,
            bottom_noise_scale: 0.01,
            bottom_noise_offset: 100.0,
            depth: 180.0,
            bottom_amplitude: 30.0,
            min_thickness: 2.0,
        }
    }
}

/// Blade body parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BladeTuning {
    pub width: f32,
    pub height: f32,
    pub density: f32,
    /// Spawn y (negative = above the visible area)
    pub spawn_y: f32,
    /// Initial angular velocity is drawn uniformly from [-jitter, jitter] (rad/s)
    pub spin_jitter: f32,
    /// Angular distance from vertical that still pins (radians)
    pub pin_tolerance: f32,
}

impl Default for BladeTuning {
    fn default() -> Self {
        Self {
            width: 12.0,
            height: 90.0,
            density: 1.0,
            spawn_y: -60.0,
            spin_jitter: 0.6,
            pin_tolerance: 0.8,
        }
    }
}

/// Session rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub max_lives: u8,
    /// Minimum time between accepted spawns (milliseconds)
    pub spawn_cooldown_ms: f64,
    /// Distance below the viewport at which a blade counts as lost
    pub boundary_margin: f32,
    /// Duration of the life-lost flash (ticks)
    pub flash_ticks: u32,
    /// Downward gravity (pixels/s²)
    pub gravity: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            max_lives: MAX_LIVES,
            spawn_cooldown_ms: 300.0,
            boundary_margin: 100.0,
            flash_ticks: 30,
            gravity: 1000.0,
        }
    }
}

/// Complete game tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub viewport: Viewport,
    pub terrain: TerrainTuning,
    pub blade: BladeTuning,
    pub session: SessionTuning,
}

impl Tuning {
    /// Load tuning from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let text = std::fs::read_to_string(path).map_err(|source| TuningError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let tuning: Self = serde_json::from_str(&text).map_err(|source| TuningError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the game cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid =
            |msg: &str| -> Result<(), TuningError> { Err(TuningError::Invalid(msg.to_string())) };

        if let Some(name) = self.non_finite_field() {
            return Err(TuningError::Invalid(format!("{name} must be finite")));
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return invalid("viewport must have positive size");
        }
        let t = &self.terrain;
        if !(0.0..1.0).contains(&t.start_frac) || !(t.start_frac < t.end_frac && t.end_frac <= 1.0) {
            return invalid("terrain span fractions must satisfy 0 <= start < end <= 1");
        }
        if !(t.step > 0.0) {
            return invalid("terrain step must be positive");
        }
        let span = self.viewport.width * t.end_frac - self.viewport.width * t.start_frac;
        if span / t.step > MAX_TERRAIN_SAMPLES as f32 {
            return Err(TuningError::Invalid(format!(
                "terrain step {} is too fine for a {span} px span (at most {MAX_TERRAIN_SAMPLES} samples)",
                t.step
            )));
        }
        if !(t.min_thickness > 0.0) {
            return invalid("terrain min thickness must be positive");
        }
        if t.depth < 0.0 {
            return invalid("terrain depth must not be negative");
        }
        let b = &self.blade;
        if !(b.width > 0.0 && b.height > 0.0 && b.density > 0.0) {
            return invalid("blade dimensions and density must be positive");
        }
        if !(b.spin_jitter >= 0.0) {
            return invalid("spin jitter must not be negative");
        }
        if !(b.pin_tolerance > 0.0 && b.pin_tolerance < std::f32::consts::PI) {
            return invalid("pin tolerance must lie in (0, π)");
        }
        if self.session.max_lives == 0 {
            return invalid("max lives must be at least 1");
        }
        if self.session.spawn_cooldown_ms < 0.0 {
            return invalid("spawn cooldown must not be negative");
        }
        Ok(())
    }

    /// First float field holding NaN or an infinity
    fn non_finite_field(&self) -> Option<&'static str> {
        let (v, t, b, s) = (&self.viewport, &self.terrain, &self.blade, &self.session);
        let fields = [
            ("viewport.width", f64::from(v.width)),
            ("viewport.height", f64::from(v.height)),
            ("terrain.start_frac", f64::from(t.start_frac)),
            ("terrain.end_frac", f64::from(t.end_frac)),
            ("terrain.step", f64::from(t.step)),
            ("terrain.surface_frac", f64::from(t.surface_frac)),
            ("terrain.top_noise_scale", t.top_noise_scale),
            ("terrain.top_amplitude", f64::from(t.top_amplitude)),
            ("terrain.bottom_noise_scale", t.bottom_noise_scale),
            ("terrain.bottom_noise_offset", t.bottom_noise_offset),
            ("terrain.depth", f64::from(t.depth)),
            ("terrain.bottom_amplitude", f64::from(t.bottom_amplitude)),
            ("terrain.min_thickness", f64::from(t.min_thickness)),
            ("blade.width", f64::from(b.width)),
            ("blade.height", f64::from(b.height)),
            ("blade.density", f64::from(b.density)),
            ("blade.spawn_y", f64::from(b.spawn_y)),
            ("blade.spin_jitter", f64::from(b.spin_jitter)),
            ("blade.pin_tolerance", f64::from(b.pin_tolerance)),
            ("session.spawn_cooldown_ms", s.spawn_cooldown_ms),
            ("session.boundary_margin", f64::from(s.boundary_margin)),
            ("session.gravity", f64::from(s.gravity)),
        ];
        fields
            .into_iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
    }

    /// Vertical position past which a falling blade is lost
    pub fn boundary_y(&self) -> f32 {
        self.viewport.height + self.session.boundary_margin
    }
}
