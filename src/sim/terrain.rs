//! Floating landmass generation
//!
//! The landmass is a single closed polygon: a noisy top surface traced left to
//! right, followed by a sine-shaped "belly" traced right to left. That order
//! is the only valid winding; the physics backend decomposes the outline
//! assuming it.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::body::BodyId;
use super::noise::{NoiseSource, SimplexNoise};
use super::physics::{PhysicsError, PhysicsWorld};
use crate::consts::MAX_TERRAIN_SAMPLES;
use crate::tuning::{TerrainTuning, Viewport};

/// Terrain construction failures
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("viewport {width}x{height} cannot hold terrain")]
    InvalidViewport { width: f32, height: f32 },
    #[error("terrain span {span} with step {step} yields no usable sampling")]
    InvalidSampling { span: f32, step: f32 },
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Closed landmass outline: top pass then reversed bottom pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Vec2>,
    top_len: usize,
}

impl Polygon {
    /// All outline points in winding order
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Top surface, left to right
    pub fn top(&self) -> &[Vec2] {
        &self.points[..self.top_len]
    }

    /// Underside, right to left
    pub fn bottom(&self) -> &[Vec2] {
        &self.points[self.top_len..]
    }

    /// Number of horizontal samples per pass
    pub fn sample_count(&self) -> usize {
        self.top_len
    }

    /// Distance between the last and first point
    pub fn closing_gap(&self) -> f32 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.distance(*last),
            _ => 0.0,
        }
    }
}

/// Builds the landmass and keeps exactly one terrain body in the world
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    tuning: TerrainTuning,
    body: Option<BodyId>,
}

impl TerrainGenerator {
    pub fn new(tuning: TerrainTuning) -> Self {
        Self { tuning, body: None }
    }

    /// Currently registered terrain body
    pub fn body(&self) -> Option<BodyId> {
        self.body
    }

    /// Trace the outline for `viewport` using `noise`
    pub fn build(&self, viewport: Viewport, noise: &impl NoiseSource) -> Result<Polygon, TerrainError> {
        let t = &self.tuning;
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return Err(TerrainError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let start_x = viewport.width * t.start_frac;
        let span = viewport.width * t.end_frac - start_x;
        if !(span > 0.0 && t.step > 0.0) {
            return Err(TerrainError::InvalidSampling { span, step: t.step });
        }

        // Last sample may overshoot the span by less than one step
        let steps = (span / t.step).ceil();
        if !(steps.is_finite() && steps <= MAX_TERRAIN_SAMPLES as f32) {
            return Err(TerrainError::InvalidSampling { span, step: t.step });
        }
        let last = steps as usize;
        let surface = viewport.height * t.surface_frac;

        let top: Vec<Vec2> = (0..=last)
            .map(|i| {
                let x = start_x + i as f32 * t.step;
                let n = noise.sample(f64::from(x) * t.top_noise_scale, 0.0) as f32;
                Vec2::new(x, surface + n * t.top_amplitude)
            })
            .collect();

        let mut points = Vec::with_capacity(top.len() * 2);
        points.extend_from_slice(&top);
        for (i, top_point) in top.iter().enumerate().rev() {
            let y = if i == 0 || i == last {
                top_point.y
            } else {
                let fraction = (i as f32 * t.step / span).min(1.0);
                let n = noise.sample(
                    f64::from(top_point.x) * t.bottom_noise_scale,
                    t.bottom_noise_offset,
                ) as f32;
                let belly = surface + t.depth * (PI * fraction).sin() + n * t.bottom_amplitude;
                belly.max(top_point.y + t.min_thickness)
            };
            points.push(Vec2::new(top_point.x, y));
        }

        Ok(Polygon {
            points,
            top_len: top.len(),
        })
    }

    /// Build an outline with freshly seeded noise
    pub fn generate(&self, viewport: Viewport, rng: &mut impl Rng) -> Result<Polygon, TerrainError> {
        let noise = SimplexNoise::new(rng.random());
        self.build(viewport, &noise)
    }

    /// Generate a new landmass and swap it into `world`, removing the old one.
    ///
    /// The old body is only removed once the new one is in; on error the
    /// world still holds the previous terrain.
    pub fn regenerate<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        viewport: Viewport,
        rng: &mut impl Rng,
    ) -> Result<Polygon, TerrainError> {
        let polygon = self.generate(viewport, rng)?;
        let id = world.insert_terrain(&polygon)?;
        if let Some(old) = self.body.replace(id) {
            world.remove_body(old);
        }
        log::info!(
            "Terrain generated: {} points, body {:?}",
            polygon.points().len(),
            id
        );
        Ok(polygon)
    }
}
