//! 2D noise input for terrain generation

use ::noise::{NoiseFn, OpenSimplex};

/// Continuous, bounded 2D noise
pub trait NoiseSource {
    /// Sample at (x, y); roughly within [-1, 1]
    fn sample(&self, x: f64, y: f64) -> f64;
}

/// OpenSimplex noise seeded once at construction
pub struct SimplexNoise {
    inner: OpenSimplex,
}

impl SimplexNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            inner: OpenSimplex::new(seed),
        }
    }
}

impl NoiseSource for SimplexNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.inner.get([x, y]).clamp(-1.0, 1.0)
    }
}

impl<F: Fn(f64, f64) -> f64> NoiseSource for F {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}
