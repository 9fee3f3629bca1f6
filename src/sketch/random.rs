use crate::options::RenderOptions;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeded source of hand wobble. One randomizer is created per generation
/// call from [`RenderOptions::seed`], so identical requests replay identical
/// geometry.
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: SmallRng,
}

impl Randomizer {
    pub fn new(seed: u64) -> Randomizer {
        Randomizer {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn for_options(o: &RenderOptions) -> Randomizer {
        Randomizer::new(o.seed)
    }

    /// Uniform in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Jitter in `[-max, max]`, scaled by roughness and `gain`. Exactly zero,
    /// without consuming randomness, when roughness is zero.
    pub fn offset_with_gain(&mut self, max: f64, o: &RenderOptions, gain: f64) -> f64 {
        if o.roughness == 0.0 {
            return 0.0;
        }
        o.roughness * gain * (self.next() * 2.0 * max - max)
    }

    pub fn offset(&mut self, max: f64, o: &RenderOptions) -> f64 {
        self.offset_with_gain(max, o, 1.0)
    }

    /// Uniform in `[min, max]`; roughness has no effect.
    pub fn offset_in_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }
}
