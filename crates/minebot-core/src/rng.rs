//! Agent-local random source for wandering, flee targets and flavor chat.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seedable RNG owned by the agent context.
///
/// A fixed seed makes roam targets and flee choices reproducible in tests and
/// scripted simulations; without one the generator is seeded from entropy.
pub struct BotRng(SmallRng);

impl BotRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_entropy()),
        }
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    #[inline]
    pub fn gen_range(&mut self, range: std::ops::Range<f64>) -> f64 {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Random element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.0.gen_range(0..items.len());
        items.get(idx)
    }
}
