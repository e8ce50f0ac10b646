//! Displacement-field generators.
//!
//! A generator fills a [`DisplacementField`] with one `(dx, dy)` shift per
//! grid-line intersection. The shift functions receive grid indices, not
//! pixel positions; see [`DisplacementField::from_fn`].

mod random;
mod sine;

pub use random::RandomNoise;
pub use sine::SineWave;

use crate::field::DisplacementField;
use warpix_image::{ImageError, ImageSize};

/// The closed set of displacement-field generators.
#[derive(Clone, Debug)]
pub enum Generator {
    /// Deterministic sinusoidal displacement.
    Sine(SineWave),
    /// Smooth pseudo-random displacement with a cached noise grid.
    Random(RandomNoise),
}

impl Generator {
    /// Generate the displacement field for an image of the given size.
    ///
    /// Takes `&mut self` because [`RandomNoise`] lazily rebuilds its cached
    /// noise grid; a single generator must not be shared across threads
    /// without exclusive access.
    pub fn generate(&mut self, size: ImageSize) -> Result<DisplacementField, ImageError> {
        match self {
            Generator::Sine(sine) => Ok(sine.field(size)),
            Generator::Random(noise) => noise.field(size),
        }
    }
}

impl From<SineWave> for Generator {
    fn from(sine: SineWave) -> Self {
        Generator::Sine(sine)
    }
}

impl From<RandomNoise> for Generator {
    fn from(noise: RandomNoise) -> Self {
        Generator::Random(noise)
    }
}
