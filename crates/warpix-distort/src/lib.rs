#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// construction of transformations from textual configuration.
pub mod config;

/// Error types for the distortion module.
pub mod error;

/// displacement fields and grid traversal.
pub mod field;

/// separable image filtering used by noise synthesis.
pub mod filter;

/// image flipping module.
pub mod flip;

/// displacement-field generators.
pub mod generator;

/// operations to normalize images.
pub mod normalize;

/// transformation pipelines.
pub mod pipeline;

/// the grid-warp resampler.
pub mod resample;

/// bicubic resizing for scalar fields.
pub mod resize;

pub use crate::error::DistortError;
pub use crate::field::{DisplacementField, GridSize};
pub use crate::generator::{Generator, RandomNoise, SineWave};
pub use crate::pipeline::{Pipeline, Transform};
