//! Construction of transformations from textual configuration.
//!
//! Each transformation is described by a name token and an ordered list of
//! string arguments with a declared arity, e.g. `random:5:2` or `flip:v`.
//! All validation happens here, before any image is processed; a failed
//! construction never yields a partially built pipeline.

use crate::field::GridSize;
use crate::generator::{Generator, RandomNoise, SineWave};
use crate::pipeline::{Pipeline, Transform};

/// An error type for configuration parsing.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The transformation name is not registered.
    #[error("the transformation \"{0}\" does not exist")]
    UnknownTransform(String),

    /// Too few arguments for the transformation.
    #[error("a {name} transformation needs at least {min} parameter(s), got {got}")]
    NotEnoughParams {
        /// Registered transformation name.
        name: &'static str,
        /// Minimum accepted number of parameters.
        min: usize,
        /// Number of parameters supplied.
        got: usize,
    },

    /// Too many arguments for the transformation.
    #[error("a {name} transformation takes at most {max} parameter(s), got {got}")]
    TooManyParams {
        /// Registered transformation name.
        name: &'static str,
        /// Maximum accepted number of parameters.
        max: usize,
        /// Number of parameters supplied.
        got: usize,
    },

    /// The grid size argument is not a usable integer.
    #[error("invalid grid size \"{0}\": expected a positive integer, or -1 for automatic")]
    InvalidGridSize(String),

    /// A numeric argument failed to parse.
    #[error("invalid {what} \"{value}\" for the {name} transformation")]
    InvalidNumber {
        /// Registered transformation name.
        name: &'static str,
        /// Which argument failed.
        what: &'static str,
        /// The offending token.
        value: String,
    },

    /// The flip axis token is not `"h"` or `"v"`.
    #[error("invalid flip axis \"{0}\": expected \"h\" for horizontal or \"v\" for vertical")]
    InvalidFlipAxis(String),

    /// The regenerate flag is not `"t"` or `"f"`.
    #[error("invalid regenerate flag \"{0}\": expected \"t\" or \"f\"")]
    InvalidRegenerateFlag(String),

    /// A transform descriptor carried no name token.
    #[error("empty transform descriptor")]
    EmptyDescriptor,
}

/// A row of the transform registry: construction function plus arity
/// bounds and help text for one transformation name.
pub struct TransformEntry {
    /// The name token selecting this transformation.
    pub name: &'static str,
    /// Minimum accepted number of parameters.
    pub min_params: usize,
    /// Maximum accepted number of parameters.
    pub max_params: usize,
    /// One-paragraph description of the operation and its parameters.
    pub description: &'static str,
    build: fn(&[&str]) -> Result<Transform, ConfigError>,
}

impl TransformEntry {
    /// Build the transformation after checking the argument count against
    /// the declared arity bounds.
    pub fn build(&self, params: &[&str]) -> Result<Transform, ConfigError> {
        if params.len() < self.min_params {
            return Err(ConfigError::NotEnoughParams {
                name: self.name,
                min: self.min_params,
                got: params.len(),
            });
        }
        if params.len() > self.max_params {
            return Err(ConfigError::TooManyParams {
                name: self.name,
                max: self.max_params,
                got: params.len(),
            });
        }
        (self.build)(params)
    }
}

/// The registered transformations: a plain data table mapping name tokens
/// to construction functions.
pub const REGISTRY: &[TransformEntry] = &[
    TransformEntry {
        name: "flip",
        min_params: 1,
        max_params: 1,
        description: "flip: mirrors the picture. \
                      Par. 1: \"h\" for a horizontal (left-right) flip, \
                      \"v\" for a vertical (top-bottom) flip.",
        build: build_flip,
    },
    TransformEntry {
        name: "random",
        min_params: 0,
        max_params: 3,
        description: "random: randomly enlarges, shrinks or shifts parts of the image. \
                      Par. 1: grid size (int, -1 for automatic, the default). \
                      Par. 2: scale (float, default 1), multiplier for the movement vectors. \
                      Par. 3: regenerate (t/f, default f), draw a new distortion grid for \
                      every picture.",
        build: build_random,
    },
    TransformEntry {
        name: "sine",
        min_params: 0,
        max_params: 9,
        description: "sine: moves pixels along sine waves. \
                      Par. 1: grid size (int, -1 for automatic, the default). \
                      Par. 2-5: x-scale, x-mul-x, x-mul-y, x-offset (floats, default 0); \
                      the x-displacement is P2*sin((P3*x + P4*y + P5) * pi/180). \
                      Par. 6-9: the same four parameters for the y-displacement.",
        build: build_sine,
    },
];

/// Find a registry entry by its (case-insensitive) name token.
pub fn find_transform(name: &str) -> Option<&'static TransformEntry> {
    REGISTRY.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}

/// Build a single transformation from its name and argument tokens.
pub fn build_transform(name: &str, params: &[&str]) -> Result<Transform, ConfigError> {
    let entry =
        find_transform(name).ok_or_else(|| ConfigError::UnknownTransform(name.to_string()))?;
    entry.build(params)
}

/// Parse one delimited transform descriptor such as `random:5:2` or
/// `flip:v`.
pub fn parse_descriptor(descriptor: &str, delimiter: char) -> Result<Transform, ConfigError> {
    let mut parts = descriptor.split(delimiter);
    let name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ConfigError::EmptyDescriptor),
    };
    let params: Vec<&str> = parts.collect();
    build_transform(name, &params)
}

/// Parse a list of delimited transform descriptors into a pipeline.
///
/// Fails atomically: any invalid descriptor fails the whole pipeline and
/// nothing is returned.
pub fn parse_pipeline<I, S>(descriptors: I, delimiter: char) -> Result<Pipeline, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let transforms = descriptors
        .into_iter()
        .map(|descriptor| parse_descriptor(descriptor.as_ref(), delimiter))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Pipeline::new(transforms))
}

fn build_flip(params: &[&str]) -> Result<Transform, ConfigError> {
    match params[0] {
        "h" => Ok(Transform::Flip {
            horizontal: true,
            vertical: false,
        }),
        "v" => Ok(Transform::Flip {
            horizontal: false,
            vertical: true,
        }),
        other => Err(ConfigError::InvalidFlipAxis(other.to_string())),
    }
}

fn parse_grid_size(token: &str) -> Result<GridSize, ConfigError> {
    let value: i64 = token
        .parse()
        .map_err(|_| ConfigError::InvalidGridSize(token.to_string()))?;
    match value {
        -1 => Ok(GridSize::Auto),
        v if v >= 1 => Ok(GridSize::Fixed(v as usize)),
        _ => Err(ConfigError::InvalidGridSize(token.to_string())),
    }
}

fn parse_float(
    name: &'static str,
    what: &'static str,
    token: &str,
) -> Result<f64, ConfigError> {
    token.parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        what,
        value: token.to_string(),
    })
}

fn build_random(params: &[&str]) -> Result<Transform, ConfigError> {
    let grid = match params.first() {
        Some(token) => parse_grid_size(token)?,
        None => GridSize::Auto,
    };
    let scale = match params.get(1) {
        Some(token) => parse_float("random", "scale", token)?,
        None => 1.0,
    };
    let regenerate = match params.get(2) {
        Some(&"t") => true,
        Some(&"f") | None => false,
        Some(other) => return Err(ConfigError::InvalidRegenerateFlag(other.to_string())),
    };
    Ok(Transform::Warp(Generator::Random(RandomNoise::new(
        grid, scale, regenerate,
    ))))
}

const SINE_PARAM_NAMES: [&str; 8] = [
    "x-scale", "x-mul-x", "x-mul-y", "x-offset", "y-scale", "y-mul-x", "y-mul-y", "y-offset",
];

fn build_sine(params: &[&str]) -> Result<Transform, ConfigError> {
    let grid = match params.first() {
        Some(token) => parse_grid_size(token)?,
        None => GridSize::Auto,
    };
    let mut wave = [0.0f64; 8];
    for (i, token) in params.iter().skip(1).enumerate() {
        wave[i] = parse_float("sine", SINE_PARAM_NAMES[i], token)?;
    }
    let x = [wave[0], wave[1], wave[2], wave[3]];
    let y = [wave[4], wave[5], wave[6], wave[7]];
    Ok(Transform::Warp(Generator::Sine(SineWave::new(grid, x, y))))
}
