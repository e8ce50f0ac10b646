use rand::Rng;

use crate::field::{grid_points, DisplacementField, GridSize};
use crate::filter;
use crate::normalize::normalize_min_max;
use crate::resize::resize_bicubic;
use warpix_image::{Image, ImageError, ImageSize};

// Low-resolution noise is synthesized at this fraction of the grid
// resolution before being upsampled, which is what makes it smooth.
const NOISE_SCALE_FACTOR: f64 = 0.7;

const BLUR_KERNEL_SIZE: usize = 5;
const BLUR_SIGMA: f64 = 1.1;

/// Smooth pseudo-random displacement generator.
///
/// A scalar noise grid is synthesized once (coarse uniform noise, bicubic
/// upsample, gaussian blur), converted to a vector field by taking sobel
/// derivatives along each axis, and normalized per component to `[-1, 1]`;
/// reads multiply by `scale`, so every field component lies in
/// `[-scale, scale]`.
///
/// The normalized grids are cached and reused for subsequent images. The
/// cache is rebuilt before use whenever regeneration was requested at
/// construction or the image dimensions differ from the cached ones. This
/// cache makes a single instance single-owner state: share one generator
/// across threads only behind exclusive access, or give each worker its
/// own instance.
#[derive(Clone, Debug)]
pub struct RandomNoise {
    grid: GridSize,
    scale: f64,
    regenerate: bool,
    cache: Option<NoiseCache>,
}

#[derive(Clone, Debug)]
struct NoiseCache {
    size: ImageSize,
    cols: usize,
    dx: Vec<f64>,
    dy: Vec<f64>,
}

impl RandomNoise {
    /// Create a random noise generator.
    ///
    /// # Arguments
    ///
    /// * `grid` - The grid spacing configuration.
    /// * `scale` - Multiplier for the normalized displacement components.
    ///   Values above the grid spacing make neighboring cells overlap.
    /// * `regenerate` - Rebuild the noise grid for every image instead of
    ///   reusing the cached one.
    pub fn new(grid: GridSize, scale: f64, regenerate: bool) -> Self {
        Self {
            grid,
            scale,
            regenerate,
            cache: None,
        }
    }

    /// Generate the displacement field for an image of the given size,
    /// rebuilding the cached noise grid if needed.
    pub fn field(&mut self, size: ImageSize) -> Result<DisplacementField, ImageError> {
        self.field_with_rng(size, &mut rand::rng())
    }

    /// Like [`RandomNoise::field`], but drawing randomness from the given
    /// source. Useful for reproducible output.
    pub fn field_with_rng(
        &mut self,
        size: ImageSize,
        rng: &mut impl Rng,
    ) -> Result<DisplacementField, ImageError> {
        let spacing = self.grid.resolve(size);
        let rows = grid_points(size.height, spacing);
        let cols = grid_points(size.width, spacing);

        let cache = match self.cache.take() {
            Some(cache) if !self.regenerate && cache.size == size => self.cache.insert(cache),
            _ => {
                log::debug!("regenerating noise grid ({rows}x{cols} intersections) for {size}");
                self.cache.insert(NoiseCache::build(size, rows, cols, rng)?)
            }
        };

        let scale = self.scale;
        Ok(DisplacementField::from_fn(size, spacing, |gy, gx| {
            let idx = gy * cache.cols + gx;
            (cache.dx[idx] * scale, cache.dy[idx] * scale)
        }))
    }
}

impl NoiseCache {
    fn build(
        size: ImageSize,
        rows: usize,
        cols: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, ImageError> {
        let (dx, dy) = synthesize(rows, cols, rng)?;
        Ok(Self {
            size,
            cols,
            dx,
            dy,
        })
    }
}

/// Synthesize the two normalized gradient grids for a rows x cols grid.
fn synthesize(
    rows: usize,
    cols: usize,
    rng: &mut impl Rng,
) -> Result<(Vec<f64>, Vec<f64>), ImageError> {
    let grid_size = ImageSize {
        width: cols,
        height: rows,
    };

    let noise = smooth_noise(grid_size, rng)?;

    // directional first derivatives turn the scalar grid into a vector field
    let mut grad_x = Image::from_size_val(grid_size, 0.0)?;
    let mut grad_y = Image::from_size_val(grid_size, 0.0)?;
    filter::sobel_x(&noise, &mut grad_x)?;
    filter::sobel_y(&noise, &mut grad_y)?;

    let mut dx = Image::from_size_val(grid_size, 0.0)?;
    let mut dy = Image::from_size_val(grid_size, 0.0)?;
    normalize_min_max(&grad_x, &mut dx, -1.0, 1.0)?;
    normalize_min_max(&grad_y, &mut dy, -1.0, 1.0)?;

    Ok((dx.into_vec(), dy.into_vec()))
}

/// Generate a random grayscale grid with smooth value gradients: coarse
/// uniform byte noise, upsampled bicubically and blurred.
fn smooth_noise(size: ImageSize, rng: &mut impl Rng) -> Result<Image<f64, 1>, ImageError> {
    let coarse_size = ImageSize {
        width: scaled_extent(size.width),
        height: scaled_extent(size.height),
    };

    let coarse_data = (0..coarse_size.width * coarse_size.height)
        .map(|_| rng.random_range(0..=255u8) as f64)
        .collect();
    let coarse = Image::<f64, 1>::new(coarse_size, coarse_data)?;

    let mut resized = Image::from_size_val(size, 0.0)?;
    resize_bicubic(&coarse, &mut resized)?;

    let mut blurred = Image::from_size_val(size, 0.0)?;
    filter::gaussian_blur(&resized, &mut blurred, BLUR_KERNEL_SIZE, BLUR_SIGMA)?;
    Ok(blurred)
}

fn scaled_extent(extent: usize) -> usize {
    ((extent as f64 * NOISE_SCALE_FACTOR).round() as usize).max(1)
}
