use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::{ParallelSlice, ParallelSliceMut},
};

use crate::error::DistortError;
use crate::field::{grid_points, DisplacementField};
use warpix_image::{Image, ImageError, ImageSize};

/// Bilinear blend of four corner values.
///
/// `x` is the vertical fraction, `y` the horizontal one; corners are given
/// row-major (top-left, top-right, bottom-left, bottom-right). Used both to
/// densify the displacement grid and to resample source pixels at
/// fractional coordinates.
#[inline]
fn bilerp(x: f64, y: f64, v11: f64, v12: f64, v21: f64, v22: f64) -> f64 {
    (v11 * (1.0 - y) + v12 * y) * (1.0 - x) + (v21 * (1.0 - y) + v22 * y) * x
}

/// Expand a displacement field into per-pixel source coordinates.
///
/// Cells are bounded by consecutive grid intersections; the last cell on
/// each axis shrinks when the spacing does not divide the dimension. Inside
/// a cell the four corner displacements are blended bilinearly at the
/// pixel's normalized local coordinates, and the displaced source position
/// is clamped per axis to `[0, dim - 1]`.
fn dense_maps(size: ImageSize, field: &DisplacementField) -> (Vec<f64>, Vec<f64>) {
    let (width, height) = (size.width, size.height);
    let spacing = field.spacing();
    let rows = field.rows();
    let cols = field.cols();

    let mut map_x = vec![0.0f64; width * height];
    let mut map_y = vec![0.0f64; width * height];
    let max_x = (width - 1) as f64;
    let max_y = (height - 1) as f64;

    let mut i = 0;
    while i < height {
        let gy0 = (i / spacing).min(rows - 1);
        let gy1 = (i / spacing + 1).min(rows - 1);
        let cell_h = if i + spacing >= height {
            height - i
        } else {
            spacing
        };

        let mut j = 0;
        while j < width {
            let gx0 = (j / spacing).min(cols - 1);
            let gx1 = (j / spacing + 1).min(cols - 1);
            let cell_w = if j + spacing >= width {
                width - j
            } else {
                spacing
            };

            let (dx11, dy11) = field.shift(gy0, gx0);
            let (dx12, dy12) = field.shift(gy0, gx1);
            let (dx21, dy21) = field.shift(gy1, gx0);
            let (dx22, dy22) = field.shift(gy1, gx1);

            for di in 0..cell_h {
                let fy = di as f64 / cell_h as f64;
                let row_idx = (i + di) * width;
                for dj in 0..cell_w {
                    let fx = dj as f64 / cell_w as f64;
                    let delta_x = bilerp(fy, fx, dx11, dx12, dx21, dx22);
                    let delta_y = bilerp(fy, fx, dy11, dy12, dy21, dy22);
                    let idx = row_idx + j + dj;
                    map_x[idx] = ((j + dj) as f64 + delta_x).clamp(0.0, max_x);
                    map_y[idx] = ((i + di) as f64 + delta_y).clamp(0.0, max_y);
                }
            }

            j += spacing;
        }
        i += spacing;
    }

    (map_x, map_y)
}

/// Resample one destination pixel from the fractional source coordinate
/// `(x, y)` with 4-neighbor bilinear interpolation, channel by channel.
/// Interpolated values are narrowed to `u8` by truncation toward zero.
#[inline]
fn sample_pixel<const C: usize>(src: &[u8], cols: usize, x: f64, y: f64, dst_pixel: &mut [u8]) {
    let x0 = x as usize;
    let y0 = y as usize;
    let x1 = x.ceil() as usize;
    let y1 = y.ceil() as usize;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let base11 = (y0 * cols + x0) * C;
    let base12 = (y0 * cols + x1) * C;
    let base21 = (y1 * cols + x0) * C;
    let base22 = (y1 * cols + x1) * C;

    for (c, out) in dst_pixel.iter_mut().enumerate() {
        let value = bilerp(
            fy,
            fx,
            src[base11 + c] as f64,
            src[base12 + c] as f64,
            src[base21 + c] as f64,
            src[base22 + c] as f64,
        );
        *out = value as u8;
    }
}

/// Warp an image through a displacement field.
///
/// Every destination pixel is resampled from the source location its cell's
/// interpolated displacement points at; out-of-range locations are clamped,
/// so the operation never fails for a field generated for this image size.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
/// * `dst` - The output image, pre-allocated with the same shape.
/// * `field` - The displacement field generated for the image size.
///
/// # Errors
///
/// Returns an error when `dst` differs in size from `src` or the field does
/// not cover the image.
///
/// # Example
///
/// ```
/// use warpix_distort::field::DisplacementField;
/// use warpix_distort::resample::warp;
/// use warpix_image::{Image, ImageSize};
///
/// let size = ImageSize { width: 4, height: 4 };
/// let src = Image::<u8, 1>::from_size_val(size, 7).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(size, 0).unwrap();
///
/// let field = DisplacementField::zeros(size, 2);
/// warp(&src, &mut dst, &field).unwrap();
///
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
pub fn warp<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    field: &DisplacementField,
) -> Result<(), DistortError> {
    let size = src.size();
    if dst.size() != size {
        return Err(DistortError::Image(ImageError::InvalidImageSize(
            size.width,
            size.height,
            dst.width(),
            dst.height(),
        )));
    }
    if field.rows() != grid_points(size.height, field.spacing())
        || field.cols() != grid_points(size.width, field.spacing())
    {
        return Err(DistortError::FieldSizeMismatch {
            rows: field.rows(),
            cols: field.cols(),
            spacing: field.spacing(),
            width: size.width,
            height: size.height,
        });
    }
    if size.width == 0 || size.height == 0 {
        return Ok(());
    }

    let (map_x, map_y) = dense_maps(size, field);

    let cols = size.width;
    let src_data = src.as_slice();
    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .zip(map_x.par_chunks_exact(cols))
        .zip(map_y.par_chunks_exact(cols))
        .for_each(|((dst_row, map_x_row), map_y_row)| {
            dst_row
                .chunks_exact_mut(C)
                .zip(map_x_row.iter().zip(map_y_row.iter()))
                .for_each(|(dst_pixel, (&x, &y))| {
                    sample_pixel::<C>(src_data, cols, x, y, dst_pixel);
                });
        });

    Ok(())
}
